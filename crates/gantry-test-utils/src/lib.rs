//! Test utilities and mock types for Gantry development.
//!
//! Provides mock implementations of the collaborator traits
//! ([`DescriptionLoader`], [`AssetResolver`], [`SignalMonitor`],
//! [`System`]) plus temp-file fixtures for file-based resolution
//! tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gantry_core::{
    AssetResolver, DescriptionLoader, ErrorList, SceneDocument, SignalMonitor, System,
};

// ── Loaders ──────────────────────────────────────────────────────

/// Loader that returns a preset document for every call.
pub struct StaticDocLoader {
    document: SceneDocument,
}

impl StaticDocLoader {
    pub fn new(document: SceneDocument) -> Self {
        Self { document }
    }
}

impl DescriptionLoader for StaticDocLoader {
    fn load_from_text(&self, _text: &str) -> Result<SceneDocument, ErrorList> {
        Ok(self.document.clone())
    }

    fn load_from_path(&self, _path: &Path) -> Result<SceneDocument, ErrorList> {
        Ok(self.document.clone())
    }
}

/// Loader that fails every call with a preset error list.
pub struct FailingLoader {
    errors: ErrorList,
}

impl FailingLoader {
    pub fn new(errors: ErrorList) -> Self {
        Self { errors }
    }
}

impl DescriptionLoader for FailingLoader {
    fn load_from_text(&self, _text: &str) -> Result<SceneDocument, ErrorList> {
        Err(self.errors.clone())
    }

    fn load_from_path(&self, _path: &Path) -> Result<SceneDocument, ErrorList> {
        Err(self.errors.clone())
    }
}

// ── Asset resolvers ──────────────────────────────────────────────

/// Resolver that answers from a fixed identifier-to-path map.
#[derive(Default)]
pub struct MapAssetResolver {
    map: HashMap<String, PathBuf>,
}

impl MapAssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, identifier: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.map.insert(identifier.into(), path.into());
        self
    }
}

impl AssetResolver for MapAssetResolver {
    fn resolve(&self, identifier: &str) -> Option<PathBuf> {
        self.map.get(identifier).cloned()
    }
}

/// Resolver for which every identifier is absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAssetResolver;

impl AssetResolver for NullAssetResolver {
    fn resolve(&self, _identifier: &str) -> Option<PathBuf> {
        None
    }
}

// ── Signal monitors ──────────────────────────────────────────────

/// Monitor whose subsystem never becomes ready; runs must refuse to
/// start against it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverReadySignals;

impl SignalMonitor for NeverReadySignals {
    fn initialized(&self) -> bool {
        false
    }
}

// ── Systems ──────────────────────────────────────────────────────

/// System that counts how many times it was driven.
pub struct CountingSystem {
    hits: Arc<AtomicU64>,
}

impl CountingSystem {
    /// The system and the shared counter it increments.
    pub fn new() -> (Self, Arc<AtomicU64>) {
        let hits = Arc::new(AtomicU64::new(0));
        (
            Self {
                hits: Arc::clone(&hits),
            },
            hits,
        )
    }
}

impl System for CountingSystem {
    fn name(&self) -> &str {
        "counting"
    }

    fn update(&self, _iteration: u64) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }
}

// ── Filesystem fixtures ──────────────────────────────────────────

static FIXTURE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_path(tag: &str, suffix: &str) -> PathBuf {
    let n = FIXTURE_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "gantry-{tag}-{}-{n}{suffix}",
        std::process::id()
    ))
}

/// A scene description file in the system temp directory, removed on
/// drop.
pub struct TempSceneFile {
    path: PathBuf,
}

impl TempSceneFile {
    pub fn new(tag: &str, contents: &str) -> Self {
        let path = unique_path(tag, ".gsd");
        fs::write(&path, contents).expect("failed to write temp scene file");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempSceneFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// A temp directory of scene files, removed on drop. Used to exercise
/// resource-directory search.
pub struct TempSceneDir {
    dir: PathBuf,
}

impl TempSceneDir {
    pub fn new(tag: &str) -> Self {
        let dir = unique_path(tag, "");
        fs::create_dir_all(&dir).expect("failed to create temp scene dir");
        Self { dir }
    }

    /// Write a file inside the directory and return its full path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, contents).expect("failed to write temp scene file");
        path
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for TempSceneDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}
