//! World-source resolution: configuration to validated document.
//!
//! A pure decision procedure over the closed [`WorldSource`] union.
//! Exactly one source tag is processed; any structural error recorded
//! at any stage short-circuits all later construction (no record
//! system, no runner creation). Errors are returned for the caller's
//! diagnostic sink, never raised.

use std::path::{Path, PathBuf};

use gantry_core::{
    AssetResolver, DescriptionLoader, ErrorList, LoadError, LoadErrorCode, SceneDocument,
};

use crate::config::{ServerConfig, WorldSource};

/// Resolve the configured source into a document.
///
/// On success the document holds the world to run — synthesized for
/// [`WorldSource::None`] and for standalone-model files — except in
/// the in-memory case, where validity is the caller's responsibility
/// and a world-less document simply yields zero runners.
pub fn resolve(
    config: &ServerConfig,
    loader: &dyn DescriptionLoader,
    assets: &dyn AssetResolver,
) -> Result<SceneDocument, ErrorList> {
    match &config.source {
        WorldSource::Description(document) => {
            tracing::info!("loading world from in-memory description");
            Ok(document.clone())
        }
        WorldSource::Text(text) => {
            tracing::info!("loading world from description text");
            loader.load_from_text(text)
        }
        WorldSource::File(path) => {
            let Some(resolved) = resolve_file(path, &config.resource_paths, assets) else {
                return Err(vec![LoadError::new(
                    LoadErrorCode::Resolution,
                    format!("failed to find world [{}]", path.display()),
                )]);
            };
            tracing::info!(path = %resolved.display(), "loading world file");
            let document = loader.load_from_path(&resolved)?;
            merge_if_standalone(document, &resolved)
        }
        WorldSource::None => {
            tracing::info!("loading default world");
            Ok(SceneDocument::default_world())
        }
    }
}

/// Resolve a configured file path: as given, then across the resource
/// directories, then through the asset resolver.
fn resolve_file(
    path: &Path,
    resource_paths: &[PathBuf],
    assets: &dyn AssetResolver,
) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    for dir in resource_paths {
        let candidate = dir.join(path);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    assets.resolve(&path.to_string_lossy())
}

/// The default-world fallback for files that hold a standalone model.
fn merge_if_standalone(
    mut document: SceneDocument,
    origin: &Path,
) -> Result<SceneDocument, ErrorList> {
    if document.world().is_some() {
        return Ok(document);
    }
    let Some(model) = document.take_model() else {
        return Err(vec![LoadError::new(
            LoadErrorCode::MissingWorld,
            format!("[{}] contains neither a world nor a model", origin.display()),
        )]);
    };
    tracing::info!(model = %model.name, "merging standalone model into the default world");
    let mut merged = SceneDocument::default_world();
    let Some(world) = merged.world_mut() else {
        // The container is synthesized one line above; losing it is a
        // recorded configuration error, not a silent abort.
        return Err(vec![LoadError::new(
            LoadErrorCode::Merge,
            "synthesized default world is missing its container",
        )]);
    };
    world.add_model(model);
    let errors = merged.revalidate();
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(merged)
}
