//! Server configuration and the closed world-source union.

use std::path::PathBuf;
use std::time::Duration;

use gantry_core::SceneDocument;

/// Where the server obtains its world description.
///
/// A closed union: resolution matches it exhaustively, with no
/// catch-all arm. [`WorldSource::None`] is an explicit case, handled
/// like an empty file by synthesizing the default world.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum WorldSource {
    /// No source configured; the default world is synthesized.
    #[default]
    None,
    /// A caller-owned in-memory description, deep-copied at
    /// construction so the server owns an independent instance.
    Description(SceneDocument),
    /// Description text parsed directly.
    Text(String),
    /// A description file, resolved against the path as given, then
    /// the resource directories, then the asset resolver.
    File(PathBuf),
}

/// Immutable server configuration, supplied once at construction.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Where the world description comes from.
    pub source: WorldSource,
    /// Local cache directory for fetched assets.
    pub resource_cache: Option<PathBuf>,
    /// Directories searched when a configured file path does not
    /// exist as given.
    pub resource_paths: Vec<PathBuf>,
    /// Fixed update period applied to every runner, overriding any
    /// period the world description declares.
    pub update_period: Option<Duration>,
    /// Attach the log-record system to every runner.
    pub record_log: bool,
}
