//! Gantry: a multi-world simulation server.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Gantry sub-crates. For most users, adding `gantry` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use gantry::prelude::*;
//!
//! // Describe a world inline and run it for a fixed number of steps.
//! let config = ServerConfig {
//!     source: WorldSource::Text(
//!         "world factory\n\
//!          model arm\n\
//!          link base\n"
//!             .into(),
//!     ),
//!     ..Default::default()
//! };
//! let server = Server::new(config);
//! assert!(server.load_errors().is_empty());
//! assert_eq!(server.world_count(), 1);
//!
//! assert!(server.run(true, 3, false));
//! assert_eq!(server.iteration_count(0), Some(3));
//! assert!(server.has_entity("arm::base", 0));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gantry-core` | Scene descriptions, IDs, errors, core traits |
//! | [`scene`] | `gantry-scene` | The stock text loader and asset resolver |
//! | [`runner`] | `gantry-runner` | The per-world step loop and entity registry |
//! | [`server`] | `gantry-server` | Configuration, resolution, and the server facade |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Scene descriptions, IDs, errors, and core traits (`gantry-core`).
///
/// Contains [`types::SceneDocument`] and the seams the server is wired
/// through: [`types::DescriptionLoader`], [`types::AssetResolver`],
/// [`types::System`], [`types::SignalMonitor`], and [`types::WorldRunner`].
pub use gantry_core as types;

/// The stock scene-description format and asset cache (`gantry-scene`).
///
/// [`scene::SceneTextLoader`] parses the line-based text format;
/// [`scene::CacheAssetResolver`] answers remote identifiers from a local
/// cache directory.
pub use gantry_scene as scene;

/// The per-world step loop and entity registry (`gantry-runner`).
///
/// [`runner::SceneRunner`] is the stock [`types::WorldRunner`]
/// implementation the server instantiates per world.
pub use gantry_runner as runner;

/// Configuration, world resolution, and the server facade (`gantry-server`).
///
/// [`server::Server`] owns the runners and the run lifecycle;
/// [`server::ServerConfig`] describes where the worlds come from.
pub use gantry_server as server;

/// Common imports for typical Gantry usage.
///
/// ```rust
/// use gantry::prelude::*;
/// ```
pub mod prelude {
    // Scene descriptions and errors
    pub use gantry_core::{
        Entity, ErrorList, LoadError, LoadErrorCode, ModelDescription, SceneDocument,
        WorldDescription,
    };

    // Trait seams
    pub use gantry_core::{AssetResolver, DescriptionLoader, SignalMonitor, System, WorldRunner};

    // Server
    pub use gantry_server::{AddSystemOutcome, Collaborators, Server, ServerConfig, WorldSource};
}
