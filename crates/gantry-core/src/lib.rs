//! Core types and collaborator contracts for the Gantry simulation server.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fundamental vocabulary shared by the whole workspace: entity IDs, the
//! structured configuration-error types, the opaque scene description
//! document model, and the traits behind which the server's external
//! collaborators (description loader, asset resolver, world runner,
//! signal subsystem) live.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod scene;
pub mod traits;

pub use error::{ErrorList, LoadError, LoadErrorCode};
pub use id::Entity;
pub use scene::{ModelDescription, SceneDocument, WorldDescription, DEFAULT_WORLD_NAME};
pub use traits::{AssetResolver, DescriptionLoader, SignalMonitor, System, WorldRunner};
