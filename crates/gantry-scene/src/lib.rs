//! Stock implementations of the Gantry description-loading contracts.
//!
//! Provides [`SceneTextLoader`], a line-based scene description format
//! implementing [`DescriptionLoader`](gantry_core::DescriptionLoader),
//! and [`CacheAssetResolver`], a cache-directory
//! [`AssetResolver`](gantry_core::AssetResolver). The server wires these
//! in by default; callers swap in their own through the trait seams.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assets;
pub mod loader;

pub use assets::CacheAssetResolver;
pub use loader::SceneTextLoader;
