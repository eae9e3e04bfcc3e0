//! Collaborator contracts the server depends on.
//!
//! These traits are the seams between the orchestration core and its
//! external collaborators: the description loader (owns the text
//! format), the asset resolver (remote identifiers), the per-world
//! runner (owns the step loop), and the signal subsystem. All are
//! object-safe and `Send + Sync` so the server can hold them behind
//! trait objects and share runners with its one background run thread.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ErrorList;
use crate::id::Entity;
use crate::scene::SceneDocument;

/// Parses scene description text into documents.
///
/// The text format is owned entirely by the implementation; the server
/// only consumes the structured [`SceneDocument`] result. On failure
/// the ordered error list explains every structural problem found.
pub trait DescriptionLoader: Send + Sync {
    /// Parse description text directly.
    fn load_from_text(&self, text: &str) -> Result<SceneDocument, ErrorList>;

    /// Read and parse a description file.
    fn load_from_path(&self, path: &Path) -> Result<SceneDocument, ErrorList>;
}

/// Resolves a non-local identifier to fetched content on disk.
///
/// Consulted only after the configured path and the resource-directory
/// search both fail; `None` means the identifier is not fetchable.
pub trait AssetResolver: Send + Sync {
    /// Resolve an identifier to a local path, fetching if necessary.
    fn resolve(&self, identifier: &str) -> Option<PathBuf>;
}

/// A unit of behavior attached to a runner and driven once per
/// advanced step.
pub trait System: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Called after the runner advances to `iteration`.
    fn update(&self, iteration: u64);
}

/// Readiness probe of the process signal-handling subsystem.
///
/// The server refuses to start a run until the subsystem reports
/// itself initialized; the subsystem's internals are not part of the
/// orchestration core.
pub trait SignalMonitor: Send + Sync {
    /// Whether signal handlers were installed successfully.
    fn initialized(&self) -> bool;
}

/// The per-world execution unit.
///
/// One runner exists per resolved world; the server owns the ordered
/// collection and addresses runners by index. All methods take `&self`:
/// a runner is shared between the caller thread (dispatch reads, pause
/// and stop requests) and the single background run thread, so
/// implementations use interior mutability. Pause state is only
/// eventually visible — the loop reads it at iteration boundaries.
pub trait WorldRunner: Send + Sync {
    /// Execute the run loop for `iterations` steps (0 = unbounded).
    ///
    /// Returns `false` if this runner is already mid-run, `true` when
    /// the loop completes or is stopped.
    fn run(&self, iterations: u64) -> bool;

    /// Request the loop to halt at its next safe boundary.
    /// Asynchronous and idempotent; does not wait for termination.
    /// The request persists until [`clear_stop_request`] discards it,
    /// so a stop issued between a run call returning and the loop's
    /// first flag read is never lost.
    ///
    /// [`clear_stop_request`]: WorldRunner::clear_stop_request
    fn stop(&self);

    /// Discard a pending stop request. The server calls this under
    /// its run-transition lock, before a run starts; a stale request
    /// from an earlier run must not halt the next one.
    fn clear_stop_request(&self);

    /// Set the pause flag, observed at the next iteration boundary.
    fn set_paused(&self, paused: bool);

    /// Current pause flag.
    fn paused(&self) -> bool;

    /// Whether the run loop is currently executing.
    fn running(&self) -> bool;

    /// Number of iterations advanced since construction.
    fn iteration_count(&self) -> u64;

    /// Number of entities in the world's registry.
    fn entity_count(&self) -> usize;

    /// Number of attached systems.
    fn system_count(&self) -> usize;

    /// Attach a system. The server forbids this while a run is in
    /// flight; the runner itself just appends.
    fn add_system(&self, system: Box<dyn System>);

    /// Whether an entity with this name exists.
    fn has_entity(&self, name: &str) -> bool;

    /// Look up an entity ID by name.
    fn entity_by_name(&self, name: &str) -> Option<Entity>;

    /// Request removal of the named entity at the next boundary.
    /// With `recursive`, descendants registered under `"name::…"` are
    /// removed too. Returns `false` for unknown names.
    fn request_remove_entity_by_name(&self, name: &str, recursive: bool) -> bool;

    /// Request removal by entity ID. Same contract as the by-name form.
    fn request_remove_entity(&self, entity: Entity, recursive: bool) -> bool;

    /// Set the fixed update period between advanced steps.
    fn set_update_period(&self, period: Duration);

    /// Arm the one-shot flag that makes the next step execute as a
    /// blocking, paused step. Used for deterministic single-stepping.
    fn set_next_step_blocking_paused(&self, value: bool);
}
