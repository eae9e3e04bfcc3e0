//! The top-level server: composition and index-routed dispatch.

use std::sync::Arc;
use std::time::Duration;

use gantry_core::{
    AssetResolver, DescriptionLoader, Entity, ErrorList, SignalMonitor, System, WorldRunner,
};
use gantry_runner::SceneRunner;
use gantry_scene::{CacheAssetResolver, SceneTextLoader};

use crate::config::ServerConfig;
use crate::control::{AddSystemOutcome, RunControl};
use crate::record::RecordSystem;
use crate::resolver;
use crate::script;
use crate::signal::InstalledSignals;

// ── Collaborators ────────────────────────────────────────────────

/// The external collaborators a server is built against.
///
/// The stock bundle wires the line-based scene loader, the
/// cache-directory asset resolver, and the always-ready signal
/// monitor; tests and embedders substitute their own.
pub struct Collaborators {
    /// Owns the description text format.
    pub loader: Box<dyn DescriptionLoader>,
    /// Resolves remote identifiers, consulted after local search fails.
    pub assets: Box<dyn AssetResolver>,
    /// Readiness probe of the signal-handling subsystem.
    pub signals: Box<dyn SignalMonitor>,
}

impl Collaborators {
    /// The stock bundle for a configuration.
    pub fn stock(config: &ServerConfig) -> Self {
        Self {
            loader: Box::new(SceneTextLoader::new()),
            assets: Box::new(CacheAssetResolver::new(config.resource_cache.clone())),
            signals: Box::new(InstalledSignals),
        }
    }
}

// ── Server ───────────────────────────────────────────────────────

/// The multi-world simulation server.
///
/// Construction resolves the configured world source exactly once and
/// populates zero-or-more runners; a recorded resolution error leaves
/// zero runners and makes every subsequent run call return `false`.
/// All later public calls flow through the run controller (execution)
/// or the per-world dispatch methods (introspection and mutation),
/// which share the same runner collection.
///
/// # Index contract
///
/// Every per-world method takes a `world_index` in
/// `[0, world_count())`. Out-of-range indexes yield the absent value
/// (`None`) from value-returning calls and `false` from request-style
/// calls — never a panic. `add_system` answers with the three-way
/// [`AddSystemOutcome`].
pub struct Server {
    runners: Vec<Arc<dyn WorldRunner>>,
    control: RunControl,
    signals: Box<dyn SignalMonitor>,
    load_errors: ErrorList,
}

impl Server {
    /// Build a server with the stock collaborators.
    pub fn new(config: ServerConfig) -> Self {
        let collaborators = Collaborators::stock(&config);
        Self::with_collaborators(config, collaborators)
    }

    /// Build a server against explicit collaborators.
    pub fn with_collaborators(config: ServerConfig, collaborators: Collaborators) -> Self {
        script::bootstrap();

        let mut runners: Vec<Arc<dyn WorldRunner>> = Vec::new();
        let mut load_errors = ErrorList::new();

        match resolver::resolve(
            &config,
            collaborators.loader.as_ref(),
            collaborators.assets.as_ref(),
        ) {
            Ok(document) => {
                if let Some(world) = document.world() {
                    runners.push(Arc::new(SceneRunner::new(world)));
                }
            }
            Err(errors) => {
                for error in &errors {
                    tracing::error!(code = %error.code, "{}", error.message);
                }
                load_errors = errors;
            }
        }

        // A recorded error short-circuits all later construction.
        if load_errors.is_empty() {
            if config.record_log {
                for runner in &runners {
                    runner.add_system(Box::new(RecordSystem::new()));
                }
            }
            // The configured period overrides whatever the world
            // description declared.
            if let Some(period) = config.update_period {
                for runner in &runners {
                    runner.set_update_period(period);
                }
            }
        }

        Self {
            runners,
            control: RunControl::new(),
            signals: collaborators.signals,
            load_errors,
        }
    }

    /// Errors recorded during world-source resolution, in discovery
    /// order. Empty when construction produced runnable worlds.
    pub fn load_errors(&self) -> &[gantry_core::LoadError] {
        &self.load_errors
    }

    /// Number of resolved worlds. Per-world indexes range over
    /// `[0, world_count())` and are never renumbered.
    pub fn world_count(&self) -> usize {
        self.runners.len()
    }

    // ── Execution ────────────────────────────────────────────────

    /// Run the simulation.
    ///
    /// Every runner's pause flag is first set to `paused`. In blocking
    /// mode the calling thread executes the loop for `iterations`
    /// steps (0 = unbounded) and returns when it completes or is
    /// stopped. In non-blocking mode a background thread is spawned
    /// and this call returns only after the Running state is
    /// observably published.
    ///
    /// Returns `false`, with no state change, when the signal
    /// subsystem is not initialized, when resolution left zero
    /// runners, or when a run is already in flight.
    pub fn run(&self, blocking: bool, iterations: u64, paused: bool) -> bool {
        self.control.run(
            &self.runners,
            self.signals.as_ref(),
            blocking,
            iterations,
            paused,
        )
    }

    /// Run exactly one iteration, blocking.
    ///
    /// With `paused`, every runner's next step is forced to execute as
    /// a blocking, paused step, giving deterministic single-stepping
    /// under external pause control.
    pub fn run_once(&self, paused: bool) -> bool {
        if paused {
            for runner in &self.runners {
                runner.set_next_step_blocking_paused(true);
            }
        }
        self.run(true, 1, paused)
    }

    /// Request every runner to halt at its next safe boundary.
    /// Asynchronous and idempotent; a no-op with no active run.
    pub fn stop(&self) {
        for runner in &self.runners {
            runner.stop();
        }
    }

    /// Whether a run loop is currently executing, on either the
    /// caller's thread or the background thread.
    pub fn running(&self) -> bool {
        self.control.running()
    }

    // ── Per-world dispatch ───────────────────────────────────────

    fn runner(&self, world_index: usize) -> Option<&Arc<dyn WorldRunner>> {
        self.runners.get(world_index)
    }

    /// Whether the indexed world's own loop is executing.
    pub fn world_running(&self, world_index: usize) -> Option<bool> {
        self.runner(world_index).map(|r| r.running())
    }

    /// The indexed world's pause flag.
    pub fn paused(&self, world_index: usize) -> Option<bool> {
        self.runner(world_index).map(|r| r.paused())
    }

    /// Set the indexed world's pause flag, observed at its next
    /// iteration boundary.
    pub fn set_paused(&self, paused: bool, world_index: usize) -> bool {
        match self.runner(world_index) {
            Some(runner) => {
                runner.set_paused(paused);
                true
            }
            None => false,
        }
    }

    /// Iterations the indexed world has advanced since construction.
    pub fn iteration_count(&self, world_index: usize) -> Option<u64> {
        self.runner(world_index).map(|r| r.iteration_count())
    }

    /// Entities in the indexed world's registry.
    pub fn entity_count(&self, world_index: usize) -> Option<usize> {
        self.runner(world_index).map(|r| r.entity_count())
    }

    /// Systems attached to the indexed world.
    pub fn system_count(&self, world_index: usize) -> Option<usize> {
        self.runner(world_index).map(|r| r.system_count())
    }

    /// Attach a system to the indexed world.
    ///
    /// Serialized with run transitions: while a run is in flight the
    /// call answers [`AddSystemOutcome::RejectedRunning`] and mutates
    /// nothing, which is distinct from the absent
    /// [`AddSystemOutcome::NoSuchWorld`].
    pub fn add_system(&self, system: Box<dyn System>, world_index: usize) -> AddSystemOutcome {
        self.control.add_system(&self.runners, system, world_index)
    }

    /// Whether the indexed world has an entity with this name.
    pub fn has_entity(&self, name: &str, world_index: usize) -> bool {
        self.runner(world_index)
            .map(|r| r.has_entity(name))
            .unwrap_or(false)
    }

    /// Look up an entity ID by name in the indexed world.
    pub fn entity_by_name(&self, name: &str, world_index: usize) -> Option<Entity> {
        self.runner(world_index).and_then(|r| r.entity_by_name(name))
    }

    /// Request removal of a named entity at the indexed world's next
    /// boundary.
    pub fn request_remove_entity_by_name(
        &self,
        name: &str,
        recursive: bool,
        world_index: usize,
    ) -> bool {
        self.runner(world_index)
            .map(|r| r.request_remove_entity_by_name(name, recursive))
            .unwrap_or(false)
    }

    /// Request removal of an entity by ID.
    pub fn request_remove_entity(
        &self,
        entity: Entity,
        recursive: bool,
        world_index: usize,
    ) -> bool {
        self.runner(world_index)
            .map(|r| r.request_remove_entity(entity, recursive))
            .unwrap_or(false)
    }

    /// Set the indexed world's fixed update period.
    pub fn set_update_period(&self, period: Duration, world_index: usize) -> bool {
        match self.runner(world_index) {
            Some(runner) => {
                runner.set_update_period(period);
                true
            }
            None => false,
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
        self.control.join();
    }
}
