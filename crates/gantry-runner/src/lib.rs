//! Reference per-world execution unit for the Gantry simulation server.
//!
//! [`SceneRunner`] implements the [`WorldRunner`] contract: it owns one
//! world's entity registry and system list and advances the iteration
//! loop. The physical content of a step lives in attached
//! [`System`]s; the runner itself only sequences them.
//!
//! # Sharing model
//!
//! A runner is shared between the caller thread (pause/stop requests,
//! dispatch reads) and the server's single background run thread, so
//! every method takes `&self`. Run/stop/pause state lives in atomics
//! read at iteration boundaries; the entity registry and system list
//! sit behind mutexes that the loop holds only briefly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;

use gantry_core::{Entity, System, WorldDescription, WorldRunner};

/// How long a paused loop parks before rechecking its flags.
const PAUSE_POLL: Duration = Duration::from_millis(1);

/// Reference [`WorldRunner`] built from a [`WorldDescription`].
///
/// The entity registry holds the world container under the world's own
/// name, then per model the model entity plus one entity per part
/// registered as `"model::part"`, in description order. IDs are
/// sequential from 1 and never reused.
pub struct SceneRunner {
    world_name: String,
    entities: Mutex<IndexMap<String, Entity>>,
    iterations: AtomicU64,
    paused: AtomicBool,
    running: AtomicBool,
    stop_requested: AtomicBool,
    blocking_paused_step: AtomicBool,
    update_period: Mutex<Duration>,
    systems: Mutex<Vec<Box<dyn System>>>,
}

impl SceneRunner {
    /// Build a runner for one resolved world.
    pub fn new(world: &WorldDescription) -> Self {
        let mut entities = IndexMap::new();
        let mut next = 1u64;
        entities.insert(world.name.clone(), Entity(next));
        for model in &world.models {
            next += 1;
            entities.insert(model.name.clone(), Entity(next));
            for part in &model.parts {
                next += 1;
                entities.insert(format!("{}::{part}", model.name), Entity(next));
            }
        }
        Self {
            world_name: world.name.clone(),
            entities: Mutex::new(entities),
            iterations: AtomicU64::new(0),
            paused: AtomicBool::new(false),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            blocking_paused_step: AtomicBool::new(false),
            update_period: Mutex::new(world.update_period.unwrap_or(Duration::ZERO)),
            systems: Mutex::new(Vec::new()),
        }
    }

    /// Name of the world this runner executes.
    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    fn remove_by_name_locked(
        entities: &mut IndexMap<String, Entity>,
        name: &str,
        recursive: bool,
    ) -> bool {
        if entities.shift_remove(name).is_none() {
            return false;
        }
        if recursive {
            let prefix = format!("{name}::");
            entities.retain(|key, _| !key.starts_with(&prefix));
        }
        true
    }
}

impl WorldRunner for SceneRunner {
    fn run(&self, iterations: u64) -> bool {
        if self.running.swap(true, Ordering::AcqRel) {
            return false;
        }
        // The stop flag is not cleared here: a request issued between
        // the caller's run call returning and this loop starting must
        // still halt it. Stale requests are discarded by
        // `clear_stop_request` before the run transition.
        let mut advanced = 0u64;
        loop {
            if self.stop_requested.load(Ordering::Acquire) {
                break;
            }
            if iterations != 0 && advanced == iterations {
                break;
            }
            // Paused iterations advance nothing unless the one-shot
            // blocking-paused flag is armed.
            if self.paused.load(Ordering::Relaxed)
                && !self.blocking_paused_step.swap(false, Ordering::AcqRel)
            {
                thread::park_timeout(PAUSE_POLL);
                continue;
            }
            let iteration = self.iterations.fetch_add(1, Ordering::AcqRel) + 1;
            {
                let systems = self.systems.lock().unwrap();
                for system in systems.iter() {
                    system.update(iteration);
                }
            }
            advanced += 1;
            let period = *self.update_period.lock().unwrap();
            if !period.is_zero() {
                thread::sleep(period);
            }
        }
        self.running.store(false, Ordering::Release);
        true
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    fn clear_stop_request(&self) {
        self.stop_requested.store(false, Ordering::Release);
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    fn paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn iteration_count(&self) -> u64 {
        self.iterations.load(Ordering::Acquire)
    }

    fn entity_count(&self) -> usize {
        self.entities.lock().unwrap().len()
    }

    fn system_count(&self) -> usize {
        self.systems.lock().unwrap().len()
    }

    fn add_system(&self, system: Box<dyn System>) {
        self.systems.lock().unwrap().push(system);
    }

    fn has_entity(&self, name: &str) -> bool {
        self.entities.lock().unwrap().contains_key(name)
    }

    fn entity_by_name(&self, name: &str) -> Option<Entity> {
        self.entities.lock().unwrap().get(name).copied()
    }

    fn request_remove_entity_by_name(&self, name: &str, recursive: bool) -> bool {
        if name == self.world_name {
            // The world container is not removable.
            return false;
        }
        let mut entities = self.entities.lock().unwrap();
        Self::remove_by_name_locked(&mut entities, name, recursive)
    }

    fn request_remove_entity(&self, entity: Entity, recursive: bool) -> bool {
        let name = {
            let entities = self.entities.lock().unwrap();
            entities
                .iter()
                .find(|(_, id)| **id == entity)
                .map(|(name, _)| name.clone())
        };
        match name {
            Some(name) => self.request_remove_entity_by_name(&name, recursive),
            None => false,
        }
    }

    fn set_update_period(&self, period: Duration) {
        *self.update_period.lock().unwrap() = period;
    }

    fn set_next_step_blocking_paused(&self, value: bool) {
        self.blocking_paused_step.store(value, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    use gantry_core::ModelDescription;

    struct Counting {
        hits: Arc<AtomicU64>,
    }

    impl System for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn update(&self, _iteration: u64) {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn box_world() -> WorldDescription {
        let mut world = WorldDescription::empty("test");
        let mut model = ModelDescription::new("box");
        model.parts.push("lid".into());
        world.add_model(model);
        world
    }

    #[test]
    fn registry_mirrors_the_description() {
        let runner = SceneRunner::new(&box_world());
        assert_eq!(runner.entity_count(), 3);
        assert!(runner.has_entity("test"));
        assert!(runner.has_entity("box"));
        assert!(runner.has_entity("box::lid"));
        assert_eq!(runner.entity_by_name("test"), Some(Entity(1)));
        assert_eq!(runner.entity_by_name("box"), Some(Entity(2)));
        assert_eq!(runner.entity_by_name("ghost"), None);
    }

    #[test]
    fn bounded_run_advances_exactly_the_bound() {
        let runner = SceneRunner::new(&box_world());
        assert!(runner.run(5));
        assert_eq!(runner.iteration_count(), 5);
        assert!(!runner.running());
    }

    #[test]
    fn systems_are_driven_once_per_step() {
        let runner = SceneRunner::new(&box_world());
        let hits = Arc::new(AtomicU64::new(0));
        runner.add_system(Box::new(Counting { hits: Arc::clone(&hits) }));
        assert_eq!(runner.system_count(), 1);
        runner.run(3);
        assert_eq!(hits.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn second_concurrent_run_is_rejected() {
        let runner = Arc::new(SceneRunner::new(&box_world()));
        let background = {
            let runner = Arc::clone(&runner);
            thread::spawn(move || runner.run(0))
        };
        // Wait for the loop to start.
        let deadline = Instant::now() + Duration::from_secs(2);
        while !runner.running() {
            assert!(Instant::now() < deadline, "runner never started");
            thread::yield_now();
        }
        assert!(!runner.run(1));
        runner.stop();
        assert!(background.join().unwrap());
        assert!(!runner.running());
    }

    #[test]
    fn paused_run_advances_nothing_until_stopped() {
        let runner = Arc::new(SceneRunner::new(&box_world()));
        runner.set_paused(true);
        let background = {
            let runner = Arc::clone(&runner);
            thread::spawn(move || runner.run(0))
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(runner.iteration_count(), 0);
        runner.stop();
        assert!(background.join().unwrap());
        assert_eq!(runner.iteration_count(), 0);
    }

    #[test]
    fn blocking_paused_step_advances_exactly_one() {
        let runner = SceneRunner::new(&box_world());
        runner.set_paused(true);
        runner.set_next_step_blocking_paused(true);
        assert!(runner.run(1));
        assert_eq!(runner.iteration_count(), 1);
        assert!(runner.paused());
    }

    #[test]
    fn stop_request_persists_until_cleared() {
        let runner = SceneRunner::new(&box_world());
        runner.stop();
        // The pending request halts the loop before any iteration.
        assert!(runner.run(0));
        assert_eq!(runner.iteration_count(), 0);

        runner.clear_stop_request();
        assert!(runner.run(2));
        assert_eq!(runner.iteration_count(), 2);
    }

    #[test]
    fn remove_entity_recursive_takes_descendants() {
        let runner = SceneRunner::new(&box_world());
        assert!(runner.request_remove_entity_by_name("box", true));
        assert!(!runner.has_entity("box"));
        assert!(!runner.has_entity("box::lid"));
        assert_eq!(runner.entity_count(), 1);
    }

    #[test]
    fn remove_entity_non_recursive_keeps_descendants() {
        let runner = SceneRunner::new(&box_world());
        assert!(runner.request_remove_entity_by_name("box", false));
        assert!(!runner.has_entity("box"));
        assert!(runner.has_entity("box::lid"));
    }

    #[test]
    fn remove_by_id_matches_by_name_semantics() {
        let runner = SceneRunner::new(&box_world());
        let id = runner.entity_by_name("box::lid").unwrap();
        assert!(runner.request_remove_entity(id, false));
        assert!(!runner.has_entity("box::lid"));
        assert!(!runner.request_remove_entity(Entity(999), false));
    }

    #[test]
    fn world_container_is_not_removable() {
        let runner = SceneRunner::new(&box_world());
        assert!(!runner.request_remove_entity_by_name("test", true));
        assert!(runner.has_entity("test"));
    }

    #[test]
    fn update_period_paces_the_loop() {
        let runner = SceneRunner::new(&box_world());
        runner.set_update_period(Duration::from_millis(5));
        let start = Instant::now();
        runner.run(4);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn description_declared_period_is_honored() {
        let mut world = box_world();
        world.update_period = Some(Duration::from_millis(5));
        let runner = SceneRunner::new(&world);
        let start = Instant::now();
        runner.run(2);
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
