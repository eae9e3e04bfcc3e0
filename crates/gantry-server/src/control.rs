//! The run/stop state machine and the start rendezvous.
//!
//! One [`RunControl`] exists per server. A single mutex — the
//! background-thread slot — serializes every run-state transition and
//! every `add_system` call; the published running flag is an atomic so
//! dispatch reads never touch the mutex. The server spawns at most one
//! background thread concurrently for its entire lifetime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use gantry_core::{SignalMonitor, System, WorldRunner};

/// Result of an `add_system` dispatch call.
///
/// Three-way by design: "the index does not exist" and "the index
/// exists but mutation is currently disallowed" are different answers,
/// and collapsing them to one boolean loses the distinction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddSystemOutcome {
    /// The system was attached to the indexed runner.
    Added,
    /// A run is in flight; systems cannot be mutated concurrently
    /// with the step loop.
    RejectedRunning,
    /// The world index is out of range.
    NoSuchWorld,
}

impl AddSystemOutcome {
    /// Whether the system was attached.
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }
}

/// Run-state owner: the published running flag plus the background
/// thread slot whose mutex guards every transition.
pub(crate) struct RunControl {
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<bool>>>,
}

impl RunControl {
    pub(crate) fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
        }
    }

    /// Whether a run loop is currently executing, on either thread.
    pub(crate) fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Attempt the Idle → Running transition and execute.
    ///
    /// Guards are checked in order under the transition mutex: signal
    /// subsystem readiness, a non-empty runner collection, and no run
    /// already in flight. Each failure returns `false` with no state
    /// change.
    pub(crate) fn run(
        &self,
        runners: &[Arc<dyn WorldRunner>],
        signals: &dyn SignalMonitor,
        blocking: bool,
        iterations: u64,
        paused: bool,
    ) -> bool {
        let mut slot = self.thread.lock().unwrap();
        if !signals.initialized() {
            tracing::error!("signal handlers were not created; the server will not run");
            return false;
        }
        if runners.is_empty() {
            tracing::error!("no worlds loaded; the server will not run");
            return false;
        }
        if self.running.load(Ordering::Acquire) {
            tracing::warn!("the server is already running");
            return false;
        }

        // The initial pause state applies to every runner, regardless
        // of which of them subsequently executes iterations. A refused
        // transition leaves pause state untouched. Stop requests left
        // over from an earlier run are stale and discarded here, under
        // the transition mutex: a stop issued at any point after this
        // call commits reaches a loop that no longer clears the flag,
        // so it is never lost.
        for runner in runners {
            runner.set_paused(paused);
            runner.clear_stop_request();
        }

        if blocking {
            // Publish Running before releasing the transition mutex so
            // a concurrent call cannot also pass the guard.
            self.running.store(true, Ordering::Release);
            drop(slot);
            let ok = run_worlds(runners, iterations);
            self.running.store(false, Ordering::Release);
            return ok;
        }

        // The previous background run, if any, has finished (the
        // running guard passed); reclaim its slot before spawning.
        if let Some(handle) = slot.take() {
            let _ = handle.join();
        }

        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
        let running = Arc::clone(&self.running);
        let worlds: Vec<Arc<dyn WorldRunner>> = runners.to_vec();
        let spawned = thread::Builder::new()
            .name("gantry-run".into())
            .spawn(move || {
                // Publish Running, then signal the rendezvous. The
                // caller must not observe a stale "not running" after
                // its run call returns, even if this thread finishes
                // its iterations immediately afterwards.
                running.store(true, Ordering::Release);
                let _ = started_tx.send(());
                let ok = run_worlds(&worlds, iterations);
                running.store(false, Ordering::Release);
                ok
            });
        match spawned {
            Ok(handle) => {
                *slot = Some(handle);
                // One-shot rendezvous: block until the thread has
                // published the Running state.
                let _ = started_rx.recv();
                true
            }
            Err(err) => {
                tracing::error!(%err, "failed to spawn the run thread");
                false
            }
        }
    }

    /// Attach a system to the indexed runner, under the same mutex
    /// that serializes run transitions.
    ///
    /// The in-flight-run rejection is checked before index validity,
    /// so mutation during a run is always reported as
    /// [`AddSystemOutcome::RejectedRunning`].
    pub(crate) fn add_system(
        &self,
        runners: &[Arc<dyn WorldRunner>],
        system: Box<dyn System>,
        world_index: usize,
    ) -> AddSystemOutcome {
        let _slot = self.thread.lock().unwrap();
        if self.running.load(Ordering::Acquire) {
            tracing::error!("cannot add a system while the server is running");
            return AddSystemOutcome::RejectedRunning;
        }
        match runners.get(world_index) {
            Some(runner) => {
                runner.add_system(system);
                AddSystemOutcome::Added
            }
            None => AddSystemOutcome::NoSuchWorld,
        }
    }

    /// Join the background thread, if one was ever spawned. Called on
    /// drop, after stop has been requested.
    pub(crate) fn join(&self) {
        if let Some(handle) = self.thread.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

/// Execute every runner sequentially, in index order, on the current
/// thread. An unbounded run of an earlier world starves later ones;
/// multi-world pacing is the runners' concern, not the controller's.
fn run_worlds(runners: &[Arc<dyn WorldRunner>], iterations: u64) -> bool {
    let mut ok = true;
    for runner in runners {
        ok &= runner.run(iterations);
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::time::{Duration, Instant};

    use gantry_core::{Entity, WorldDescription};
    use gantry_runner::SceneRunner;

    struct Ready;

    impl SignalMonitor for Ready {
        fn initialized(&self) -> bool {
            true
        }
    }

    struct NotReady;

    impl SignalMonitor for NotReady {
        fn initialized(&self) -> bool {
            false
        }
    }

    fn one_runner() -> Vec<Arc<dyn WorldRunner>> {
        vec![Arc::new(SceneRunner::new(&WorldDescription::default_world()))]
    }

    #[test]
    fn blocking_run_executes_on_the_caller_thread() {
        let control = RunControl::new();
        let runners = one_runner();
        assert!(control.run(&runners, &Ready, true, 3, false));
        assert!(!control.running());
        assert_eq!(runners[0].iteration_count(), 3);
    }

    #[test]
    fn signal_precondition_blocks_the_transition() {
        let control = RunControl::new();
        let runners = one_runner();
        assert!(!control.run(&runners, &NotReady, true, 1, false));
        assert_eq!(runners[0].iteration_count(), 0);
    }

    #[test]
    fn empty_runner_collection_cannot_run() {
        let control = RunControl::new();
        assert!(!control.run(&[], &Ready, true, 1, false));
        assert!(!control.running());
    }

    #[test]
    fn nonblocking_run_is_observably_running_on_return() {
        let control = RunControl::new();
        let runners = one_runner();
        assert!(control.run(&runners, &Ready, false, 0, false));
        assert!(control.running());
        runners[0].stop();
        control.join();
        assert!(!control.running());
    }

    #[test]
    fn second_run_while_in_flight_is_rejected() {
        let control = RunControl::new();
        let runners = one_runner();
        assert!(control.run(&runners, &Ready, false, 0, false));
        assert!(!control.run(&runners, &Ready, false, 0, false));
        assert!(!control.run(&runners, &Ready, true, 1, false));
        runners[0].stop();
        control.join();
    }

    #[test]
    fn slot_is_reclaimed_after_a_finished_run() {
        let control = RunControl::new();
        let runners = one_runner();
        assert!(control.run(&runners, &Ready, false, 2, false));
        // Wait for the background run to finish.
        let deadline = Instant::now() + Duration::from_secs(2);
        while control.running() {
            assert!(Instant::now() < deadline, "run never finished");
            thread::yield_now();
        }
        assert!(control.run(&runners, &Ready, false, 2, false));
        control.join();
        assert_eq!(runners[0].iteration_count(), 4);
    }

    #[test]
    fn add_system_tri_state() {
        let control = RunControl::new();
        let runners = one_runner();
        assert_eq!(
            control.add_system(&runners, Box::new(Noop), 0),
            AddSystemOutcome::Added
        );
        assert_eq!(runners[0].system_count(), 1);
        assert_eq!(
            control.add_system(&runners, Box::new(Noop), 5),
            AddSystemOutcome::NoSuchWorld
        );

        assert!(control.run(&runners, &Ready, false, 0, false));
        assert_eq!(
            control.add_system(&runners, Box::new(Noop), 0),
            AddSystemOutcome::RejectedRunning
        );
        // Rejected while running even for an invalid index.
        assert_eq!(
            control.add_system(&runners, Box::new(Noop), 5),
            AddSystemOutcome::RejectedRunning
        );
        assert_eq!(runners[0].system_count(), 1);
        runners[0].stop();
        control.join();
    }

    struct Noop;

    impl System for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn update(&self, _iteration: u64) {}
    }

    /// Runner stub that records how many times `run` was entered and
    /// blocks until the test releases its gate, keeping the run
    /// observably in flight.
    struct GatedRunner {
        entered: AtomicU64,
        gate: crossbeam_channel::Receiver<()>,
    }

    impl WorldRunner for GatedRunner {
        fn run(&self, _iterations: u64) -> bool {
            self.entered.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.recv();
            true
        }

        fn stop(&self) {}
        fn clear_stop_request(&self) {}
        fn set_paused(&self, _paused: bool) {}
        fn paused(&self) -> bool {
            false
        }
        fn running(&self) -> bool {
            false
        }
        fn iteration_count(&self) -> u64 {
            0
        }
        fn entity_count(&self) -> usize {
            0
        }
        fn system_count(&self) -> usize {
            0
        }
        fn add_system(&self, _system: Box<dyn System>) {}
        fn has_entity(&self, _name: &str) -> bool {
            false
        }
        fn entity_by_name(&self, _name: &str) -> Option<Entity> {
            None
        }
        fn request_remove_entity_by_name(&self, _name: &str, _recursive: bool) -> bool {
            false
        }
        fn request_remove_entity(&self, _entity: Entity, _recursive: bool) -> bool {
            false
        }
        fn set_update_period(&self, _period: Duration) {}
        fn set_next_step_blocking_paused(&self, _value: bool) {}
    }

    /// Runner wrapper that delays entry into the inner loop, widening
    /// the window between the start rendezvous and the loop's first
    /// read of the stop flag.
    struct SlowStartRunner {
        inner: SceneRunner,
    }

    impl WorldRunner for SlowStartRunner {
        fn run(&self, iterations: u64) -> bool {
            thread::sleep(Duration::from_millis(50));
            self.inner.run(iterations)
        }

        fn stop(&self) {
            self.inner.stop();
        }
        fn clear_stop_request(&self) {
            self.inner.clear_stop_request();
        }
        fn set_paused(&self, paused: bool) {
            self.inner.set_paused(paused);
        }
        fn paused(&self) -> bool {
            self.inner.paused()
        }
        fn running(&self) -> bool {
            self.inner.running()
        }
        fn iteration_count(&self) -> u64 {
            self.inner.iteration_count()
        }
        fn entity_count(&self) -> usize {
            self.inner.entity_count()
        }
        fn system_count(&self) -> usize {
            self.inner.system_count()
        }
        fn add_system(&self, system: Box<dyn System>) {
            self.inner.add_system(system);
        }
        fn has_entity(&self, name: &str) -> bool {
            self.inner.has_entity(name)
        }
        fn entity_by_name(&self, name: &str) -> Option<Entity> {
            self.inner.entity_by_name(name)
        }
        fn request_remove_entity_by_name(&self, name: &str, recursive: bool) -> bool {
            self.inner.request_remove_entity_by_name(name, recursive)
        }
        fn request_remove_entity(&self, entity: Entity, recursive: bool) -> bool {
            self.inner.request_remove_entity(entity, recursive)
        }
        fn set_update_period(&self, period: Duration) {
            self.inner.set_update_period(period);
        }
        fn set_next_step_blocking_paused(&self, value: bool) {
            self.inner.set_next_step_blocking_paused(value);
        }
    }

    #[test]
    fn stop_issued_right_after_nonblocking_start_is_not_lost() {
        let control = RunControl::new();
        let runners: Vec<Arc<dyn WorldRunner>> = vec![Arc::new(SlowStartRunner {
            inner: SceneRunner::new(&WorldDescription::default_world()),
        })];
        assert!(control.run(&runners, &Ready, false, 0, false));
        assert!(control.running());

        // The background thread has not reached the inner loop yet;
        // this request must still end the unbounded run.
        runners[0].stop();
        let deadline = Instant::now() + Duration::from_secs(2);
        while control.running() {
            assert!(Instant::now() < deadline, "stop request was lost");
            thread::yield_now();
        }
        control.join();
    }

    #[test]
    fn concurrent_nonblocking_runs_have_exactly_one_winner() {
        let control = Arc::new(RunControl::new());
        let (release, gate) = crossbeam_channel::bounded::<()>(0);
        let runner = Arc::new(GatedRunner {
            entered: AtomicU64::new(0),
            gate,
        });
        let runners: Vec<Arc<dyn WorldRunner>> = vec![Arc::clone(&runner) as _];

        // The winner's run thread stays blocked on the gate, so the
        // loser deterministically observes an in-flight run whenever
        // it gets scheduled.
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let control = Arc::clone(&control);
                let runners = runners.clone();
                thread::spawn(move || control.run(&runners, &Ready, false, 1, false))
            })
            .collect();
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|&&r| r).count(), 1);
        assert_eq!(runner.entered.load(Ordering::SeqCst), 1);

        drop(release);
        control.join();
    }
}
