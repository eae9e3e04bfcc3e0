//! Default signal-readiness monitor.
//!
//! The signal-handling subsystem itself lives outside the
//! orchestration core; the server only consults a
//! [`SignalMonitor`](gantry_core::SignalMonitor) before starting a
//! run. Handler registration is the embedding application's concern.

use gantry_core::SignalMonitor;

/// Monitor reporting that process-level handlers are installed.
///
/// The stock collaborator bundle uses this; tests inject a never-ready
/// monitor to exercise the run precondition failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstalledSignals;

impl SignalMonitor for InstalledSignals {
    fn initialized(&self) -> bool {
        true
    }
}
