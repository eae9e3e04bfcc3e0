//! Process-wide script-host bootstrap.
//!
//! Script systems may call into an embedded interpreter whose state is
//! process-global. The host is initialized at most once, on the first
//! server construction, and deliberately never finalized: plugin
//! callbacks can still invoke script code during teardown ordering, so
//! tearing the host down with one server would break every other user
//! in the process.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the script host has been initialized in this process.
static SCRIPT_HOST_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Initialize the script host if this is the first call in the
/// process. Idempotent; returns `true` only for the call that
/// performed the initialization.
pub fn bootstrap() -> bool {
    if SCRIPT_HOST_ACTIVE
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return false;
    }
    tracing::debug!("script host initialized for the process lifetime");
    true
}

/// Whether the script host is available.
pub fn active() -> bool {
    SCRIPT_HOST_ACTIVE.load(Ordering::Acquire)
}
