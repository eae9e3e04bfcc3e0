//! Log-record system, attached when the configuration asks for it.

use std::sync::atomic::{AtomicU64, Ordering};

use gantry_core::System;

/// System that records every advanced step to the diagnostic sink.
///
/// Attached to each runner at construction when
/// [`ServerConfig::record_log`](crate::ServerConfig::record_log) is
/// set; counts toward the runner's system count like any other system.
#[derive(Debug, Default)]
pub struct RecordSystem {
    recorded: AtomicU64,
}

impl RecordSystem {
    /// A fresh record system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps recorded so far.
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }
}

impl System for RecordSystem {
    fn name(&self) -> &str {
        "log_record"
    }

    fn update(&self, iteration: u64) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(iteration, "recorded simulation step");
    }
}
