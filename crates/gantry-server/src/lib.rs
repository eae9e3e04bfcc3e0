//! Multi-world lifecycle orchestrator for the Gantry simulation server.
//!
//! Provides the top-level [`Server`] that resolves a configured world
//! source into per-world runners and drives the run/stop/pause state
//! machine with an at-most-one-background-thread guarantee.
//!
//! # Architecture
//!
//! ```text
//! Caller Thread                     Run Thread (at most one)
//!     |                                  |
//!     |--Server::new(config)             |
//!     |    resolve source -> document    |
//!     |    document -> runners[0..N)     |
//!     |                                  |
//!     |--run(blocking=false)------------>| spawn
//!     |    [guards under run mutex]      | running.store(true)
//!     |    blocks on bounded(1) recv <---| rendezvous send
//!     |                                  | runners[i].run(iterations)
//!     |--dispatch by world index         | running.store(false)
//!     |    (absent on bad index)         |
//!     |--stop(): runners[i].stop()       | loop observes stop flag
//! ```
//!
//! Construction-time resolution completes, successfully or with
//! recorded errors, before any run or dispatch call; a failed
//! resolution leaves zero runners and every subsequent run returns
//! `false` without side effects.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod control;
pub mod record;
pub mod resolver;
pub mod script;
pub mod server;
pub mod signal;

pub use config::{ServerConfig, WorldSource};
pub use control::AddSystemOutcome;
pub use record::RecordSystem;
pub use server::{Collaborators, Server};
pub use signal::InstalledSignals;
