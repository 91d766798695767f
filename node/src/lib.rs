//! Suncoin node supervisor.
//!
//! The supervisor owns the lifecycle of every long-running subsystem:
//! - Runs each handle on its own worker task
//! - Turns the first interrupt or worker failure into node-wide termination
//! - Shuts handles down in reverse startup order and joins every worker
//! - Escalates a second interrupt into a diagnostic dump and abort
//!
//! Configuration loading and logging setup for the daemon binary live here
//! as well.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod signals;
pub mod supervisor;

pub use config::NodeConfig;
pub use diagnostics::{Diagnostics, WorkerSnapshot, WorkerState};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use supervisor::{Supervisor, TerminationCause};
