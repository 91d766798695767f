//! Shared utilities for the Suncoin node.

pub mod shutdown;
pub mod subsystem;
pub mod time;

pub use shutdown::{ShutdownListener, ShutdownSignal};
pub use subsystem::{Subsystem, SubsystemError};
pub use time::format_duration;
