//! Uniform lifecycle for long-running node components.
//!
//! The database, the network daemon, the RPC server and the web interface
//! are all driven the same way by the supervisor: one worker awaits
//! [`Subsystem::run`] while the control task may later call
//! [`Subsystem::shutdown`] to make that `run` return.

use async_trait::async_trait;
use thiserror::Error;

/// A failure reported by a subsystem's `run` or `shutdown`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{subsystem}: {reason}")]
pub struct SubsystemError {
    /// Name of the subsystem that failed.
    pub subsystem: String,
    /// Human-readable failure description.
    pub reason: String,
}

impl SubsystemError {
    pub fn new(subsystem: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            subsystem: subsystem.into(),
            reason: reason.to_string(),
        }
    }
}

/// A component with a blocking `run` and an idempotent `shutdown`.
///
/// Implementations must make an in-flight `run` return promptly once
/// `shutdown` has been called, and must tolerate `shutdown` being invoked
/// before `run` has started or after it has already returned.
#[async_trait]
pub trait Subsystem: Send + Sync {
    /// Stable name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Run until the subsystem stops or fails.
    async fn run(&self) -> Result<(), SubsystemError>;

    /// Ask the subsystem to stop. Must not block indefinitely.
    async fn shutdown(&self) -> Result<(), SubsystemError>;
}
