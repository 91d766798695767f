//! Nullable infrastructure for deterministic testing.
//!
//! Subsystems are abstracted behind the [`Subsystem`] trait. This crate
//! provides a scriptable implementation that:
//! - Records every lifecycle call into a shared [`CallLog`]
//! - Runs until shut down, or completes, fails or panics on cue
//! - Never touches the filesystem or network
//!
//! [`Subsystem`]: suncoin_utils::Subsystem

pub mod subsystem;

pub use subsystem::{CallLog, NullSubsystem, RunOutcome};
