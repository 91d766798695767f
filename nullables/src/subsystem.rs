//! Nullable subsystem: a scripted `run` and a recording `shutdown`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use suncoin_utils::{ShutdownSignal, Subsystem, SubsystemError};

/// Lifecycle calls recorded across several subsystems, in call order.
///
/// Entries read `run:<name>` and `shutdown:<name>`.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: String) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Names of subsystems in the order their shutdown was called.
    pub fn shutdown_order(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix("shutdown:").map(str::to_string))
            .collect()
    }
}

/// What `run` does once started.
#[derive(Clone, Debug)]
pub enum RunOutcome {
    /// Block until shut down, then return `Ok`.
    UntilShutdown,
    /// Return `Ok` after the delay.
    CompleteAfter(Duration),
    /// Return an error carrying `reason` after the delay.
    FailAfter(Duration, String),
    /// Panic after the delay.
    PanicAfter(Duration),
}

pub struct NullSubsystem {
    name: String,
    log: CallLog,
    outcome: RunOutcome,
    shutdown_error: Option<String>,
    shutdown_calls: AtomicUsize,
    stop: ShutdownSignal,
}

impl NullSubsystem {
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            outcome: RunOutcome::UntilShutdown,
            shutdown_error: None,
            shutdown_calls: AtomicUsize::new(0),
            stop: ShutdownSignal::new(),
        }
    }

    pub fn with_outcome(mut self, outcome: RunOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn failing_after(self, delay: Duration, reason: impl Into<String>) -> Self {
        self.with_outcome(RunOutcome::FailAfter(delay, reason.into()))
    }

    /// Make `shutdown` return an error. It still stops `run`.
    pub fn with_failing_shutdown(mut self, reason: impl Into<String>) -> Self {
        self.shutdown_error = Some(reason.into());
        self
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    /// The error `run` reports when scripted to fail.
    pub fn run_error(&self) -> Option<SubsystemError> {
        match &self.outcome {
            RunOutcome::FailAfter(_, reason) => Some(SubsystemError::new(&self.name, reason)),
            _ => None,
        }
    }

    async fn sleep_or_stop(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = self.stop.wait() => false,
        }
    }
}

#[async_trait]
impl Subsystem for NullSubsystem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), SubsystemError> {
        self.log.push(format!("run:{}", self.name));
        match &self.outcome {
            RunOutcome::UntilShutdown => {
                self.stop.wait().await;
                Ok(())
            }
            RunOutcome::CompleteAfter(delay) => {
                self.sleep_or_stop(*delay).await;
                Ok(())
            }
            RunOutcome::FailAfter(delay, reason) => {
                if self.sleep_or_stop(*delay).await {
                    Err(SubsystemError::new(&self.name, reason))
                } else {
                    Ok(())
                }
            }
            RunOutcome::PanicAfter(delay) => {
                tokio::time::sleep(*delay).await;
                panic!("{} blew up", self.name);
            }
        }
    }

    async fn shutdown(&self) -> Result<(), SubsystemError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("shutdown:{}", self.name));
        self.stop.fire();
        match &self.shutdown_error {
            Some(reason) => Err(SubsystemError::new(&self.name, reason)),
            None => Ok(()),
        }
    }
}
