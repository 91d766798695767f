//! Subsystem supervisor: ordered startup, concurrent run, reverse shutdown.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use suncoin_utils::{ShutdownSignal, Subsystem, SubsystemError};

use crate::diagnostics::{Diagnostics, WorkerState};

/// Why the node began shutting down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationCause {
    /// The termination signal fired (operator interrupt).
    Interrupt,
    /// A worker's `run` returned an error.
    SubsystemFailed(SubsystemError),
    /// Every worker returned `Ok` on its own.
    Completed,
}

/// One worker's final result.
struct Report {
    slot: usize,
    result: Result<(), SubsystemError>,
}

/// Decrements the running-worker counter when a worker exits, panics included.
struct CompletionGuard(Arc<AtomicUsize>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the registered handles and the workers running them.
///
/// Handles are started in registration order and shut down in reverse,
/// since later subsystems hold references into earlier ones.
pub struct Supervisor {
    handles: Vec<Arc<dyn Subsystem>>,
    termination: Arc<ShutdownSignal>,
    reports_tx: mpsc::Sender<Report>,
    reports: mpsc::Receiver<Report>,
    running: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
    reported: usize,
    started: bool,
    diagnostics: Diagnostics,
    outcome: Option<Result<(), SubsystemError>>,
}

impl Supervisor {
    /// Register `handles` in startup order. Nothing runs until [`run`].
    ///
    /// [`run`]: Supervisor::run
    pub fn start(handles: Vec<Arc<dyn Subsystem>>, termination: Arc<ShutdownSignal>) -> Self {
        // One report per worker, so a send never waits.
        let (reports_tx, reports) = mpsc::channel(handles.len().max(1));
        Self {
            handles,
            termination,
            reports_tx,
            reports,
            running: Arc::new(AtomicUsize::new(0)),
            workers: Vec::new(),
            reported: 0,
            started: false,
            diagnostics: Diagnostics::new(),
            outcome: None,
        }
    }

    /// Launch one worker per handle and return immediately.
    ///
    /// Must be called from within a tokio runtime. Only the first call
    /// launches workers; later calls, including after [`shutdown`], do nothing.
    ///
    /// [`shutdown`]: Supervisor::shutdown
    pub fn run(&mut self) {
        if self.started || self.outcome.is_some() {
            return;
        }
        self.started = true;
        for handle in &self.handles {
            let slot = self.diagnostics.register(handle.name());
            self.running.fetch_add(1, Ordering::SeqCst);
            let guard = CompletionGuard(Arc::clone(&self.running));
            let worker = work(
                slot,
                Arc::clone(handle),
                self.reports_tx.clone(),
                self.diagnostics.clone(),
                guard,
            );
            self.workers.push(tokio::spawn(worker));
            tracing::info!(subsystem = handle.name(), "subsystem started");
        }
    }

    /// Block until an interrupt fires or a worker fails.
    ///
    /// A worker failure fires the termination signal itself, so every
    /// listener observes exactly one termination.
    pub async fn await_termination(&mut self) -> TerminationCause {
        let mut termination = self.termination.subscribe();
        loop {
            if self.reported == self.handles.len() {
                return TerminationCause::Completed;
            }
            tokio::select! {
                biased;
                report = self.reports.recv() => {
                    let Some(report) = report else {
                        return TerminationCause::Completed;
                    };
                    self.reported += 1;
                    let name = self.handles[report.slot].name();
                    match report.result {
                        Ok(()) => tracing::info!(subsystem = name, "subsystem finished"),
                        Err(err) => {
                            tracing::error!(subsystem = name, error = %err, "subsystem failed, shutting down node");
                            self.termination.fire();
                            return TerminationCause::SubsystemFailed(err);
                        }
                    }
                }
                _ = termination.wait() => return TerminationCause::Interrupt,
            }
        }
    }

    /// Shut every handle down in reverse order and wait for all workers.
    ///
    /// Returns the failing worker's error when `cause` is a subsystem
    /// failure. Calling it again returns the same result without touching
    /// any handle.
    pub async fn shutdown(&mut self, cause: &TerminationCause) -> Result<(), SubsystemError> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        self.termination.fire();

        for handle in self.handles.iter().rev() {
            tracing::info!(subsystem = handle.name(), "shutting down");
            if let Err(err) = handle.shutdown().await {
                tracing::error!(subsystem = handle.name(), error = %err, "shutdown failed");
            }
        }

        for worker in self.workers.drain(..) {
            if let Err(err) = worker.await {
                tracing::error!(error = %err, "worker task did not complete");
            }
        }

        while let Ok(report) = self.reports.try_recv() {
            self.reported += 1;
            if let Err(err) = report.result {
                let name = self.handles[report.slot].name();
                tracing::warn!(subsystem = name, error = %err, "subsystem returned an error while stopping");
            }
        }

        let outcome = match cause {
            TerminationCause::SubsystemFailed(err) => Err(err.clone()),
            TerminationCause::Interrupt | TerminationCause::Completed => Ok(()),
        };
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Number of workers whose `run` has not yet returned.
    pub fn running_workers(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.clone()
    }

    pub fn termination(&self) -> Arc<ShutdownSignal> {
        Arc::clone(&self.termination)
    }
}

async fn work(
    slot: usize,
    handle: Arc<dyn Subsystem>,
    reports: mpsc::Sender<Report>,
    diagnostics: Diagnostics,
    _guard: CompletionGuard,
) {
    diagnostics.set_state(slot, WorkerState::Running);
    let result = match AssertUnwindSafe(handle.run()).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(SubsystemError::new(
            handle.name(),
            format!("panicked: {}", panic_message(panic.as_ref())),
        )),
    };
    diagnostics.set_state(
        slot,
        match &result {
            Ok(()) => WorkerState::Stopped,
            Err(err) => WorkerState::Failed(err.reason.clone()),
        },
    );
    let _ = reports.send(Report { slot, result }).await;
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_rendered() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }

    #[tokio::test]
    async fn no_handles_completes_immediately() {
        let mut sup = Supervisor::start(Vec::new(), Arc::new(ShutdownSignal::new()));
        sup.run();
        assert_eq!(sup.await_termination().await, TerminationCause::Completed);
        assert!(sup.shutdown(&TerminationCause::Completed).await.is_ok());
    }
}
