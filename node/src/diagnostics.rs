//! Live concurrency diagnostics for stuck or misbehaving nodes.
//!
//! The supervisor records every worker here. A dump renders the worker
//! table, tokio runtime counters and a backtrace of the dumping thread; it
//! is written on the diagnostic signal and before an escalated abort.

use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use suncoin_utils::format_duration;

/// Lifecycle state of a supervised worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Pending,
    Running,
    Stopped,
    Failed(String),
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Running => f.write_str("running"),
            Self::Stopped => f.write_str("stopped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// A worker's state at the time of the snapshot.
#[derive(Clone, Debug)]
pub struct WorkerSnapshot {
    pub name: String,
    pub state: WorkerState,
    /// Time spent in the current state.
    pub elapsed: Duration,
}

struct Entry {
    name: String,
    state: WorkerState,
    since: Instant,
}

/// Shared worker registry. Cloning yields another handle to the same table.
#[derive(Clone, Default)]
pub struct Diagnostics {
    workers: Arc<Mutex<Vec<Entry>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.workers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a worker and return its slot.
    pub fn register(&self, name: &str) -> usize {
        let mut workers = self.lock();
        workers.push(Entry {
            name: name.to_string(),
            state: WorkerState::Pending,
            since: Instant::now(),
        });
        workers.len() - 1
    }

    pub fn set_state(&self, slot: usize, state: WorkerState) {
        if let Some(entry) = self.lock().get_mut(slot) {
            entry.state = state;
            entry.since = Instant::now();
        }
    }

    pub fn snapshot(&self) -> Vec<WorkerSnapshot> {
        self.lock()
            .iter()
            .map(|e| WorkerSnapshot {
                name: e.name.clone(),
                state: e.state.clone(),
                elapsed: e.since.elapsed(),
            })
            .collect()
    }

    /// Render the full diagnostic report.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== suncoin node diagnostics ===");
        let _ = writeln!(out, "workers (running first, longest first):");
        let mut workers = self.snapshot();
        workers.sort_by_key(|w| (w.state != WorkerState::Running, std::cmp::Reverse(w.elapsed)));
        for w in workers {
            let _ = writeln!(
                out,
                "  {:<12} {:<24} for {}",
                w.name,
                w.state.to_string(),
                format_duration(w.elapsed)
            );
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let metrics = handle.metrics();
                let _ = writeln!(
                    out,
                    "runtime: {} worker threads, {} alive tasks",
                    metrics.num_workers(),
                    metrics.num_alive_tasks()
                );
            }
            Err(_) => {
                let _ = writeln!(out, "runtime: not inside a tokio runtime");
            }
        }

        // Async tasks have no stack of their own to capture.
        let _ = writeln!(
            out,
            "backtrace of the dumping thread {:?} only, not of worker tasks:",
            std::thread::current().name()
        );
        let _ = writeln!(out, "{}", Backtrace::force_capture());
        out
    }
}
