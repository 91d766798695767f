//! Single-fire, broadcast shutdown signal.
//!
//! Used both as the node-wide termination signal and as the internal stop
//! switch of every subsystem handle.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// A broadcast signal that fires at most once and never resets.
///
/// Listeners that subscribe after the signal fired observe it immediately.
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
    fired: AtomicBool,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx,
            fired: AtomicBool::new(false),
        }
    }

    /// Fire the signal. Returns `true` only for the call that fired it;
    /// every later call is a no-op returning `false`.
    pub fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.tx.send_replace(true);
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Get a listener that resolves once the signal fires.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Wait until the signal fires.
    pub async fn wait(&self) {
        self.subscribe().wait().await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`ShutdownSignal`].
#[derive(Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once the signal has fired (or its owner was dropped).
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|fired| *fired).await;
    }

    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn fire_notifies_all_listeners() {
        let signal = ShutdownSignal::new();
        let mut a = signal.subscribe();
        let mut b = signal.subscribe();
        assert!(signal.fire());
        a.wait().await;
        b.wait().await;
        assert!(a.is_fired() && b.is_fired());
    }

    #[tokio::test]
    async fn late_subscriber_sees_fired_signal() {
        let signal = ShutdownSignal::new();
        signal.fire();
        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .expect("already fired");
    }

    #[test]
    fn only_first_fire_reports_true() {
        let signal = ShutdownSignal::new();
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[tokio::test]
    async fn unfired_signal_keeps_listeners_waiting() {
        let signal = ShutdownSignal::new();
        let mut listener = signal.subscribe();
        let waited = tokio::time::timeout(Duration::from_millis(50), listener.wait()).await;
        assert!(waited.is_err());
        assert!(!listener.is_fired());
    }
}
