//! OS signal handling for the node process.
//!
//! SIGINT and SIGTERM are forwarded as interrupts: the first fires the
//! termination signal, a second one while shutdown is still running dumps
//! diagnostics and aborts. SIGUSR1 prints a diagnostic dump and is
//! otherwise ignored.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use suncoin_utils::ShutdownSignal;

use crate::diagnostics::Diagnostics;

/// Forward every SIGINT/SIGTERM into the returned channel.
pub fn listen_for_interrupts() -> std::io::Result<mpsc::Receiver<()>> {
    let (tx, rx) = mpsc::channel(2);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    r = interrupt.recv() => r.map(|_| "SIGINT"),
                    r = terminate.recv() => r.map(|_| "SIGTERM"),
                };
                let Some(name) = received else { break };
                tracing::info!(signal = name, "received signal");
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(signal = "ctrl-c", "received signal");
            if tx.send(()).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Drive the interrupt policy over `interrupts`.
///
/// The first interrupt fires `termination`. A second one calls `escalate`,
/// which in production dumps diagnostics and aborts. Returns when the
/// interrupt source closes.
pub async fn handle_interrupts<F>(
    mut interrupts: mpsc::Receiver<()>,
    termination: Arc<ShutdownSignal>,
    escalate: F,
) where
    F: FnOnce(),
{
    if interrupts.recv().await.is_none() {
        return;
    }
    if termination.fire() {
        tracing::info!("shutting down, interrupt again to force exit");
    }
    if interrupts.recv().await.is_some() {
        tracing::error!("second interrupt during shutdown, aborting");
        escalate();
    }
}

/// Write the diagnostic dump to stderr and abort the process.
pub fn abort_with_diagnostics(diagnostics: &Diagnostics) -> ! {
    eprintln!("{}", diagnostics.dump());
    std::process::abort()
}

/// Print a diagnostic dump to stdout on every SIGUSR1.
#[cfg(unix)]
pub fn spawn_diagnostic_listener(diagnostics: Diagnostics) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut usr1 = signal(SignalKind::user_defined1())?;
    Ok(tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            println!("{}", diagnostics.dump());
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_diagnostic_listener(_diagnostics: Diagnostics) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async {}))
}
