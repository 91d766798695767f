//! Supervisor lifecycle properties, driven by nullable subsystems.

use std::sync::Arc;
use std::time::Duration;

use suncoin_node::{Supervisor, TerminationCause, WorkerState};
use suncoin_nullables::{CallLog, NullSubsystem, RunOutcome};
use suncoin_utils::{ShutdownSignal, Subsystem};

fn handles(subs: &[Arc<NullSubsystem>]) -> Vec<Arc<dyn Subsystem>> {
    subs.iter()
        .map(|s| Arc::clone(s) as Arc<dyn Subsystem>)
        .collect()
}

fn trio(log: &CallLog) -> Vec<Arc<NullSubsystem>> {
    ["a", "b", "c"]
        .into_iter()
        .map(|name| Arc::new(NullSubsystem::new(name, log)))
        .collect()
}

#[tokio::test]
async fn interrupt_shuts_down_in_reverse_order() {
    let log = CallLog::new();
    let subs = trio(&log);
    let termination = Arc::new(ShutdownSignal::new());
    let mut sup = Supervisor::start(handles(&subs), Arc::clone(&termination));
    sup.run();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(termination.fire());

    let cause = sup.await_termination().await;
    assert_eq!(cause, TerminationCause::Interrupt);
    assert!(sup.shutdown(&cause).await.is_ok());
    assert_eq!(log.shutdown_order(), vec!["c", "b", "a"]);
}

#[tokio::test]
async fn failing_worker_takes_the_node_down() {
    let log = CallLog::new();
    let a = Arc::new(NullSubsystem::new("A", &log));
    let b = Arc::new(NullSubsystem::new("B", &log).failing_after(Duration::from_millis(50), "ledger corrupted"));
    let c = Arc::new(NullSubsystem::new("C", &log));
    let expected = b.run_error().expect("B is scripted to fail");

    let termination = Arc::new(ShutdownSignal::new());
    let mut sup = Supervisor::start(
        handles(&[Arc::clone(&a), Arc::clone(&b), Arc::clone(&c)]),
        Arc::clone(&termination),
    );
    sup.run();

    let cause = tokio::time::timeout(Duration::from_secs(5), sup.await_termination())
        .await
        .expect("B fails promptly");
    assert_eq!(cause, TerminationCause::SubsystemFailed(expected.clone()));
    assert!(termination.is_fired());

    let surfaced = sup.shutdown(&cause).await.unwrap_err();
    assert_eq!(surfaced, expected);
    assert_eq!(log.shutdown_order(), vec!["C", "B", "A"]);
}

#[tokio::test]
async fn termination_fires_once_and_shutdown_is_idempotent() {
    let log = CallLog::new();
    let subs = trio(&log);
    let termination = Arc::new(ShutdownSignal::new());
    let mut sup = Supervisor::start(handles(&subs), Arc::clone(&termination));
    sup.run();

    assert!(termination.fire());
    assert!(!termination.fire());

    let cause = sup.await_termination().await;
    sup.shutdown(&cause).await.unwrap();
    sup.shutdown(&cause).await.unwrap();

    for sub in &subs {
        assert_eq!(sub.shutdown_calls(), 1);
    }
    assert_eq!(log.shutdown_order().len(), 3);
}

#[tokio::test]
async fn no_worker_outlives_shutdown() {
    let log = CallLog::new();
    let subs = trio(&log);
    let mut sup = Supervisor::start(handles(&subs), Arc::new(ShutdownSignal::new()));
    sup.run();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(sup.running_workers(), 3);

    sup.shutdown(&TerminationCause::Interrupt).await.unwrap();
    assert_eq!(sup.running_workers(), 0);
    assert!(sup
        .diagnostics()
        .snapshot()
        .iter()
        .all(|w| w.state == WorkerState::Stopped));
}

#[tokio::test]
async fn failing_handle_shutdown_does_not_block_the_others() {
    let log = CallLog::new();
    let a = Arc::new(NullSubsystem::new("a", &log));
    let b = Arc::new(NullSubsystem::new("b", &log).with_failing_shutdown("fsync failed"));
    let c = Arc::new(NullSubsystem::new("c", &log));

    let mut sup = Supervisor::start(
        handles(&[Arc::clone(&a), Arc::clone(&b), Arc::clone(&c)]),
        Arc::new(ShutdownSignal::new()),
    );
    sup.run();

    assert!(sup.shutdown(&TerminationCause::Interrupt).await.is_ok());
    assert_eq!(log.shutdown_order(), vec!["c", "b", "a"]);
    assert_eq!(sup.running_workers(), 0);
}

#[tokio::test]
async fn panicking_worker_is_reported_as_failure() {
    let log = CallLog::new();
    let a = Arc::new(NullSubsystem::new("a", &log));
    let b = Arc::new(
        NullSubsystem::new("b", &log).with_outcome(RunOutcome::PanicAfter(Duration::from_millis(10))),
    );
    let mut sup = Supervisor::start(handles(&[a, b]), Arc::new(ShutdownSignal::new()));
    sup.run();

    let cause = sup.await_termination().await;
    let TerminationCause::SubsystemFailed(err) = &cause else {
        panic!("expected failure, got {cause:?}");
    };
    assert_eq!(err.subsystem, "b");
    assert!(err.reason.contains("panicked"));

    assert!(sup.shutdown(&cause).await.is_err());
    assert_eq!(sup.running_workers(), 0);
}

#[tokio::test]
async fn workers_finishing_on_their_own_complete_the_node() {
    let log = CallLog::new();
    let subs: Vec<_> = ["x", "y"]
        .into_iter()
        .map(|name| {
            Arc::new(
                NullSubsystem::new(name, &log)
                    .with_outcome(RunOutcome::CompleteAfter(Duration::from_millis(5))),
            )
        })
        .collect();
    let mut sup = Supervisor::start(handles(&subs), Arc::new(ShutdownSignal::new()));
    sup.run();

    assert_eq!(sup.await_termination().await, TerminationCause::Completed);
    assert!(sup.shutdown(&TerminationCause::Completed).await.is_ok());
    assert_eq!(log.shutdown_order(), vec!["y", "x"]);
}

#[tokio::test]
async fn run_never_restarts_workers() {
    let log = CallLog::new();
    let subs = trio(&log);
    let mut sup = Supervisor::start(handles(&subs), Arc::new(ShutdownSignal::new()));
    sup.run();
    sup.run();
    tokio::time::sleep(Duration::from_millis(10)).await;

    sup.shutdown(&TerminationCause::Interrupt).await.unwrap();
    sup.run();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let runs = log.entries().iter().filter(|e| e.starts_with("run:")).count();
    assert_eq!(runs, 3);
    assert_eq!(sup.diagnostics().snapshot().len(), 3);
    assert_eq!(sup.running_workers(), 0);
}
