//! Session lifecycle: event ordering and terminal classification

use crate::common::supervisor_helpers::*;
use std::time::Duration;
use vaultscan::notifications::api::{EventFilter, ScanEventType};
use vaultscan::scanner::api::{ScanResult, ScanState, SupervisorOptions};

#[tokio::test]
async fn test_successful_scan_reports_complete() {
    let supervisor = supervisor("exit 0", options(Duration::from_secs(1)));
    let mut events = subscribe_all(&supervisor, "lifecycle");

    let session = supervisor.scan("/dev/null").unwrap();

    let started = next_event(&mut events).await;
    assert_eq!(started.event_type, ScanEventType::Started);
    assert_eq!(started.session_id, session);

    let finished = next_event(&mut events).await;
    assert_eq!(finished.event_type, ScanEventType::Finished(ScanResult::Complete));
    assert_eq!(finished.session_id, session);

    assert!(!supervisor.is_scanning());
    assert_eq!(supervisor.last_result(), ScanResult::Complete);
    assert_no_event(&mut events, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_nonzero_exit_reports_failed() {
    let supervisor = supervisor("echo 'scanimage: no SANE devices found' >&2; exit 1", options(Duration::from_secs(1)));
    let mut events = subscribe_all(&supervisor, "lifecycle");

    supervisor.scan("/dev/null").unwrap();
    next_event(&mut events).await;
    let finished = next_event(&mut events).await;

    assert_eq!(finished.result(), Some(ScanResult::Failed));
    assert!(finished.message.unwrap().contains("status 1"));
}

#[tokio::test]
async fn test_missing_program_reports_failed() {
    let supervisor = supervisor(
        "vaultscan-missing-scanner-binary --device=%device%",
        options(Duration::from_secs(1)),
    );
    let mut events = subscribe_all(&supervisor, "lifecycle");

    supervisor.scan("/dev/null").unwrap();

    // Started is still published before the failure
    assert_eq!(next_event(&mut events).await.event_type, ScanEventType::Started);
    assert_eq!(
        next_event(&mut events).await.result(),
        Some(ScanResult::Failed)
    );
}

#[tokio::test]
async fn test_is_scanning_tracks_running_session() {
    let supervisor = supervisor("sleep 0.3", options(Duration::from_secs(1)));
    assert_eq!(supervisor.state(), ScanState::Idle);

    supervisor.scan("/dev/null").unwrap();
    assert!(supervisor.is_scanning());
    assert_eq!(supervisor.state(), ScanState::Running);
    assert!(supervisor.current_pid().is_some());

    assert_eq!(supervisor.wait().await, ScanResult::Complete);
    assert!(!supervisor.is_scanning());
    assert_eq!(supervisor.current_pid(), None);
}

#[tokio::test]
async fn test_started_is_published_before_scan_returns() {
    let supervisor = supervisor("sleep 5", options(Duration::from_millis(200)));
    let mut events = subscribe_all(&supervisor, "lifecycle");

    supervisor.scan("/dev/null").unwrap();

    let started = events.try_recv().expect("started already queued");
    assert_eq!(started.event_type, ScanEventType::Started);

    supervisor.cancel().await;
}

#[tokio::test]
async fn test_terminal_only_subscriber_sees_one_event_per_session() {
    let supervisor = supervisor("exit 0", options(Duration::from_secs(1)));
    let mut finished_only = supervisor.subscribe("terminal", EventFilter::TerminalOnly);

    for _ in 0..3 {
        supervisor.scan("/dev/null").unwrap();
        assert_eq!(supervisor.wait().await, ScanResult::Complete);
    }

    for _ in 0..3 {
        assert_eq!(
            next_event(&mut finished_only).await.result(),
            Some(ScanResult::Complete)
        );
    }
    assert_no_event(&mut finished_only, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_hung_scan_times_out_as_failed() {
    let supervisor = supervisor(
        "sleep 30",
        SupervisorOptions {
            cancel_grace: Duration::from_millis(200),
            scan_timeout: Some(Duration::from_millis(300)),
        },
    );
    let mut events = subscribe_all(&supervisor, "lifecycle");

    supervisor.scan("/dev/null").unwrap();
    let pid = supervisor.current_pid().expect("process launched");

    next_event(&mut events).await;
    let finished = next_event(&mut events).await;
    assert_eq!(finished.result(), Some(ScanResult::Failed));
    assert!(finished.message.unwrap().contains("timed out"));
    assert!(wait_process_gone(pid).await);
}

#[tokio::test]
async fn test_unsubscribed_observer_receives_nothing_more() {
    let supervisor = supervisor("exit 0", options(Duration::from_secs(1)));
    let mut events = subscribe_all(&supervisor, "leaving");
    assert!(supervisor.unsubscribe("leaving"));

    supervisor.scan("/dev/null").unwrap();
    supervisor.wait().await;

    assert!(events.recv().await.is_none());
}
