//! At most one session at a time

use crate::common::supervisor_helpers::*;
use std::time::Duration;
use vaultscan::notifications::api::ScanEventType;
use vaultscan::scanner::api::{ScanError, ScanResult};

#[tokio::test]
async fn test_second_scan_rejected_while_running() {
    let supervisor = supervisor("sleep 0.5", options(Duration::from_secs(1)));
    let mut events = subscribe_all(&supervisor, "concurrency");

    let first = supervisor.scan("/tmp/vaultscan-first.png").unwrap();
    let pid = supervisor.current_pid();

    let err = supervisor.scan("/tmp/vaultscan-second.png").unwrap_err();
    match err {
        ScanError::AlreadyRunning { session_id, .. } => assert_eq!(session_id, first),
        other => panic!("unexpected error: {:?}", other),
    }

    // The running session is untouched
    assert!(supervisor.is_scanning());
    assert_eq!(supervisor.current_session(), Some(first));
    assert_eq!(supervisor.current_pid(), pid);

    assert_eq!(supervisor.wait().await, ScanResult::Complete);

    let started = next_event(&mut events).await;
    assert_eq!(started.event_type, ScanEventType::Started);
    assert_eq!(started.session_id, first);
    let finished = next_event(&mut events).await;
    assert_eq!(finished.session_id, first);
    assert_eq!(finished.result(), Some(ScanResult::Complete));
    assert_no_event(&mut events, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_new_scan_accepted_after_previous_finishes() {
    let supervisor = supervisor("exit 0", options(Duration::from_secs(1)));

    let first = supervisor.scan("/dev/null").unwrap();
    supervisor.wait().await;
    let second = supervisor.scan("/dev/null").unwrap();
    supervisor.wait().await;

    assert_ne!(first, second);
}

#[tokio::test]
async fn test_new_scan_accepted_after_cancel() {
    let supervisor = supervisor("sleep 30", options(Duration::from_millis(500)));

    supervisor.scan("/dev/null").unwrap();
    supervisor.cancel().await;
    assert!(!supervisor.is_scanning());

    supervisor.scan("/dev/null").unwrap();
    assert!(supervisor.is_scanning());
    supervisor.cancel().await;
}
