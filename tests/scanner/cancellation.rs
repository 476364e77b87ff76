//! Cancellation: graceful terminate, forced kill, and cleanup

use crate::common::supervisor_helpers::*;
use std::time::{Duration, Instant};
use vaultscan::notifications::api::ScanEventType;
use vaultscan::scanner::api::ScanResult;

#[tokio::test]
async fn test_cancel_running_scan() {
    let supervisor = supervisor("sleep 30", options(Duration::from_secs(3)));
    let mut events = subscribe_all(&supervisor, "cancel");

    supervisor.scan("/dev/null").unwrap();
    let pid = supervisor.current_pid().expect("process launched");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started_at = Instant::now();
    supervisor.cancel().await;

    // sleep exits on SIGTERM well within the grace period
    assert!(started_at.elapsed() < Duration::from_secs(3));
    assert!(!supervisor.is_scanning());
    assert_eq!(supervisor.last_result(), ScanResult::Cancelled);

    assert_eq!(next_event(&mut events).await.event_type, ScanEventType::Started);
    assert_eq!(
        next_event(&mut events).await.result(),
        Some(ScanResult::Cancelled)
    );
    assert_no_event(&mut events, Duration::from_millis(200)).await;

    assert!(wait_process_gone(pid).await, "scan process still alive");
}

#[tokio::test]
async fn test_cancel_escalates_when_terminate_ignored() {
    let grace = Duration::from_millis(300);
    let supervisor = supervisor("trap '' TERM; while true; do sleep 0.05; done", options(grace));
    let mut events = subscribe_all(&supervisor, "cancel");

    supervisor.scan("/dev/null").unwrap();
    let pid = supervisor.current_pid().expect("process launched");
    // Let the shell install its trap
    tokio::time::sleep(Duration::from_millis(150)).await;

    let started_at = Instant::now();
    supervisor.cancel().await;
    let elapsed = started_at.elapsed();

    assert!(elapsed >= grace, "killed before the grace period: {:?}", elapsed);
    assert!(elapsed < grace + Duration::from_secs(5));
    assert_eq!(supervisor.last_result(), ScanResult::Cancelled);

    next_event(&mut events).await;
    assert_eq!(
        next_event(&mut events).await.result(),
        Some(ScanResult::Cancelled)
    );
    assert!(wait_process_gone(pid).await, "scan process still alive");
}

#[tokio::test]
async fn test_second_cancel_is_harmless() {
    let supervisor = supervisor("sleep 30", options(Duration::from_secs(1)));
    let mut events = subscribe_all(&supervisor, "cancel");

    supervisor.scan("/dev/null").unwrap();
    tokio::join!(supervisor.cancel(), supervisor.cancel());
    supervisor.cancel().await;

    next_event(&mut events).await;
    assert_eq!(
        next_event(&mut events).await.result(),
        Some(ScanResult::Cancelled)
    );
    assert_no_event(&mut events, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_cancel_after_finish_keeps_result() {
    let supervisor = supervisor("exit 0", options(Duration::from_secs(1)));
    supervisor.scan("/dev/null").unwrap();
    assert_eq!(supervisor.wait().await, ScanResult::Complete);

    supervisor.cancel().await;
    assert_eq!(supervisor.last_result(), ScanResult::Complete);
}

#[tokio::test]
async fn test_dropping_supervisor_terminates_scan() {
    let supervisor = supervisor("sleep 30", options(Duration::from_millis(500)));
    let mut events = subscribe_all(&supervisor, "drop");

    supervisor.scan("/dev/null").unwrap();
    let pid = supervisor.current_pid().expect("process launched");
    drop(supervisor);

    next_event(&mut events).await;
    assert_eq!(
        next_event(&mut events).await.result(),
        Some(ScanResult::Cancelled)
    );
    assert!(wait_process_gone(pid).await, "scan outlived its supervisor");
}

#[tokio::test]
async fn test_cancel_immediately_after_scan() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = supervisor("sleep 30", options(Duration::from_secs(1)));
    let mut events = subscribe_all(&supervisor, "cancel");

    supervisor.scan(dir.path().join("out.png")).unwrap();
    let pid = supervisor.current_pid().expect("process launched");
    supervisor.cancel().await;

    assert_eq!(supervisor.last_result(), ScanResult::Cancelled);
    next_event(&mut events).await;
    assert_eq!(
        next_event(&mut events).await.result(),
        Some(ScanResult::Cancelled)
    );
    assert!(wait_process_gone(pid).await, "scan process still alive");
}
