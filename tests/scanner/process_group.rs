//! Members of the scan's process group do not outlive the session

use crate::common::supervisor_helpers::*;
use std::time::Duration;
use vaultscan::scanner::api::ScanResult;

#[tokio::test]
async fn test_natural_exit_kills_background_members() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("background.pid");
    let supervisor = supervisor(
        "sleep 30 & echo $! > \"%out%\"",
        options(Duration::from_secs(1)),
    );

    supervisor.scan(&pid_file).unwrap();
    let result = tokio::time::timeout(TEST_TIMEOUT, supervisor.wait())
        .await
        .expect("scan should finish");
    assert_eq!(result, ScanResult::Complete);

    let background = read_pid_file(&pid_file).await;
    assert!(
        wait_process_gone(background).await,
        "background process {} outlived the scan",
        background
    );
}

#[tokio::test]
async fn test_cancel_kills_member_that_ignores_terminate() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("stubborn.pid");
    let supervisor = supervisor(
        "( trap '' TERM; exec sleep 30 ) & echo $! > \"%out%\"; wait",
        options(Duration::from_secs(3)),
    );

    supervisor.scan(&pid_file).unwrap();
    let leader = supervisor.current_pid().expect("process launched");
    let stubborn = read_pid_file(&pid_file).await;

    supervisor.cancel().await;
    assert_eq!(supervisor.last_result(), ScanResult::Cancelled);

    assert!(wait_process_gone(leader).await, "shell still alive");
    assert!(
        wait_process_gone(stubborn).await,
        "group member {} survived cancellation",
        stubborn
    );
}
