//! Output placement and device substitution

use crate::common::supervisor_helpers::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vaultscan::scanner::api::{ScanResult, ScanSupervisor};
use vaultscan::settings::{ConfigProvider, SCANNER_DEVICE_KEY, SCAN_COMMAND_KEY};

#[tokio::test]
async fn test_stdout_captured_without_out_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.pnm");
    let supervisor = supervisor("printf 'device=%device%'", options(Duration::from_secs(1)));

    supervisor.scan(&path).unwrap();
    assert_eq!(supervisor.wait().await, ScanResult::Complete);

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "device=test:device:0"
    );
}

#[tokio::test]
async fn test_out_placeholder_receives_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.png");
    let supervisor = supervisor("printf scanned > %out%", options(Duration::from_secs(1)));

    supervisor.scan(&path).unwrap();
    assert_eq!(supervisor.wait().await, ScanResult::Complete);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "scanned");
}

/// Provider whose device can change between scans
struct SwitchableDevice {
    device: Mutex<String>,
}

impl ConfigProvider for SwitchableDevice {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            SCANNER_DEVICE_KEY => Some(self.device.lock().unwrap().clone()),
            SCAN_COMMAND_KEY => Some("printf %device%".to_string()),
            _ => None,
        }
    }
}

#[tokio::test]
async fn test_configuration_read_on_each_scan() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");

    let settings = Arc::new(SwitchableDevice {
        device: Mutex::new("hp:usb:1".to_string()),
    });
    let supervisor =
        ScanSupervisor::new(settings.clone(), options(Duration::from_secs(1))).unwrap();

    supervisor.scan(&first).unwrap();
    supervisor.wait().await;
    *settings.device.lock().unwrap() = "epson:net:192.168.1.5".to_string();
    supervisor.scan(&second).unwrap();
    supervisor.wait().await;

    assert_eq!(std::fs::read_to_string(&first).unwrap(), "hp:usb:1");
    assert_eq!(
        std::fs::read_to_string(&second).unwrap(),
        "epson:net:192.168.1.5"
    );
}

#[tokio::test]
async fn test_unwritable_output_fails() {
    let supervisor = supervisor("printf data", options(Duration::from_secs(1)));

    supervisor
        .scan("/nonexistent-vaultscan-dir/page.png")
        .unwrap();
    assert_eq!(supervisor.wait().await, ScanResult::Failed);
}
