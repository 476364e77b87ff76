use super::*;

#[test]
fn test_config_file_supplies_scanner_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("vaultscan.toml");
    let out = dir.path().join("page.txt");
    std::fs::write(
        &config,
        "scanner-device = \"file:device\"\nscan-command = \"printf %device%\"\n",
    )
    .unwrap();

    let output = run_vaultscan(
        dir.path(),
        &[
            "--config-file",
            config.to_str().unwrap(),
            out.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "file:device");
}

#[test]
fn test_command_line_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("vaultscan.toml");
    let out = dir.path().join("page.txt");
    std::fs::write(
        &config,
        "scanner-device = \"file:device\"\nscan-command = \"printf %device%\"\n",
    )
    .unwrap();

    let output = run_vaultscan(
        dir.path(),
        &[
            "--config-file",
            config.to_str().unwrap(),
            "--device",
            "cli:device",
            out.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "cli:device");
}

#[test]
fn test_missing_config_file_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let output = run_vaultscan(
        dir.path(),
        &["--config-file", missing.to_str().unwrap(), "--show-config"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("absent.toml"));
}

#[test]
fn test_invalid_grace_in_config_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("vaultscan.toml");
    std::fs::write(&config, "cancel-grace-ms = \"soon\"\n").unwrap();

    let output = run_vaultscan(
        dir.path(),
        &["--config-file", config.to_str().unwrap(), "/dev/null"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("cancel-grace-ms"));
}

#[test]
fn test_show_config_lists_effective_values() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_vaultscan(dir.path(), &["--device", "hp:usb:1", "--show-config"]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("scanner-device = \"hp:usb:1\""));
    assert!(text.contains("cancel-grace-ms = \"3000\""));
    assert!(text.contains("scan-command = \"scanimage --device-name=%device% --format=png\""));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_vaultscan(dir.path(), &["--version"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with(&format!("vaultscan {}", env!("CARGO_PKG_VERSION"))));
}
