//! Setting keys and their defaults

use std::time::Duration;

/// Unique identifier of the scanner device, substituted for `%device%`
pub const SCANNER_DEVICE_KEY: &str = "scanner-device";
/// Command executed to perform a scan
pub const SCAN_COMMAND_KEY: &str = "scan-command";
/// File extension of the scanned output file
pub const SCANNED_SUFFIX_KEY: &str = "scanned-suffix";
/// Milliseconds to wait after a graceful terminate before force-killing
pub const CANCEL_GRACE_KEY: &str = "cancel-grace-ms";
/// Optional upper bound on a single scan, in seconds
pub const SCAN_TIMEOUT_KEY: &str = "scan-timeout-secs";
/// Directory where the front end places scanned files
pub const OUTPUT_DIR_KEY: &str = "output-dir";

pub const LOG_LEVEL_KEY: &str = "log-level";
pub const LOG_FORMAT_KEY: &str = "log-format";
pub const LOG_FILE_KEY: &str = "log-file";
pub const COLOR_KEY: &str = "color";

/// Placeholder replaced with the configured device identifier
pub const DEVICE_PLACEHOLDER: &str = "%device%";
/// Placeholder replaced with the output file path
pub const OUTPUT_PLACEHOLDER: &str = "%out%";

pub const DEFAULT_SCANNER_DEVICE: &str = "";
pub const DEFAULT_SCAN_COMMAND: &str = "scanimage --device-name=%device% --format=png";
pub const DEFAULT_SCANNED_SUFFIX: &str = "png";
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_millis(3000);

/// Help text shown by `--show-config`, one entry per scanner key
pub const SCANNER_KEY_HELP: &[(&str, &str)] = &[
    (
        SCANNER_DEVICE_KEY,
        "Unique identifier of the scanner device",
    ),
    (
        SCAN_COMMAND_KEY,
        "Command executed to perform a scan; %device% is replaced with the device \
         and %out% with the output file (stdout is captured when %out% is absent). \
         Values are inserted unquoted into a shell command line; write \"%out%\" \
         if the path may contain spaces",
    ),
    (
        SCANNED_SUFFIX_KEY,
        "File extension of the output scanned file",
    ),
    (
        CANCEL_GRACE_KEY,
        "Milliseconds to wait for a cancelled scan to exit before killing it",
    ),
    (
        SCAN_TIMEOUT_KEY,
        "Seconds after which a running scan is treated as hung (unset: no limit)",
    ),
    (OUTPUT_DIR_KEY, "Directory for scanned files"),
];
