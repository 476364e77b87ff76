//! Command-line arguments
//!
//! Every option that maps onto a settings key is collected into a
//! [`MemorySettings`] overlay so the rest of the program only ever reads
//! through a `ConfigProvider`.

use crate::settings::{
    MemorySettings, CANCEL_GRACE_KEY, COLOR_KEY, LOG_FILE_KEY, LOG_FORMAT_KEY, LOG_LEVEL_KEY,
    OUTPUT_DIR_KEY, SCANNED_SUFFIX_KEY, SCANNER_DEVICE_KEY, SCAN_COMMAND_KEY, SCAN_TIMEOUT_KEY,
};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vaultscan")]
#[command(about = "Acquire a document image through an external scanner command")]
#[command(disable_version_flag = true)]
#[command(
    after_help = "Placeholders in the scan command: %device% (scanner device), %out% (output file).\nWithout %out% the command's standard output is written to the output file."
)]
pub struct Args {
    /// Output file (default: <output-dir>/scan-<timestamp>.<suffix>)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Scanner device identifier, substituted for %device%
    #[arg(short = 'd', long = "device", value_name = "DEVICE")]
    pub device: Option<String>,

    /// Scan command template (%device% and %out% are inserted unquoted)
    #[arg(short = 's', long = "scan-command", value_name = "COMMAND")]
    pub scan_command: Option<String>,

    /// File extension of the scanned file
    #[arg(long = "suffix", value_name = "EXT")]
    pub suffix: Option<String>,

    /// Directory for scanned files when OUTPUT is not given
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Milliseconds a cancelled scan may take to exit before it is killed
    #[arg(long = "grace-ms", value_name = "MILLIS")]
    pub grace_ms: Option<u64>,

    /// Seconds after which a running scan is treated as hung (0: no limit)
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long = "show-config")]
    pub show_config: bool,

    /// Print version information and exit
    #[arg(short = 'V', long = "version")]
    pub version: bool,
}

impl Args {
    /// Settings supplied on the command line, to be layered over the file
    pub fn overrides(&self) -> MemorySettings {
        let mut settings = MemorySettings::new();

        if let Some(device) = &self.device {
            settings.set(SCANNER_DEVICE_KEY, device.clone());
        }
        if let Some(command) = &self.scan_command {
            settings.set(SCAN_COMMAND_KEY, command.clone());
        }
        if let Some(suffix) = &self.suffix {
            settings.set(SCANNED_SUFFIX_KEY, suffix.clone());
        }
        if let Some(dir) = &self.output_dir {
            settings.set(OUTPUT_DIR_KEY, dir.to_string_lossy());
        }
        if let Some(grace) = self.grace_ms {
            settings.set(CANCEL_GRACE_KEY, grace.to_string());
        }
        if let Some(timeout) = self.timeout {
            settings.set(SCAN_TIMEOUT_KEY, timeout.to_string());
        }
        if let Some(level) = &self.log_level {
            settings.set(LOG_LEVEL_KEY, level.clone());
        }
        if let Some(format) = &self.log_format {
            settings.set(LOG_FORMAT_KEY, format.clone());
        }
        if let Some(file) = &self.log_file {
            settings.set(LOG_FILE_KEY, file.to_string_lossy());
        }
        if self.color {
            settings.set(COLOR_KEY, "true");
        } else if self.no_color {
            settings.set(COLOR_KEY, "false");
        }

        settings
    }
}
