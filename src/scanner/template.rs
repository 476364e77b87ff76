//! Scan command templates
//!
//! A template is the configured command string. `%device%` is replaced with
//! the device identifier and `%out%` with the output path. Both tokens are
//! replaced in a single pass, so text coming from a substituted value is
//! never scanned again, and everything else in the template (including other
//! `%...%` sequences meant for the shell) is left untouched. Values are
//! inserted verbatim; quoting them for the shell is up to the template.

use crate::scanner::error::ScanError;
use crate::settings::{DEVICE_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(device|out)%").expect("placeholder pattern is valid"));

/// Where the scan command writes the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// The template names the output file itself via `%out%`
    Argument(PathBuf),
    /// The command writes the image to stdout, which is redirected into the file
    Stdout(PathBuf),
}

/// A fully substituted command ready to hand to the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCommand {
    pub command_line: String,
    pub output: OutputTarget,
}

/// Configured scan command with placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    raw: String,
}

impl CommandTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn uses_device(&self) -> bool {
        self.raw.contains(DEVICE_PLACEHOLDER)
    }

    pub fn uses_output(&self) -> bool {
        self.raw.contains(OUTPUT_PLACEHOLDER)
    }

    /// Check the template for problems that would make every scan fail
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.raw.trim().is_empty() {
            return Err(ScanError::Template {
                message: "scan command is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Substitute the device and output path, producing the command to run
    pub fn build(&self, device: &str, output: &Path) -> Result<ScanCommand, ScanError> {
        self.validate()?;

        if self.uses_device() && device.trim().is_empty() {
            return Err(ScanError::Template {
                message: "no scanner device configured".to_string(),
            });
        }

        let output_str = output.to_string_lossy();
        let command_line = substitute(&self.raw, device, &output_str);
        let output = if self.uses_output() {
            OutputTarget::Argument(output.to_path_buf())
        } else {
            OutputTarget::Stdout(output.to_path_buf())
        };

        Ok(ScanCommand {
            command_line,
            output,
        })
    }
}

/// Replace `%device%` and `%out%` tokens in one left-to-right pass
fn substitute(template: &str, device: &str, output: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "device" => device.to_string(),
            _ => output.to_string(),
        })
        .into_owned()
}
