//! Output file naming

use crate::settings::{ConfigProvider, DEFAULT_SCANNED_SUFFIX, OUTPUT_DIR_KEY, SCANNED_SUFFIX_KEY};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Output path for a scan: the explicit path if given, otherwise a
/// timestamped file in the configured output directory
pub fn resolve_output_path(explicit: Option<&Path>, config: &dyn ConfigProvider) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => default_output_path(config, Local::now()),
    }
}

/// `<output-dir>/scan-YYYYmmdd-HHMMSS.<suffix>`
pub fn default_output_path(config: &dyn ConfigProvider, now: DateTime<Local>) -> PathBuf {
    let dir = config
        .get(OUTPUT_DIR_KEY)
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let suffix = config.get_or(SCANNED_SUFFIX_KEY, DEFAULT_SCANNED_SUFFIX);
    let suffix = suffix.trim().trim_start_matches('.');

    let stem = format!("scan-{}", now.format("%Y%m%d-%H%M%S"));
    if suffix.is_empty() {
        dir.join(stem)
    } else {
        dir.join(format!("{}.{}", stem, suffix))
    }
}
