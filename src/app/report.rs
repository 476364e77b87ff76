//! Console reporting of scan lifecycle events

use crate::notifications::api::{ScanEvent, ScanObserver};
use crate::scanner::ScanResult;
use async_trait::async_trait;
use colored::Colorize;

/// Prints one line when a scan starts and one when it finishes
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Text printed for a finished scan
    pub fn finished_line(&self, event: &ScanEvent, result: ScanResult) -> String {
        let path = event.output_path.display().to_string();
        let (label, detail) = match result {
            ScanResult::Complete => ("Scan complete", path),
            ScanResult::Cancelled => ("Scan cancelled", path),
            ScanResult::Failed => (
                "Scan failed",
                event.message.clone().unwrap_or_else(|| path.clone()),
            ),
            ScanResult::NotStarted => ("Scan not started", path),
        };

        if !self.color {
            return format!("{}: {}", label, detail);
        }
        let label = match result {
            ScanResult::Complete => label.green().bold(),
            ScanResult::Cancelled => label.yellow().bold(),
            _ => label.red().bold(),
        };
        format!("{}: {}", label, detail)
    }
}

#[async_trait]
impl ScanObserver for ConsoleReporter {
    async fn on_started(&self, event: &ScanEvent) {
        eprintln!("Scanning to {}", event.output_path.display());
    }

    async fn on_finished(&self, event: &ScanEvent, result: ScanResult) {
        println!("{}", self.finished_line(event, result));
    }

    fn observer_id(&self) -> &str {
        "console"
    }
}
