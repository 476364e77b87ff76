//! Simple progress spinner for terminal feedback

use crate::notifications::api::{EventReceiver, ScanEventType};
use std::io::Write;
use thiserror::Error;
use tokio::time::{interval, Duration};

/// Module-local result type for spinner operations
type Result<T> = std::result::Result<T, SpinnerError>;

/// Errors specific to the spinner module
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpinnerError {
    /// Writing to the terminal failed
    #[error("Failed to draw spinner: {reason}")]
    Terminal { reason: String },
}

impl From<std::io::Error> for SpinnerError {
    fn from(err: std::io::Error) -> Self {
        SpinnerError::Terminal {
            reason: err.to_string(),
        }
    }
}

const BRAILLE_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Check if spinner should be displayed
pub fn should_show_spinner() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr()) && !log::log_enabled!(log::Level::Info)
}

/// Simple spinner struct
pub struct ProgressSpinner {
    frame_index: usize,
}

impl Default for ProgressSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSpinner {
    pub fn new() -> Self {
        Self { frame_index: 0 }
    }

    fn next_frame(&mut self) -> char {
        let frame = BRAILLE_FRAMES[self.frame_index];
        self.frame_index = (self.frame_index + 1) % BRAILLE_FRAMES.len();
        frame
    }

    pub fn tick(&mut self, out: &mut impl Write) -> Result<()> {
        let frame = self.next_frame();
        write!(out, "\r{frame} scanning")?;
        out.flush()?;
        Ok(())
    }

    pub fn finish(&self, out: &mut impl Write) -> Result<()> {
        write!(out, "\r           \r")?;
        out.flush()?;
        Ok(())
    }
}

/// Animate until the scan's `Finished` event arrives or the publisher goes away
pub async fn run_spinner(mut events: EventReceiver) -> Result<()> {
    let mut spinner = ProgressSpinner::new();
    let mut update_interval = interval(Duration::from_millis(100)); // 10Hz
    let mut stderr = std::io::stderr();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) if matches!(event.event_type, ScanEventType::Finished(_)) => {
                        return spinner.finish(&mut stderr);
                    }
                    Some(_) => {}
                    None => return spinner.finish(&mut stderr),
                }
            }

            _ = update_interval.tick() => {
                spinner.tick(&mut stderr)?;
            }
        }
    }
}
