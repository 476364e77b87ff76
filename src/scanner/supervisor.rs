//! Scan Process Supervisor
//!
//! Owns at most one scan session at a time. `scan()` launches the configured
//! command and returns immediately; a tokio task watches the process and
//! publishes exactly one `Finished` event when it exits, fails, times out or
//! is cancelled. Lifecycle:
//!
//! ```text
//! Idle --scan()--> Running --exit 0--------------> Complete --+
//!                     |    --exit != 0 / signal---> Failed   --+--> Idle
//!                     |    --launch error---------> Failed   --+
//!                     +----cancel()---------------> Cancelled-+
//! ```

use crate::core::sync::{handle_mutex_poison, recover_poison};
use crate::notifications::api::{EventFilter, EventReceiver, NotificationManager, ScanEvent};
use crate::scanner::error::ScanError;
use crate::scanner::process;
use crate::scanner::template::CommandTemplate;
use crate::scanner::types::{ScanResult, ScanState, SessionId};
use crate::settings::{
    ConfigProvider, SettingsResult, CANCEL_GRACE_KEY, DEFAULT_CANCEL_GRACE, DEFAULT_SCANNER_DEVICE,
    DEFAULT_SCAN_COMMAND, SCANNER_DEVICE_KEY, SCAN_COMMAND_KEY, SCAN_TIMEOUT_KEY,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::process::Child;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};

/// Timing knobs for the supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Wait after the graceful terminate before force-killing
    pub cancel_grace: Duration,
    /// Sessions running longer than this are terminated and reported as failed
    pub scan_timeout: Option<Duration>,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            cancel_grace: DEFAULT_CANCEL_GRACE,
            scan_timeout: None,
        }
    }
}

impl SupervisorOptions {
    pub fn from_provider(config: &dyn ConfigProvider) -> SettingsResult<Self> {
        Ok(Self {
            cancel_grace: config
                .get_millis(CANCEL_GRACE_KEY)?
                .unwrap_or(DEFAULT_CANCEL_GRACE),
            scan_timeout: config.get_secs(SCAN_TIMEOUT_KEY)?,
        })
    }
}

struct ScanSession {
    id: SessionId,
    output_path: PathBuf,
    started_at: Instant,
    pid: Option<u32>,
    /// Taken by the first cancel request
    cancel_tx: Option<oneshot::Sender<()>>,
    done_rx: watch::Receiver<Option<ScanResult>>,
}

struct SupervisorState {
    session: Option<ScanSession>,
    last_result: ScanResult,
    next_session_id: SessionId,
}

struct Shared {
    state: Mutex<SupervisorState>,
    notifier: Mutex<NotificationManager>,
}

impl Shared {
    fn publish(&self, event: ScanEvent) {
        let mut notifier = recover_poison(self.notifier.lock());
        if let Err(e) = notifier.publish(event) {
            log::debug!("{}", e);
        }
    }

    /// Return to idle and notify observers of the terminal result
    fn finish(&self, session_id: SessionId, result: ScanResult, message: String) {
        let mut state = recover_poison(self.state.lock());
        let session = match state.session.take() {
            Some(session) if session.id == session_id => session,
            other => {
                state.session = other;
                log::warn!(
                    "Scan session {} finished but is no longer the active session",
                    session_id
                );
                return;
            }
        };
        state.last_result = result;

        log::info!(
            "Scan session {} finished: {} after {:.1?} ({})",
            session_id,
            result,
            session.started_at.elapsed(),
            message
        );

        // Still under the state lock so a following scan cannot announce itself first
        self.publish(
            ScanEvent::finished(session_id, session.output_path, result).with_message(message),
        );
    }
}

/// Launches, monitors and cancels the external scan command
pub struct ScanSupervisor {
    shared: Arc<Shared>,
    config: Arc<dyn ConfigProvider>,
    options: SupervisorOptions,
    runtime: Handle,
}

impl ScanSupervisor {
    /// Create a supervisor bound to the current tokio runtime
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        options: SupervisorOptions,
    ) -> Result<Self, ScanError> {
        let runtime = Handle::try_current().map_err(|e| ScanError::NoRuntime {
            message: e.to_string(),
        })?;
        Ok(Self::with_runtime(config, options, runtime))
    }

    /// Create a supervisor that runs its monitoring tasks on `runtime`
    pub fn with_runtime(
        config: Arc<dyn ConfigProvider>,
        options: SupervisorOptions,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SupervisorState {
                    session: None,
                    last_result: ScanResult::NotStarted,
                    next_session_id: 0,
                }),
                notifier: Mutex::new(NotificationManager::new()),
            }),
            config,
            options,
            runtime,
        }
    }

    /// Register for `Started` / `Finished` notifications
    pub fn subscribe(&self, subscriber_id: &str, filter: EventFilter) -> EventReceiver {
        recover_poison(self.shared.notifier.lock()).subscribe(
            subscriber_id.to_string(),
            filter,
            format!("scan-supervisor:{}", subscriber_id),
        )
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        recover_poison(self.shared.notifier.lock()).unsubscribe(subscriber_id)
    }

    /// True exactly while a session is running
    pub fn is_scanning(&self) -> bool {
        recover_poison(self.shared.state.lock()).session.is_some()
    }

    pub fn state(&self) -> ScanState {
        if self.is_scanning() {
            ScanState::Running
        } else {
            ScanState::Idle
        }
    }

    /// Result of the most recent finished session, `NotStarted` before any
    pub fn last_result(&self) -> ScanResult {
        recover_poison(self.shared.state.lock()).last_result
    }

    pub fn current_session(&self) -> Option<SessionId> {
        recover_poison(self.shared.state.lock())
            .session
            .as_ref()
            .map(|session| session.id)
    }

    /// Process id of the running scan command, if one was launched
    pub fn current_pid(&self) -> Option<u32> {
        recover_poison(self.shared.state.lock())
            .session
            .as_ref()
            .and_then(|session| session.pid)
    }

    /// Start a scan writing to `output_path`
    ///
    /// Publishes `Started` before returning. The outcome arrives later as a
    /// `Finished` event. Fails synchronously only when a session is already
    /// running, in which case nothing is published and the running session
    /// is unaffected. Configuration and launch problems are reported as
    /// `Finished(Failed)`.
    pub fn scan(&self, output_path: impl AsRef<Path>) -> Result<SessionId, ScanError> {
        let output_path = output_path.as_ref().to_path_buf();
        let mut state = handle_mutex_poison(self.shared.state.lock(), |message| {
            ScanError::Internal { message }
        })?;

        if let Some(active) = &state.session {
            log::warn!(
                "Rejecting scan to {}: session {} is still running",
                output_path.display(),
                active.id
            );
            return Err(ScanError::already_running(active.id));
        }

        state.next_session_id += 1;
        let session_id = state.next_session_id;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (done_tx, done_rx) = watch::channel(None);

        let launch = self.launch(session_id, &output_path);
        let pid = launch.as_ref().ok().and_then(|child| child.id());

        state.session = Some(ScanSession {
            id: session_id,
            output_path: output_path.clone(),
            started_at: Instant::now(),
            pid,
            cancel_tx: Some(cancel_tx),
            done_rx,
        });
        log::debug!(
            "Scan session {} started (pid {:?}) -> {}",
            session_id,
            pid,
            output_path.display()
        );
        self.shared
            .publish(ScanEvent::started(session_id, output_path));

        self.runtime.spawn(supervise(
            self.shared.clone(),
            session_id,
            launch,
            cancel_rx,
            done_tx,
            self.options.clone(),
        ));

        Ok(session_id)
    }

    /// Cancel the running scan, if any
    ///
    /// Returns once the process has been terminated and `Finished(Cancelled)`
    /// has been published, which takes at most the grace period plus the
    /// forced kill. Calling it while idle, or again while a cancel is in
    /// flight, has no further effect.
    pub async fn cancel(&self) {
        let done_rx = {
            let mut state = recover_poison(self.shared.state.lock());
            match state.session.as_mut() {
                None => {
                    log::debug!("Cancel requested with no scan running");
                    return;
                }
                Some(session) => {
                    if let Some(cancel_tx) = session.cancel_tx.take() {
                        log::info!("Cancelling scan session {}", session.id);
                        let _ = cancel_tx.send(());
                    }
                    session.done_rx.clone()
                }
            }
        };
        wait_done(done_rx).await;
    }

    /// Wait for the running session to finish and return its result
    ///
    /// When idle, returns the last result immediately.
    pub async fn wait(&self) -> ScanResult {
        let done_rx = {
            let state = recover_poison(self.shared.state.lock());
            match &state.session {
                None => return state.last_result,
                Some(session) => session.done_rx.clone(),
            }
        };
        match wait_done(done_rx).await {
            Some(result) => result,
            None => self.last_result(),
        }
    }

    fn launch(&self, session_id: SessionId, output_path: &Path) -> Result<Child, String> {
        let device = self
            .config
            .get_or(SCANNER_DEVICE_KEY, DEFAULT_SCANNER_DEVICE);
        let template =
            CommandTemplate::new(self.config.get_or(SCAN_COMMAND_KEY, DEFAULT_SCAN_COMMAND));
        let command = template
            .build(&device, output_path)
            .map_err(|e| e.to_string())?;

        log::debug!(
            "Scan session {} command: {}",
            session_id,
            command.command_line
        );

        let _guard = self.runtime.enter();
        process::spawn_scan(&command)
    }
}

impl Drop for ScanSupervisor {
    fn drop(&mut self) {
        let mut state = recover_poison(self.shared.state.lock());
        if let Some(session) = state.session.as_mut() {
            if let Some(cancel_tx) = session.cancel_tx.take() {
                log::info!(
                    "Scan supervisor dropped during session {}; terminating the scan",
                    session.id
                );
                let _ = cancel_tx.send(());
            }
        }
    }
}

async fn wait_done(mut done_rx: watch::Receiver<Option<ScanResult>>) -> Option<ScanResult> {
    done_rx
        .wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|result| *result)
}

/// Watch one session from launch to terminal state
async fn supervise(
    shared: Arc<Shared>,
    session_id: SessionId,
    launch: Result<Child, String>,
    cancel_rx: oneshot::Receiver<()>,
    done_tx: watch::Sender<Option<ScanResult>>,
    options: SupervisorOptions,
) {
    let (result, message) = match launch {
        Err(reason) => {
            log::warn!("Scan session {} could not start: {}", session_id, reason);
            (ScanResult::Failed, format!("failed to launch: {}", reason))
        }
        Ok(child) => run_to_completion(session_id, child, cancel_rx, &options).await,
    };

    shared.finish(session_id, result, message);
    let _ = done_tx.send(Some(result));
}

async fn run_to_completion(
    session_id: SessionId,
    mut child: Child,
    mut cancel_rx: oneshot::Receiver<()>,
    options: &SupervisorOptions,
) -> (ScanResult, String) {
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(process::log_stderr(stderr, session_id));
    }

    let scan_timeout = options.scan_timeout;
    let deadline = async move {
        match scan_timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;

        // A dropped sender means the supervisor itself went away
        _ = &mut cancel_rx => {
            let outcome = process::terminate(&mut child, options.cancel_grace).await;
            (ScanResult::Cancelled, format!("cancelled; process {}", outcome))
        }

        _ = deadline => {
            log::warn!(
                "Scan session {} exceeded {:?}; treating the scanner as hung",
                session_id,
                scan_timeout.unwrap_or_default()
            );
            let outcome = process::terminate(&mut child, options.cancel_grace).await;
            (
                ScanResult::Failed,
                format!("timed out after {:?}; process {}", scan_timeout.unwrap_or_default(), outcome),
            )
        }

        outcome = process::wait_outcome(&mut child) => {
            let result = outcome.scan_result();
            if result != ScanResult::Complete {
                log::warn!("Scan session {} process {}", session_id, outcome);
            }
            (result, format!("process {}", outcome))
        }
    }
}
