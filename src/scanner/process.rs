//! External process handling for scan sessions
//!
//! Launches the scan command under the platform shell, classifies how it
//! ended, and terminates it on request. On unix the command runs in its own
//! process group so a pipeline started by the shell is signalled as a whole.
//!
//! Whenever a session ends, stragglers left in the group are killed. On Linux
//! the shell is observed with `waitid(WNOWAIT)` and only reaped after that
//! sweep, so the group id cannot have been reused by then. Other unix systems
//! sweep only on terminate, immediately after reaping the shell, which
//! leaves a small window for group id reuse. Windows has no sweep.

use crate::scanner::template::{OutputTarget, ScanCommand};
use crate::scanner::types::ScanResult;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};

/// Shell exit status when the command could not be executed
const SHELL_NOT_EXECUTABLE: i32 = 126;
/// Shell exit status when the command was not found
const SHELL_NOT_FOUND: i32 = 127;

/// How a scan process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Normal exit with a status code
    Exited { code: i32 },
    /// Killed by a signal or otherwise ended without a code
    Abnormal { signal: Option<i32> },
    /// The command could not be started at all
    LaunchFailed { reason: String },
}

impl ProcessOutcome {
    /// Classify an exit status, treating shell 126/127 as launch failures
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(SHELL_NOT_EXECUTABLE) => ProcessOutcome::LaunchFailed {
                reason: "command is not executable".to_string(),
            },
            Some(SHELL_NOT_FOUND) => ProcessOutcome::LaunchFailed {
                reason: "command not found".to_string(),
            },
            Some(code) => ProcessOutcome::Exited { code },
            None => ProcessOutcome::Abnormal {
                signal: exit_signal(&status),
            },
        }
    }

    /// Collapse into the result reported to observers
    pub fn scan_result(&self) -> ScanResult {
        match self {
            ProcessOutcome::Exited { code: 0 } => ScanResult::Complete,
            _ => ScanResult::Failed,
        }
    }
}

impl std::fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessOutcome::Exited { code } => write!(f, "exited with status {}", code),
            ProcessOutcome::Abnormal { signal: Some(sig) } => {
                write!(f, "terminated by signal {}", sig)
            }
            ProcessOutcome::Abnormal { signal: None } => write!(f, "terminated abnormally"),
            ProcessOutcome::LaunchFailed { reason } => write!(f, "failed to launch: {}", reason),
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Build the shell command for a scan
fn shell_command(command_line: &str) -> Command {
    #[cfg(unix)]
    {
        let mut command = Command::new("sh");
        command.arg("-c").arg(command_line);
        command.process_group(0);
        command
    }

    #[cfg(not(unix))]
    {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(command_line);
        command
    }
}

/// Spawn the scan process
///
/// Must be called from within a tokio runtime context. Errors are returned
/// as a launch failure reason rather than an `io::Error` so they can be
/// carried into the session outcome.
pub fn spawn_scan(command: &ScanCommand) -> Result<Child, String> {
    let stdout = match &command.output {
        OutputTarget::Stdout(path) => {
            let file = std::fs::File::create(path).map_err(|e| {
                format!("cannot create output file {}: {}", path.display(), e)
            })?;
            Stdio::from(file)
        }
        OutputTarget::Argument(_) => Stdio::null(),
    };

    shell_command(&command.command_line)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("cannot start '{}': {}", command.command_line, e))
}

/// Forward the command's stderr to the log, one line at a time
pub async fn log_stderr(stderr: ChildStderr, session_id: u64) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        log::debug!("[scan {}] {}", session_id, line);
    }
}

/// Interval between checks on a shell that is still running
#[cfg(target_os = "linux")]
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Wait for the process to exit on its own
#[cfg(target_os = "linux")]
pub async fn wait_outcome(child: &mut Child) -> ProcessOutcome {
    let pid = child.id();
    leader_exited(pid).await;
    sweep_group(pid);
    reap(child).await
}

/// Wait for the process to exit on its own
#[cfg(not(target_os = "linux"))]
pub async fn wait_outcome(child: &mut Child) -> ProcessOutcome {
    reap(child).await
}

/// Stop the process: graceful signal first, forced kill once `grace` expires
///
/// Returns only after the process has been reaped.
#[cfg(target_os = "linux")]
pub async fn terminate(child: &mut Child, grace: Duration) -> ProcessOutcome {
    let pid = child.id();
    if !has_exited(pid) {
        request_stop(child, pid);
        if tokio::time::timeout(grace, leader_exited(pid)).await.is_err() {
            log::warn!(
                "Scan process did not exit within {:?} of terminate request; killing it",
                grace
            );
            force_kill(child, pid);
            leader_exited(pid).await;
        }
    }

    // The exited shell still holds the group id until it is reaped
    sweep_group(pid);
    reap(child).await
}

/// Stop the process: graceful signal first, forced kill once `grace` expires
///
/// Returns only after the process has been reaped.
#[cfg(not(target_os = "linux"))]
pub async fn terminate(child: &mut Child, grace: Duration) -> ProcessOutcome {
    // id() is None once the child has been reaped, so capture it first
    let pid = child.id();
    if let Ok(Some(status)) = child.try_wait() {
        sweep_group(pid);
        return ProcessOutcome::from_status(status);
    }

    request_stop(child, pid);

    let outcome = match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => ProcessOutcome::from_status(status),
        Ok(Err(e)) => {
            log::warn!("Waiting for scan process after terminate failed: {}", e);
            force_kill(child, pid);
            reap(child).await
        }
        Err(_) => {
            log::warn!(
                "Scan process did not exit within {:?} of terminate request; killing it",
                grace
            );
            force_kill(child, pid);
            reap(child).await
        }
    };

    sweep_group(pid);
    outcome
}

async fn reap(child: &mut Child) -> ProcessOutcome {
    match child.wait().await {
        Ok(status) => ProcessOutcome::from_status(status),
        Err(e) => {
            log::warn!("Waiting for scan process failed: {}", e);
            ProcessOutcome::Abnormal { signal: None }
        }
    }
}

/// Whether the shell has exited, without reaping it
///
/// An unknown pid or a failed query counts as exited so callers never wait
/// forever; reaping afterwards reports the real status.
#[cfg(target_os = "linux")]
fn has_exited(pid: Option<u32>) -> bool {
    let Some(pid) = pid else {
        return true;
    };
    // SAFETY: siginfo_t is plain data and all-zero is a valid value
    let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
    // SAFETY: info is a valid out-pointer; WNOWAIT leaves the child waitable
    let rc = unsafe {
        libc::waitid(
            libc::P_PID,
            pid,
            &mut info,
            libc::WEXITED | libc::WNOHANG | libc::WNOWAIT,
        )
    };
    if rc != 0 {
        return true;
    }
    // SAFETY: waitid succeeded, so info holds a SIGCHLD record or zeroes.
    // With WNOHANG si_pid stays zero while the child is still running.
    unsafe { info.si_pid() != 0 }
}

#[cfg(target_os = "linux")]
async fn leader_exited(pid: Option<u32>) {
    while !has_exited(pid) {
        tokio::time::sleep(EXIT_POLL_INTERVAL).await;
    }
}

#[cfg(unix)]
fn signal_group(pid: Option<u32>, signal: libc::c_int) -> bool {
    let Some(pid) = pid else {
        return false;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // SAFETY: kill() has no memory-safety preconditions; a negative pid
    // addresses the process group created for this child.
    unsafe { libc::kill(-pgid, signal) == 0 }
}

#[cfg(unix)]
fn request_stop(_child: &mut Child, pid: Option<u32>) {
    if !signal_group(pid, libc::SIGTERM) {
        log::debug!("SIGTERM to scan process group {:?} was not delivered", pid);
    }
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child, _pid: Option<u32>) {
    // No graceful terminate on this platform
    let _ = child.start_kill();
}

fn force_kill(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    signal_group(pid, libc::SIGKILL);
    #[cfg(not(unix))]
    let _ = pid;
    if let Err(e) = child.start_kill() {
        log::debug!("start_kill on scan process failed: {}", e);
    }
}

#[cfg(unix)]
fn sweep_group(pid: Option<u32>) {
    if signal_group(pid, libc::SIGKILL) {
        log::trace!("Swept scan process group {:?}", pid);
    }
}

#[cfg(not(unix))]
fn sweep_group(_pid: Option<u32>) {}
