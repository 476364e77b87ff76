//! Shutdown Coordination
//!
//! Turns process signals (Ctrl-C, SIGTERM, SIGHUP, SIGQUIT) into a broadcast
//! that the front end uses to cancel a running scan. A second signal exits
//! immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Exit code used when a second interrupt forces an immediate exit
pub const FORCED_EXIT_CODE: i32 = 130;

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    signal_count: AtomicUsize,
}

impl ShutdownCoordinator {
    fn new() -> (Arc<Self>, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        let coordinator = Arc::new(Self {
            shutdown_tx,
            signal_count: AtomicUsize::new(0),
        });
        (coordinator, shutdown_rx)
    }

    /// Note one received signal and notify the receiver
    ///
    /// Returns true when this is a repeat signal and the process should exit
    /// without waiting for cleanup.
    fn record_signal(&self) -> bool {
        let prev = self.signal_count.fetch_add(1, Ordering::AcqRel);
        let _ = self.shutdown_tx.send(());
        prev >= 1
    }

    /// Guard execution of a future with shutdown coordination
    ///
    /// Installs the signal handlers and hands the closure a receiver that
    /// fires on the first signal.
    pub async fn guard<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let (coordinator, shutdown_rx) = Self::new();
        setup_signal_handlers(coordinator);
        future_fn(shutdown_rx).await
    }
}

fn forced_exit() -> ! {
    log::warn!("Second interrupt received; exiting without cleanup");
    std::process::exit(FORCED_EXIT_CODE);
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(coordinator: Arc<ShutdownCoordinator>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        let signals = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in signals {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        if coordinator.record_signal() {
                            forced_exit();
                        }
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if coordinator.record_signal() {
                    forced_exit();
                }
            }
        });
    }
}
