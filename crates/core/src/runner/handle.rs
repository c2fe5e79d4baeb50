//! Control handle shared between a process supervisor and its callers.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use super::types::ExitOutcome;

/// Handle to a running process.
///
/// Cheaply cloneable. `kill` only records the request; the supervisor that
/// owns the OS child performs the actual termination and publishes the
/// outcome that `wait` resolves to.
#[derive(Clone)]
pub struct ProcessHandle {
    pid: Option<u32>,
    kill_tx: Arc<watch::Sender<bool>>,
    exit_rx: watch::Receiver<Option<ExitOutcome>>,
}

/// Supervisor side of a `ProcessHandle`.
pub(crate) struct ProcessControl {
    kill_rx: watch::Receiver<bool>,
    exit_tx: watch::Sender<Option<ExitOutcome>>,
}

impl ProcessHandle {
    pub(crate) fn new(pid: Option<u32>) -> (Self, ProcessControl) {
        let (kill_tx, kill_rx) = watch::channel(false);
        let (exit_tx, exit_rx) = watch::channel(None);
        (
            Self {
                pid,
                kill_tx: Arc::new(kill_tx),
                exit_rx,
            },
            ProcessControl { kill_rx, exit_tx },
        )
    }

    /// OS process id, when known.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Requests termination. Safe to call any number of times, including
    /// after the process has exited.
    pub fn kill(&self) {
        self.kill_tx.send_replace(true);
    }

    /// Whether `kill` has been called on any clone of this handle.
    pub fn kill_requested(&self) -> bool {
        *self.kill_tx.borrow()
    }

    /// Whether the process has been reaped.
    pub fn has_exited(&self) -> bool {
        self.exit_rx.borrow().is_some()
    }

    /// Waits until the process has exited and been reaped.
    pub async fn wait(&self) -> ExitOutcome {
        let mut rx = self.exit_rx.clone();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(value) => *value,
            Err(_) => None,
        };
        outcome.unwrap_or_else(ExitOutcome::unknown)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("kill_requested", &self.kill_requested())
            .field("exited", &self.has_exited())
            .finish()
    }
}

impl ProcessControl {
    /// Resolves once a kill has been requested. Never resolves if every
    /// handle is dropped without requesting one.
    pub(crate) async fn kill_requested(&mut self) {
        if self.kill_rx.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Publishes the final outcome to every handle.
    pub(crate) fn finish(self, outcome: ExitOutcome) {
        self.exit_tx.send_replace(Some(outcome));
    }
}
