//! Configuration for the job registry.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the job registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of jobs with a live process.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_jobs: usize,

    /// A running job that reports no recognizable progress for this long is
    /// killed and failed. Not applied while post-processing.
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_secs: u64,

    /// Capacity of the event broadcast channel. Subscribers that fall further
    /// behind lose the oldest events.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Number of trailing output lines kept for failure diagnostics.
    #[serde(default = "default_diagnostic_lines")]
    pub diagnostic_lines: usize,

    /// Upper bound on how long `cancel` waits for the process to exit.
    #[serde(default = "default_cancel_wait")]
    pub cancel_wait_ms: u64,
}

fn default_max_concurrent() -> usize {
    3
}

fn default_stall_timeout() -> u64 {
    300 // 5 minutes
}

fn default_event_capacity() -> usize {
    256
}

fn default_diagnostic_lines() -> usize {
    20
}

fn default_cancel_wait() -> u64 {
    5000
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent(),
            stall_timeout_secs: default_stall_timeout(),
            event_capacity: default_event_capacity(),
            diagnostic_lines: default_diagnostic_lines(),
            cancel_wait_ms: default_cancel_wait(),
        }
    }
}

impl RegistryConfig {
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max;
        self
    }

    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs)
    }

    pub fn cancel_wait(&self) -> Duration {
        Duration::from_millis(self.cancel_wait_ms)
    }
}
