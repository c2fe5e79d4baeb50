//! Configuration for the metadata prober.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the metadata prober.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProberConfig {
    /// Maximum time a probe may take, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_probe_timeout() -> u64 {
    60
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl ProberConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
