//! Configuration for the process runner.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the tokio-based process runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// How long a process gets to exit after SIGTERM before it is killed.
    #[serde(default = "default_kill_grace")]
    pub kill_grace_ms: u64,

    /// Capacity of the merged output line channel.
    /// A full channel stops the pipe readers, which eventually stalls the child.
    #[serde(default = "default_line_buffer")]
    pub line_buffer: usize,
}

fn default_kill_grace() -> u64 {
    3000
}

fn default_line_buffer() -> usize {
    256
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            kill_grace_ms: default_kill_grace(),
            line_buffer: default_line_buffer(),
        }
    }
}

impl RunnerConfig {
    /// Sets the kill grace period.
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace_ms = grace.as_millis() as u64;
        self
    }

    /// Grace period as a `Duration`.
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.kill_grace_ms, 3000);
        assert_eq!(config.line_buffer, 256);
        assert_eq!(config.kill_grace(), Duration::from_secs(3));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RunnerConfig = toml::from_str("kill_grace_ms = 500").unwrap();
        assert_eq!(config.kill_grace_ms, 500);
        assert_eq!(config.line_buffer, 256);
    }
}
