//! Process runner trait definition.

use async_trait::async_trait;

use super::error::RunnerError;
use super::types::{CommandSpec, RunningProcess};

/// Spawns external processes and exposes their output as a line stream.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runner name for logging.
    fn name(&self) -> &str;

    /// Spawns `command`.
    ///
    /// Returns as soon as the process is running. Output arrives on
    /// `RunningProcess::lines`; the exit outcome through its handle.
    async fn run(&self, command: CommandSpec) -> Result<RunningProcess, RunnerError>;
}
