//! Error types for the metadata prober.

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::RunnerError;

/// Errors that can occur while probing a URL.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// yt-dlp is not installed or not usable.
    #[error("Download tool is not ready: {tool_path}")]
    NotReady { tool_path: PathBuf },

    /// The URL is empty or malformed.
    #[error("Invalid URL: {url:?}")]
    InvalidUrl { url: String },

    /// No extractor handles this URL.
    #[error("Unsupported URL: {message}")]
    Unsupported { message: String },

    /// The media exists but cannot be accessed (private, removed, login).
    #[error("Media unavailable: {message}")]
    Unavailable { message: String },

    /// The tool did not answer in time.
    #[error("Probe timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The tool could not be started.
    #[error("Failed to start probe: {0}")]
    Spawn(#[from] RunnerError),

    /// The tool failed for another reason.
    #[error("Probe failed (exit code {code:?}): {message}")]
    ToolFailed { code: Option<i32>, message: String },

    /// The tool's output could not be interpreted.
    #[error("Failed to parse probe output: {reason}")]
    Parse { reason: String },
}

impl ProbeError {
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}
