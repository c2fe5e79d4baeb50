//! Types for toolchain readiness.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Readiness of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryStatus {
    /// yt-dlp was found and answered a version query.
    pub tool_installed: bool,
    /// Version reported by yt-dlp.
    pub tool_version: Option<String>,
    /// ffmpeg was found.
    pub av_tool_installed: bool,
    /// Resolved yt-dlp path, or the configured one when resolution failed.
    pub tool_path: PathBuf,
    /// Resolved ffmpeg path.
    pub av_tool_path: Option<PathBuf>,
}

impl BinaryStatus {
    /// Status for a fully installed toolchain.
    pub fn ready(tool_path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            tool_installed: true,
            tool_version: Some(version.into()),
            av_tool_installed: false,
            tool_path: tool_path.into(),
            av_tool_path: None,
        }
    }

    /// Status for a missing yt-dlp.
    pub fn missing(tool_path: impl Into<PathBuf>) -> Self {
        Self {
            tool_installed: false,
            tool_version: None,
            av_tool_installed: false,
            tool_path: tool_path.into(),
            av_tool_path: None,
        }
    }

    pub fn with_av_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.av_tool_installed = true;
        self.av_tool_path = Some(path.into());
        self
    }
}
