//! Error types for download request validation.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a `DownloadRequest` is rejected before it reaches the job table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("URL must not start with '-': {url}")]
    UrlLooksLikeOption { url: String },

    #[error("Output directory must be an absolute path: {path}")]
    OutputDirNotAbsolute { path: PathBuf },

    #[error("Output directory does not exist: {path}")]
    OutputDirMissing { path: PathBuf },

    #[error("Output directory is not writable: {path} ({reason})")]
    OutputDirNotWritable { path: PathBuf, reason: String },

    /// Video options and an audio format were both given.
    #[error("Video quality/container and audio format are mutually exclusive")]
    ConflictingMode,

    /// Playlist indices are 1-based.
    #[error("Playlist item indices start at 1, got {index}")]
    InvalidPlaylistItem { index: u32 },

    #[error("Playlist item {index} is listed more than once")]
    DuplicatePlaylistItem { index: u32 },
}
