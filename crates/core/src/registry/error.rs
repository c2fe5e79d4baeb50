//! Error types for the job registry.

use std::path::PathBuf;
use thiserror::Error;

use crate::job::{JobId, ValidationError};

/// Errors returned synchronously by registry operations.
///
/// Failures that happen after a job was accepted are reported through the
/// job's `Failed` status instead.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// yt-dlp is not installed or not usable.
    #[error("Download tool is not ready: {tool_path}")]
    NotReady { tool_path: PathBuf },

    /// The request was rejected.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// No job with this id exists.
    #[error("Job not found: {id}")]
    NotFound { id: JobId },
}

impl RegistryError {
    pub fn not_found(id: &JobId) -> Self {
        Self::NotFound { id: id.clone() }
    }
}
