//! Types produced by the output parser.

use serde::{Deserialize, Serialize};

/// One structured event recognized in a line of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedEvent {
    /// Transfer progress.
    Progress(ProgressSample),
    /// The tool started writing a new output file.
    Destination { filename: String },
    /// The tool entered a new phase.
    Phase {
        phase: PhaseMarker,
        filename: Option<String>,
    },
    /// The tool reported an error message.
    ToolError { message: String },
}

/// Values read from a single progress line. Fields the line did not carry
/// (or reported as unknown) are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSample {
    /// Percentage in `[0, 100]`. `None` when the total size is unknown.
    pub percentage: Option<f64>,
    /// Bytes downloaded so far, as printed (e.g. `5.00MiB`).
    pub downloaded: Option<String>,
    /// Total size as printed, without the `~` estimate marker.
    pub total: Option<String>,
    /// Transfer speed as printed (e.g. `1.23MiB/s`).
    pub speed: Option<String>,
    /// Remaining time as printed (e.g. `00:05`).
    pub eta: Option<String>,
}

/// Coarse phase of a tool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMarker {
    /// Resolving the URL and extracting stream information.
    Extracting,
    /// Post-processing: merging, remuxing, audio extraction, embedding.
    Processing,
    /// The target file already exists; nothing will be transferred.
    AlreadyDownloaded,
}
