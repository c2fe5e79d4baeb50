//! Job state types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::request::DownloadRequest;
use crate::parser::ProgressSample;

/// Opaque job identifier, unique for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle status of a job.
///
/// ```text
/// Pending -> Starting -> (Probing ->)? Downloading -> Processing -> Completed
/// ```
///
/// Forward skips along the chain are allowed. `Cancelled` is reachable from
/// every non-terminal status, `Failed` from every status after `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Starting,
    Probing,
    Downloading,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [JobStatus; 8] = [
        JobStatus::Pending,
        JobStatus::Starting,
        JobStatus::Probing,
        JobStatus::Downloading,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ];

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Returns true if the job has been dispatched and is not yet terminal.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::Starting
                | JobStatus::Probing
                | JobStatus::Downloading
                | JobStatus::Processing
        )
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        match self {
            Pending => matches!(next, Starting | Cancelled),
            Starting => matches!(
                next,
                Probing | Downloading | Processing | Completed | Failed | Cancelled
            ),
            Probing => matches!(
                next,
                Downloading | Processing | Completed | Failed | Cancelled
            ),
            Downloading => matches!(next, Processing | Completed | Failed | Cancelled),
            Processing => matches!(next, Completed | Failed | Cancelled),
            Completed | Failed | Cancelled => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Starting => "starting",
            JobStatus::Probing => "probing",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known progress of a job. Every field keeps its previous value when
/// an update does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub percentage: Option<f64>,
    pub speed: Option<String>,
    pub eta: Option<String>,
    pub filename: Option<String>,
    pub downloaded: Option<String>,
    pub total: Option<String>,
}

impl JobProgress {
    /// Merges a progress sample. Percentage never decreases.
    pub fn apply(&mut self, sample: &ProgressSample) {
        if let Some(pct) = sample.percentage {
            self.percentage = Some(self.percentage.map_or(pct, |cur| cur.max(pct)));
        }
        if let Some(speed) = &sample.speed {
            self.speed = Some(speed.clone());
        }
        if let Some(eta) = &sample.eta {
            self.eta = Some(eta.clone());
        }
        if let Some(downloaded) = &sample.downloaded {
            self.downloaded = Some(downloaded.clone());
        }
        if let Some(total) = &sample.total {
            self.total = Some(total.clone());
        }
    }

    /// Records that the current file needs no further transfer.
    pub fn mark_transferred(&mut self) {
        self.percentage = Some(100.0);
    }
}

/// Coarse cause of a job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobErrorKind {
    /// The tool could not be started.
    Spawn,
    /// The tool exited with a non-zero status.
    ProcessExit,
    /// The tool stopped reporting progress and was killed.
    StallTimeout,
}

/// Failure details stored on a `Failed` job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub kind: JobErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Last captured output lines, oldest first.
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

impl JobError {
    pub fn spawn(message: impl Into<String>) -> Self {
        Self {
            kind: JobErrorKind::Spawn,
            message: message.into(),
            exit_code: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn process_exit(
        message: impl Into<String>,
        exit_code: Option<i32>,
        diagnostics: Vec<String>,
    ) -> Self {
        Self {
            kind: JobErrorKind::ProcessExit,
            message: message.into(),
            exit_code,
            diagnostics,
        }
    }

    pub fn stall_timeout(timeout_secs: u64, diagnostics: Vec<String>) -> Self {
        Self {
            kind: JobErrorKind::StallTimeout,
            message: format!("No progress reported for {timeout_secs}s"),
            exit_code: None,
            diagnostics,
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Snapshot of a job. Callers always receive copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub request: DownloadRequest,
    pub status: JobStatus,
    pub progress: JobProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a `Pending` job for an already validated request.
    pub fn new(request: DownloadRequest) -> Self {
        Self {
            id: JobId::new(),
            url: request.url.clone(),
            request,
            status: JobStatus::Pending,
            progress: JobProgress::default(),
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }
}

/// Status or progress change broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    /// Builds an event carrying the job's current status and progress.
    pub fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status,
            percentage: job.progress.percentage,
            speed: job.progress.speed.clone(),
            eta: job.progress.eta.clone(),
            filename: job.progress.filename.clone(),
            error: job.error.as_ref().map(|e| e.message.clone()),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses_never_transition() {
        for from in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            for to in JobStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_nothing_reenters_pending() {
        for from in JobStatus::ALL {
            assert!(!from.can_transition_to(JobStatus::Pending), "{from}");
        }
    }

    #[test]
    fn test_cancel_reachable_from_non_terminal() {
        for from in JobStatus::ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition_to(JobStatus::Cancelled), "{from}");
        }
    }

    #[test]
    fn test_pending_cannot_fail_or_skip() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Starting));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Downloading));
    }

    #[test]
    fn test_forward_skips_and_no_backwards() {
        assert!(JobStatus::Starting.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Starting.can_transition_to(JobStatus::Downloading));
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Downloading));
        assert!(!JobStatus::Downloading.can_transition_to(JobStatus::Probing));
    }

    #[test]
    fn test_progress_percentage_is_monotonic() {
        let mut progress = JobProgress::default();
        progress.apply(&ProgressSample {
            percentage: Some(40.0),
            speed: Some("1MiB/s".into()),
            ..Default::default()
        });
        progress.apply(&ProgressSample {
            percentage: Some(10.0),
            eta: Some("00:30".into()),
            ..Default::default()
        });

        assert_eq!(progress.percentage, Some(40.0));
        assert_eq!(progress.speed.as_deref(), Some("1MiB/s"));
        assert_eq!(progress.eta.as_deref(), Some("00:30"));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Downloading).unwrap(),
            "\"downloading\""
        );
        assert_eq!(JobStatus::Cancelled.to_string(), "cancelled");
    }
}
