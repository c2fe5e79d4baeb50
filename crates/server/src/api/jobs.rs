//! Job API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use clipfetch_core::{
    AudioFormat, DownloadRequest, Job, JobError, JobId, JobProgress, JobStatus, RegistryError,
    VideoContainer, VideoQuality,
};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a download
#[derive(Debug, Deserialize)]
pub struct CreateJobBody {
    pub url: String,
    /// Absolute, existing, writable directory
    pub output_dir: PathBuf,
    pub video_quality: Option<VideoQuality>,
    pub video_container: Option<VideoContainer>,
    /// Presence selects audio-only mode
    pub audio_format: Option<AudioFormat>,
    #[serde(default)]
    pub embed_subs: bool,
    /// 1-based playlist indices
    pub playlist_items: Option<Vec<u32>>,
}

impl From<CreateJobBody> for DownloadRequest {
    fn from(body: CreateJobBody) -> Self {
        Self {
            url: body.url,
            output_dir: body.output_dir,
            video_quality: body.video_quality,
            video_container: body.video_container,
            audio_format: body.audio_format,
            embed_subs: body.embed_subs,
            playlist_items: body.playlist_items,
        }
    }
}

/// Query parameters for listing jobs
#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    /// Filter by status
    pub status: Option<JobStatus>,
}

/// Response for job operations
#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub id: JobId,
    pub url: String,
    pub output_dir: PathBuf,
    pub status: JobStatus,
    pub progress: JobProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            url: job.url,
            output_dir: job.request.output_dir,
            status: job.status,
            progress: job.progress,
            error: job.error,
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|t| t.to_rfc3339()),
            finished_at: job.finished_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Response for listing jobs
#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobResponse>,
    pub total: usize,
}

/// Response for cancelling every job
#[derive(Debug, Serialize)]
pub struct CancelAllResponse {
    pub cancelled: usize,
}

fn registry_error(e: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        RegistryError::NotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
        RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
    };
    error_response(status, e)
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new download job
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateJobBody>,
) -> ApiResult<(StatusCode, Json<JobResponse>)> {
    let id = state
        .registry()
        .submit(DownloadRequest::from(body))
        .await
        .map_err(registry_error)?;

    let job = state
        .registry()
        .get(&id)
        .await
        .ok_or_else(|| registry_error(RegistryError::not_found(&id)))?;

    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

/// Get a job by ID
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let id = JobId::from(id);
    match state.registry().get(&id).await {
        Some(job) => Ok(Json(JobResponse::from(job))),
        None => Err(registry_error(RegistryError::not_found(&id))),
    }
}

/// List jobs in submission order
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJobsParams>,
) -> Json<ListJobsResponse> {
    let jobs: Vec<JobResponse> = state
        .registry()
        .snapshot()
        .await
        .into_iter()
        .filter(|job| params.status.map_or(true, |status| job.status == status))
        .map(JobResponse::from)
        .collect();

    Json(ListJobsResponse {
        total: jobs.len(),
        jobs,
    })
}

/// Cancel a job
///
/// Returns the job as it is after cancellation. Cancelling a finished job
/// leaves it unchanged.
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let id = JobId::from(id);
    state.registry().cancel(&id).await.map_err(registry_error)?;

    let job = state
        .registry()
        .get(&id)
        .await
        .ok_or_else(|| registry_error(RegistryError::not_found(&id)))?;
    Ok(Json(JobResponse::from(job)))
}

/// Cancel every unfinished job
pub async fn cancel_all_jobs(State(state): State<Arc<AppState>>) -> Json<CancelAllResponse> {
    let cancelled = state.registry().cancel_all().await;
    info!(cancelled, "Cancel all requested over HTTP");
    Json(CancelAllResponse { cancelled })
}
