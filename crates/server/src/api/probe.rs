//! Metadata probe handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use clipfetch_core::{ProbeError, VideoInfo};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

/// Request body for a probe
#[derive(Debug, Deserialize)]
pub struct ProbeBody {
    pub url: String,
}

fn status_for(error: &ProbeError) -> StatusCode {
    match error {
        ProbeError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
        ProbeError::Unsupported { .. } | ProbeError::Unavailable { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ProbeError::NotReady { .. } | ProbeError::Spawn(_) => StatusCode::SERVICE_UNAVAILABLE,
        ProbeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ProbeError::ToolFailed { .. } | ProbeError::Parse { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Fetch title, duration, thumbnail and playlist entries for a URL
pub async fn probe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProbeBody>,
) -> Result<Json<VideoInfo>, (StatusCode, Json<ErrorResponse>)> {
    state
        .prober()
        .probe(&body.url)
        .await
        .map(Json)
        .map_err(|e| error_response(status_for(&e), e))
}
