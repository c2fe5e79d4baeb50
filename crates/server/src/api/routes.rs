use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, jobs, middleware::metrics_middleware, probe, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let permissive_cors = state.config().server.permissive_cors;

    // API routes
    let api_routes = Router::new()
        // Health and readiness
        .route("/health", get(handlers::health))
        .route("/toolchain", get(handlers::toolchain_status))
        .route("/status", get(handlers::registry_status))
        .route("/metrics", get(handlers::metrics))
        // Jobs
        .route(
            "/jobs",
            post(jobs::create_job)
                .get(jobs::list_jobs)
                .delete(jobs::cancel_all_jobs),
        )
        .route("/jobs/{id}", get(jobs::get_job).delete(jobs::cancel_job))
        // Metadata
        .route("/probe", post(probe::probe))
        // Live job events
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    let router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    if permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
