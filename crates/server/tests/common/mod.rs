//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with a scripted process runner and a controllable toolchain, so the API
//! can be exercised without yt-dlp installed.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use clipfetch_core::{
    testing::{MockProcessRunner, MockToolchain},
    Config, JobRegistry, MetadataProber, ProcessRunner, Toolchain,
};
use clipfetch_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use clipfetch_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_submit() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/jobs", json!({
///         "url": "https://example.com/watch?v=abc",
///         "output_dir": fixture.output_dir(),
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock runner - script tool output
    pub runner: MockProcessRunner,
    /// Mock toolchain - flip readiness
    pub toolchain: MockToolchain,
    /// Registry behind the router
    pub registry: JobRegistry,
    /// Output directory for submitted jobs
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default config.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let runner = MockProcessRunner::new();
        let toolchain = MockToolchain::ready();

        let toolchain_dyn: Arc<dyn Toolchain> = Arc::new(toolchain.clone());
        let runner_dyn: Arc<dyn ProcessRunner> = Arc::new(runner.clone());

        let registry = JobRegistry::new(
            config.registry.clone(),
            Arc::clone(&toolchain_dyn),
            Arc::clone(&runner_dyn),
        );
        let prober = Arc::new(MetadataProber::new(
            config.prober.clone(),
            Arc::clone(&toolchain_dyn),
            runner_dyn,
        ));

        let state = Arc::new(AppState::new(
            config,
            registry.clone(),
            prober,
            toolchain_dyn,
        ));
        let router = create_router(state);

        Self {
            router,
            runner,
            toolchain,
            registry,
            temp_dir,
        }
    }

    /// Output directory as a string for request bodies.
    pub fn output_dir(&self) -> String {
        self.temp_dir.path().display().to_string()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// GET a plain-text endpoint and return status plus raw body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Poll a job until it reaches `status` or the timeout expires.
    pub async fn wait_for_job_status(&self, id: &str, status: &str, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            let response = self.get(&format!("/api/v1/jobs/{}", id)).await;
            if response.body["status"] == status {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
