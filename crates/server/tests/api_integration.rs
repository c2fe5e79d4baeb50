//! API integration tests driving the router in-process.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use clipfetch_core::testing::{MockScript, MockStep};
use clipfetch_core::OutputLine;
use common::{fixtures, TestFixture};

const WAIT: Duration = Duration::from_secs(5);

// =============================================================================
// Health and readiness
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_toolchain_status() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/toolchain").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["tool_installed"], true);
    assert_eq!(response.body["tool_version"], "2024.08.06");
    assert_eq!(response.body["av_tool_installed"], true);

    fixture.toolchain.set_installed(false).await;
    let response = fixture.get("/api/v1/toolchain").await;
    assert_eq!(response.body["tool_installed"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;
    fixture.get("/api/v1/jobs").await;

    let (status, body) = fixture.get_text("/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("clipfetch_http_requests_total"));
    assert!(body.contains(r#"group="jobs""#));
    assert!(body.contains(r#"group="ops""#));
    assert!(body.contains("clipfetch_jobs_by_status"));
    assert!(body.contains("clipfetch_tool_installed"));
}

// =============================================================================
// Jobs
// =============================================================================

#[tokio::test]
async fn test_submit_job_runs_to_completion() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .push_script(MockScript::lines(fixtures::download_lines("clip.mp4"), 0))
        .await;

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "url": "https://example.com/watch?v=abc",
                "output_dir": fixture.output_dir(),
                "video_quality": "720p",
                "video_container": "mkv",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap().to_string();
    assert_eq!(response.body["url"], "https://example.com/watch?v=abc");

    assert!(fixture.wait_for_job_status(&id, "completed", WAIT).await);

    let job = fixture.get(&format!("/api/v1/jobs/{}", id)).await;
    assert_eq!(job.status, StatusCode::OK);
    assert_eq!(job.body["progress"]["percentage"], 100.0);
    assert_eq!(job.body["progress"]["filename"], "/downloads/clip.mp4");
    assert!(job.body["finished_at"].is_string());
    assert!(job.body.get("error").is_none());

    let commands = fixture.runner.recorded_commands().await;
    assert!(commands[0].args.contains(&"--merge-output-format".to_string()));
    assert!(commands[0].args.contains(&"mkv".to_string()));
}

#[tokio::test]
async fn test_submit_audio_job() {
    let fixture = TestFixture::new();
    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "url": "https://example.com/watch?v=abc",
                "output_dir": fixture.output_dir(),
                "audio_format": "mp3",
                "embed_subs": false,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let id = response.body["id"].as_str().unwrap().to_string();
    assert!(fixture.wait_for_job_status(&id, "completed", WAIT).await);

    let commands = fixture.runner.recorded_commands().await;
    assert!(commands[0].args.contains(&"-x".to_string()));
    assert!(commands[0].args.contains(&"mp3".to_string()));
}

#[tokio::test]
async fn test_submit_validation_errors() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({ "url": "https://example.com/v", "output_dir": "relative/path" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({ "url": "--exec rm", "output_dir": fixture.output_dir() }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "url": "https://example.com/v",
                "output_dir": fixture.output_dir(),
                "video_quality": "best",
                "audio_format": "mp3",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "url": "https://example.com/v",
                "output_dir": fixture.output_dir(),
                "playlist_items": [1, 1],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let list = fixture.get("/api/v1/jobs").await;
    assert_eq!(list.body["total"], 0);
    assert_eq!(fixture.runner.run_count().await, 0);
}

#[tokio::test]
async fn test_submit_when_tool_missing() {
    let fixture = TestFixture::new();
    fixture.toolchain.set_installed(false).await;

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "url": "https://example.com/watch?v=abc",
                "output_dir": fixture.output_dir(),
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_failed_job_reports_error() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .push_script(MockScript::Steps(vec![
            MockStep::Line(OutputLine::stderr("ERROR: [youtube] abc: Video unavailable")),
            MockStep::Exit(1),
        ]))
        .await;

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "url": "https://example.com/watch?v=abc",
                "output_dir": fixture.output_dir(),
            }),
        )
        .await;
    let id = response.body["id"].as_str().unwrap().to_string();
    assert!(fixture.wait_for_job_status(&id, "failed", WAIT).await);

    let job = fixture.get(&format!("/api/v1/jobs/{}", id)).await;
    assert_eq!(job.body["error"]["kind"], "process_exit");
    assert_eq!(job.body["error"]["exit_code"], 1);
    assert_eq!(job.body["error"]["message"], "[youtube] abc: Video unavailable");
}

#[tokio::test]
async fn test_list_jobs_in_order_with_filter() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .set_default_script(MockScript::hang())
        .await;
    fixture.runner.push_script(MockScript::default()).await;

    let first = fixture
        .post(
            "/api/v1/jobs",
            json!({ "url": "https://example.com/v/1", "output_dir": fixture.output_dir() }),
        )
        .await;
    let first_id = first.body["id"].as_str().unwrap().to_string();
    assert!(fixture.wait_for_job_status(&first_id, "completed", WAIT).await);

    fixture
        .post(
            "/api/v1/jobs",
            json!({ "url": "https://example.com/v/2", "output_dir": fixture.output_dir() }),
        )
        .await;

    let list = fixture.get("/api/v1/jobs").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["total"], 2);
    assert_eq!(list.body["jobs"][0]["url"], "https://example.com/v/1");
    assert_eq!(list.body["jobs"][1]["url"], "https://example.com/v/2");

    let completed = fixture.get("/api/v1/jobs?status=completed").await;
    assert_eq!(completed.body["total"], 1);
    assert_eq!(completed.body["jobs"][0]["id"], first_id.as_str());

    fixture.delete("/api/v1/jobs").await;
}

#[tokio::test]
async fn test_get_unknown_job() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/jobs/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = fixture.delete("/api/v1/jobs/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_running_job() {
    let fixture = TestFixture::new();
    fixture.runner.push_script(MockScript::hang()).await;

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "url": "https://example.com/watch?v=abc",
                "output_dir": fixture.output_dir(),
            }),
        )
        .await;
    let id = response.body["id"].as_str().unwrap().to_string();

    let cancelled = fixture.delete(&format!("/api/v1/jobs/{}", id)).await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.body["status"], "cancelled");

    // Cancelling again is a no-op
    let again = fixture.delete(&format!("/api/v1/jobs/{}", id)).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["status"], "cancelled");
}

#[tokio::test]
async fn test_cancel_all_and_status() {
    let mut config = clipfetch_core::Config::default();
    config.registry.max_concurrent_jobs = 1;
    let fixture = TestFixture::with_config(config);
    fixture.runner.set_default_script(MockScript::hang()).await;

    for i in 0..3 {
        let response = fixture
            .post(
                "/api/v1/jobs",
                json!({
                    "url": format!("https://example.com/v/{}", i),
                    "output_dir": fixture.output_dir(),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let status = fixture.get("/api/v1/status").await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["total"], 3);
    assert_eq!(status.body["pending"], 2);
    assert_eq!(status.body["max_concurrent_jobs"], 1);

    let response = fixture.delete("/api/v1/jobs").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["cancelled"], 3);

    let status = fixture.get("/api/v1/status").await;
    assert_eq!(status.body["cancelled"], 3);
    assert_eq!(status.body["pending"], 0);
}

// =============================================================================
// Probe
// =============================================================================

#[tokio::test]
async fn test_probe_single_video() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .push_script(MockScript::lines(
            [fixtures::single_video_json("abc", "A Clip")],
            0,
        ))
        .await;

    let response = fixture
        .post(
            "/api/v1/probe",
            json!({ "url": "https://example.com/watch?v=abc" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "A Clip");
    assert_eq!(response.body["is_playlist"], false);
    assert_eq!(response.body["duration"], 212.0);
}

#[tokio::test]
async fn test_probe_playlist() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .push_script(MockScript::lines(
            fixtures::flat_playlist_json("PL1", &[("a", "First"), ("b", "Second")]),
            0,
        ))
        .await;

    let response = fixture
        .post(
            "/api/v1/probe",
            json!({ "url": "https://example.com/playlist?list=PL1" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_playlist"], true);
    assert_eq!(response.body["playlist_count"], 2);
    assert_eq!(response.body["entries"][1]["title"], "Second");
}

#[tokio::test]
async fn test_probe_errors_map_to_statuses() {
    let fixture = TestFixture::new();

    let response = fixture.post("/api/v1/probe", json!({ "url": "" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    fixture
        .runner
        .push_script(MockScript::Steps(vec![
            MockStep::Line(OutputLine::stderr("ERROR: [youtube] abc: Private video")),
            MockStep::Exit(1),
        ]))
        .await;
    let response = fixture
        .post(
            "/api/v1/probe",
            json!({ "url": "https://example.com/watch?v=abc" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    fixture.toolchain.set_installed(false).await;
    let response = fixture
        .post(
            "/api/v1/probe",
            json!({ "url": "https://example.com/watch?v=abc" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}
