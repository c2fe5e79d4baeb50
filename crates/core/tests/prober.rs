//! Metadata prober integration tests.

use std::sync::Arc;
use std::time::Duration;

use clipfetch_core::{
    testing::{fixtures, MockProcessRunner, MockScript, MockStep, MockToolchain},
    MetadataProber, OutputLine, ProbeError, ProberConfig, ProcessRunner, Toolchain,
};

fn prober_with(runner: &MockProcessRunner, toolchain: &MockToolchain) -> MetadataProber {
    MetadataProber::new(
        ProberConfig::default().with_timeout(Duration::from_secs(1)),
        Arc::new(toolchain.clone()) as Arc<dyn Toolchain>,
        Arc::new(runner.clone()) as Arc<dyn ProcessRunner>,
    )
}

fn failing_script(stderr: &str) -> MockScript {
    MockScript::Steps(vec![
        MockStep::Line(OutputLine::stderr(stderr)),
        MockStep::Exit(1),
    ])
}

#[tokio::test]
async fn test_probe_single_video() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner
        .push_script(MockScript::lines(
            [fixtures::single_video_json("abc", "A Clip")],
            0,
        ))
        .await;

    let info = prober_with(&runner, &toolchain)
        .probe("https://example.com/watch?v=abc")
        .await
        .unwrap();

    assert_eq!(info.id, "abc");
    assert_eq!(info.title, "A Clip");
    assert_eq!(info.duration, Some(212.0));
    assert!(!info.is_playlist);
    assert!(info.entries.is_none());

    let commands = runner.recorded_commands().await;
    assert_eq!(commands.len(), 1);
    assert!(commands[0].args.contains(&"--dump-json".to_string()));
    assert!(commands[0].args.contains(&"--flat-playlist".to_string()));
    assert_eq!(
        commands[0].args.last().map(String::as_str),
        Some("https://example.com/watch?v=abc")
    );
}

#[tokio::test]
async fn test_probe_flat_playlist() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner
        .push_script(MockScript::lines(
            fixtures::flat_playlist_json("PL1", &[("a", "First"), ("b", "Second"), ("c", "Third")]),
            0,
        ))
        .await;

    let info = prober_with(&runner, &toolchain)
        .probe("https://example.com/playlist?list=PL1")
        .await
        .unwrap();

    assert!(info.is_playlist);
    assert_eq!(info.id, "PL1");
    assert_eq!(info.playlist_count, Some(3));
    let entries = info.entries.unwrap();
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_probe_one_entry_playlist() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner
        .push_script(MockScript::lines(
            fixtures::flat_playlist_json("PL1", &[("a", "Only")]),
            0,
        ))
        .await;

    let info = prober_with(&runner, &toolchain)
        .probe("https://example.com/playlist?list=PL1")
        .await
        .unwrap();

    assert!(info.is_playlist);
    assert_eq!(info.id, "PL1");
    assert_eq!(info.playlist_count, Some(1));
    assert_eq!(info.entries.unwrap()[0].title, "Only");
}

#[tokio::test]
async fn test_probe_unavailable_video() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner
        .push_script(failing_script(
            "ERROR: [youtube] abc: Private video. Sign in if you've been granted access",
        ))
        .await;

    let result = prober_with(&runner, &toolchain)
        .probe("https://example.com/watch?v=abc")
        .await;
    assert!(matches!(result, Err(ProbeError::Unavailable { .. })));
}

#[tokio::test]
async fn test_probe_unsupported_url() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner
        .push_script(failing_script(
            "ERROR: Unsupported URL: https://example.com/not-a-video",
        ))
        .await;

    let result = prober_with(&runner, &toolchain)
        .probe("https://example.com/not-a-video")
        .await;
    assert!(matches!(result, Err(ProbeError::Unsupported { .. })));
}

#[tokio::test]
async fn test_probe_garbage_output() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner
        .push_script(MockScript::lines(["not json at all"], 0))
        .await;

    let result = prober_with(&runner, &toolchain)
        .probe("https://example.com/watch?v=abc")
        .await;
    assert!(matches!(result, Err(ProbeError::Parse { .. })));
}

#[tokio::test]
async fn test_probe_timeout_kills_process() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner.push_script(MockScript::hang()).await;

    let result = prober_with(&runner, &toolchain)
        .probe("https://example.com/watch?v=abc")
        .await;
    assert!(matches!(result, Err(ProbeError::Timeout { timeout_secs: 1 })));
    assert_eq!(runner.running(), 0);
}

#[tokio::test]
async fn test_probe_rejects_invalid_url_without_running() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    let prober = prober_with(&runner, &toolchain);

    assert!(matches!(
        prober.probe("  ").await,
        Err(ProbeError::InvalidUrl { .. })
    ));
    assert!(matches!(
        prober.probe("--exec rm").await,
        Err(ProbeError::InvalidUrl { .. })
    ));
    assert_eq!(runner.run_count().await, 0);
}

#[tokio::test]
async fn test_probe_not_ready() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::missing();

    let result = prober_with(&runner, &toolchain)
        .probe("https://example.com/watch?v=abc")
        .await;
    assert!(matches!(result, Err(ProbeError::NotReady { .. })));
    assert_eq!(runner.run_count().await, 0);
}

#[tokio::test]
async fn test_probe_spawn_failure() {
    let runner = MockProcessRunner::new();
    let toolchain = MockToolchain::ready();
    runner.push_script(MockScript::SpawnError).await;

    let result = prober_with(&runner, &toolchain)
        .probe("https://example.com/watch?v=abc")
        .await;
    assert!(matches!(result, Err(ProbeError::Spawn(_))));
}
