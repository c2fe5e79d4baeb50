//! Metadata prober backed by a process runner.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::config::ProberConfig;
use super::error::ProbeError;
use super::output::{classify_failure, parse_probe_output};
use super::types::VideoInfo;
use crate::metrics;
use crate::runner::{CommandSpec, ProcessRunner, RunningProcess, StreamKind};
use crate::toolchain::Toolchain;

/// Resolves URLs into metadata with a single info-only tool run.
///
/// Probes run independently of the job registry and do not count against
/// its concurrency limit.
pub struct MetadataProber {
    config: ProberConfig,
    toolchain: Arc<dyn Toolchain>,
    runner: Arc<dyn ProcessRunner>,
}

impl MetadataProber {
    pub fn new(
        config: ProberConfig,
        toolchain: Arc<dyn Toolchain>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            config,
            toolchain,
            runner,
        }
    }

    pub fn config(&self) -> &ProberConfig {
        &self.config
    }

    /// Fetches metadata for `url` without downloading any media.
    pub async fn probe(&self, url: &str) -> Result<VideoInfo, ProbeError> {
        let url = url.trim();
        if url.is_empty() || url.starts_with('-') {
            return Err(ProbeError::InvalidUrl {
                url: url.to_string(),
            });
        }

        let tools = self.toolchain.ensure_ready().await;
        if !tools.tool_installed {
            return Err(ProbeError::NotReady {
                tool_path: tools.tool_path,
            });
        }

        let started = Instant::now();
        let result = self.run_probe(&tools.tool_path, url).await;
        metrics::PROBE_DURATION.observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(info) => {
                let kind = if info.is_playlist { "playlist" } else { "video" };
                metrics::PROBES_TOTAL.with_label_values(&[kind]).inc();
                info!(url = %url, kind, title = %info.title, "Probe succeeded");
            }
            Err(e) => {
                metrics::PROBES_TOTAL.with_label_values(&["error"]).inc();
                warn!(url = %url, error = %e, "Probe failed");
            }
        }
        result
    }

    async fn run_probe(&self, tool: &Path, url: &str) -> Result<VideoInfo, ProbeError> {
        let command = CommandSpec::new(tool).with_args([
            "--dump-json",
            "--flat-playlist",
            "--no-warnings",
            "--no-download",
            "--",
            url,
        ]);

        let RunningProcess { mut lines, handle } = self.runner.run(command).await?;

        let collect = async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            while let Some(line) = lines.recv().await {
                match line.stream {
                    StreamKind::Stdout => stdout.push(line.text),
                    StreamKind::Stderr => stderr.push(line.text),
                }
            }
            (stdout, stderr, handle.wait().await)
        };

        let (stdout, stderr, outcome) = match timeout(self.config.probe_timeout(), collect).await {
            Ok(collected) => collected,
            Err(_) => {
                handle.kill();
                handle.wait().await;
                return Err(ProbeError::Timeout {
                    timeout_secs: self.config.probe_timeout_secs,
                });
            }
        };

        debug!(
            url = %url,
            code = ?outcome.code,
            stdout_lines = stdout.len(),
            stderr_lines = stderr.len(),
            "Probe process exited"
        );

        if !outcome.success {
            return Err(classify_failure(outcome.code, &stderr));
        }
        parse_probe_output(&stdout)
    }
}
