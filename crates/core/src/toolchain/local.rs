//! Toolchain backed by executables on the local filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::config::ToolConfig;
use super::traits::Toolchain;
use super::types::BinaryStatus;

/// Resolves yt-dlp and ffmpeg from configured paths, `bin_dir` or `PATH`.
pub struct LocalToolchain {
    config: ToolConfig,
    cached: RwLock<Option<(Instant, BinaryStatus)>>,
}

impl LocalToolchain {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            cached: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Drops the cached status so the next check hits the filesystem.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn check(&self) -> BinaryStatus {
        let bin_dir = self.config.bin_dir.as_deref();

        let mut status = match resolve_executable(&self.config.ytdlp_path, bin_dir) {
            Some(path) => match self.query_version(&path).await {
                Some(version) => BinaryStatus::ready(path, version),
                None => BinaryStatus::missing(path),
            },
            None => BinaryStatus::missing(self.config.ytdlp_path.clone()),
        };

        if let Some(ffmpeg) = resolve_executable(&self.config.ffmpeg_path, bin_dir) {
            status = status.with_av_tool(ffmpeg);
        }

        info!(
            tool_installed = status.tool_installed,
            tool_version = ?status.tool_version,
            av_tool_installed = status.av_tool_installed,
            "Toolchain checked"
        );
        status
    }

    /// Runs `<tool> --version` and returns the first line of stdout.
    async fn query_version(&self, path: &Path) -> Option<String> {
        let output = Command::new(path)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let limit = Duration::from_secs(self.config.version_timeout_secs);
        match timeout(limit, output).await {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let version = stdout.lines().next().unwrap_or_default().trim().to_string();
                (!version.is_empty()).then_some(version)
            }
            Ok(Ok(output)) => {
                warn!(path = %path.display(), code = ?output.status.code(), "Version query failed");
                None
            }
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "Version query could not run");
                None
            }
            Err(_) => {
                warn!(path = %path.display(), timeout_secs = self.config.version_timeout_secs, "Version query timed out");
                None
            }
        }
    }
}

#[async_trait]
impl Toolchain for LocalToolchain {
    fn name(&self) -> &str {
        "local"
    }

    async fn ensure_ready(&self) -> BinaryStatus {
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);
        if !ttl.is_zero() {
            if let Some((checked_at, status)) = self.cached.read().await.as_ref() {
                if checked_at.elapsed() < ttl {
                    debug!("Using cached toolchain status");
                    return status.clone();
                }
            }
        }

        let status = self.check().await;
        if !ttl.is_zero() {
            *self.cached.write().await = Some((Instant::now(), status.clone()));
        }
        status
    }
}

/// Finds an executable.
///
/// Paths with a directory component are used as given. Bare names are
/// looked up in `bin_dir` first, then in every `PATH` entry.
pub fn resolve_executable(program: &Path, bin_dir: Option<&Path>) -> Option<PathBuf> {
    if program.is_absolute() || program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    let search_path = std::env::var_os("PATH");
    let path_dirs = search_path
        .as_deref()
        .map(|p| std::env::split_paths(p).collect::<Vec<_>>())
        .unwrap_or_default();

    bin_dir
        .map(Path::to_path_buf)
        .into_iter()
        .chain(path_dirs)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| candidate.is_file())
}

fn candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    let plain = dir.join(program);
    if cfg!(windows) && program.extension().is_none() {
        vec![plain.with_extension("exe"), plain]
    } else {
        vec![plain]
    }
}
