//! Configuration for locating the external tools.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where to find yt-dlp and ffmpeg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// yt-dlp executable: an absolute path, or a bare name looked up in
    /// `bin_dir` and then `PATH`.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// ffmpeg executable, resolved the same way as `ytdlp_path`.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Directory holding app-managed binaries, searched before `PATH`.
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,

    /// Timeout for `--version` queries in seconds.
    #[serde(default = "default_version_timeout")]
    pub version_timeout_secs: u64,

    /// How long a readiness result is reused, in seconds. 0 disables caching.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_version_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    30
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            ffmpeg_path: default_ffmpeg_path(),
            bin_dir: None,
            version_timeout_secs: default_version_timeout(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl ToolConfig {
    pub fn with_ytdlp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ytdlp_path = path.into();
        self
    }

    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    pub fn with_bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(dir.into());
        self
    }
}
