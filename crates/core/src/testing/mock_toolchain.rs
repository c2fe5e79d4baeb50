//! Mock toolchain for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::toolchain::{BinaryStatus, Toolchain};

/// Mock implementation of the Toolchain trait.
///
/// Reports a fixed status that tests can flip between ready and missing.
#[derive(Debug, Clone)]
pub struct MockToolchain {
    status: Arc<RwLock<BinaryStatus>>,
    checks: Arc<AtomicUsize>,
}

impl Default for MockToolchain {
    fn default() -> Self {
        Self::ready()
    }
}

impl MockToolchain {
    /// A toolchain with both yt-dlp and ffmpeg available.
    pub fn ready() -> Self {
        Self::with_status(
            BinaryStatus::ready("/mock/bin/yt-dlp", "2024.08.06").with_av_tool("/mock/bin/ffmpeg"),
        )
    }

    /// A toolchain whose yt-dlp is missing.
    pub fn missing() -> Self {
        Self::with_status(BinaryStatus::missing("yt-dlp"))
    }

    pub fn with_status(status: BinaryStatus) -> Self {
        Self {
            status: Arc::new(RwLock::new(status)),
            checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the reported status.
    pub async fn set_status(&self, status: BinaryStatus) {
        *self.status.write().await = status;
    }

    /// Toggle whether yt-dlp is reported as installed.
    pub async fn set_installed(&self, installed: bool) {
        let mut status = self.status.write().await;
        status.tool_installed = installed;
        if !installed {
            status.tool_version = None;
        }
    }

    /// Path reported for yt-dlp.
    pub async fn tool_path(&self) -> PathBuf {
        self.status.read().await.tool_path.clone()
    }

    /// Number of `ensure_ready` calls.
    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Toolchain for MockToolchain {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ensure_ready(&self) -> BinaryStatus {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.status.read().await.clone()
    }
}
