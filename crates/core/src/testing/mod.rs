//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the process runner and
//! toolchain traits, so the registry and prober can be exercised without a
//! real yt-dlp installation.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipfetch_core::testing::{fixtures, MockProcessRunner, MockScript, MockToolchain};
//!
//! let toolchain = MockToolchain::ready();
//! let runner = MockProcessRunner::new();
//!
//! // Script the next process
//! runner.push_script(MockScript::lines(fixtures::download_lines("clip.mp4"), 0)).await;
//!
//! // Use in a JobRegistry or MetadataProber...
//! ```

mod mock_runner;
mod mock_toolchain;

pub use mock_runner::{MockProcessRunner, MockScript, MockStep};
pub use mock_toolchain::MockToolchain;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::job::DownloadRequest;

    /// A video download request into `dir`.
    pub fn video_request(dir: &Path) -> DownloadRequest {
        DownloadRequest::new("https://example.com/watch?v=abc", dir)
    }

    /// A progress line as yt-dlp prints it with `--newline`.
    pub fn progress_line(percentage: f64) -> String {
        format!("[download] {percentage:>5.1}% of ~ 10.00MiB at  1.00MiB/s ETA 00:05")
    }

    /// Output of a typical single-video download that ends with a merge.
    pub fn download_lines(filename: &str) -> Vec<String> {
        vec![
            "[youtube] abc: Downloading webpage".to_string(),
            "[info] abc: Downloading 1 format(s): 137+140".to_string(),
            format!("[download] Destination: /downloads/{filename}"),
            progress_line(10.0),
            progress_line(55.5),
            progress_line(100.0),
            format!("[Merger] Merging formats into \"/downloads/{filename}\""),
        ]
    }

    /// `--dump-json` output for a single video.
    pub fn single_video_json(id: &str, title: &str) -> String {
        format!(
            r#"{{"id":"{id}","title":"{title}","duration":212.0,"thumbnail":"https://img.example.com/{id}.jpg","uploader":"Someone","webpage_url":"https://example.com/watch?v={id}"}}"#
        )
    }

    /// `--flat-playlist --dump-json` output, one line per entry.
    pub fn flat_playlist_json(playlist_id: &str, entries: &[(&str, &str)]) -> Vec<String> {
        entries
            .iter()
            .map(|(id, title)| {
                format!(
                    r#"{{"_type":"url","id":"{id}","title":"{title}","duration":60,"playlist_id":"{playlist_id}","playlist_title":"Mix"}}"#
                )
            })
            .collect()
    }
}
