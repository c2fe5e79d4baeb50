//! Metadata types returned by a probe.

use serde::{Deserialize, Serialize};

/// Metadata for a URL: either a single video or a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub uploader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpage_url: Option<String>,
    pub is_playlist: bool,
    pub playlist_count: Option<usize>,
    /// Playlist entries in playlist order. `None` for single videos.
    pub entries: Option<Vec<PlaylistEntry>>,
}

/// One item of a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    pub title: String,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
}
