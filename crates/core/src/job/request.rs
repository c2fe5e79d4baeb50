//! Download request and option types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::error::ValidationError;

/// Video quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoQuality {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
}

impl VideoQuality {
    /// Format selector passed to `-f`.
    pub fn format_selector(&self) -> &'static str {
        match self {
            VideoQuality::Best => "bv*+ba/b",
            VideoQuality::P720 => "bv*[height<=720]+ba/b",
            VideoQuality::P480 => "bv*[height<=480]+ba/b",
        }
    }
}

/// Container for merged video output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    #[default]
    Mp4,
    Mkv,
    Webm,
}

impl VideoContainer {
    pub fn extension(&self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "mp4",
            VideoContainer::Mkv => "mkv",
            VideoContainer::Webm => "webm",
        }
    }
}

/// Target format for audio-only extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    M4a,
    Aac,
    Flac,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }
}

/// Resolved download mode of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Video {
        quality: VideoQuality,
        container: VideoContainer,
    },
    Audio {
        format: AudioFormat,
    },
}

/// A user's request to download one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Source URL (video or playlist page).
    pub url: String,
    /// Absolute, existing, writable directory for output files.
    pub output_dir: PathBuf,
    /// Video quality tier. Mutually exclusive with `audio_format`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_quality: Option<VideoQuality>,
    /// Merge container for video downloads. Defaults to mp4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_container: Option<VideoContainer>,
    /// Presence selects audio-only extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<AudioFormat>,
    /// Download and embed subtitles.
    #[serde(default)]
    pub embed_subs: bool,
    /// 1-based playlist indices to download, in order. `None` downloads all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_items: Option<Vec<u32>>,
}

impl DownloadRequest {
    /// Creates a best-quality mp4 video request.
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            video_quality: None,
            video_container: None,
            audio_format: None,
            embed_subs: false,
            playlist_items: None,
        }
    }

    pub fn with_video(mut self, quality: VideoQuality, container: VideoContainer) -> Self {
        self.video_quality = Some(quality);
        self.video_container = Some(container);
        self
    }

    pub fn with_audio(mut self, format: AudioFormat) -> Self {
        self.audio_format = Some(format);
        self
    }

    pub fn with_subtitles(mut self) -> Self {
        self.embed_subs = true;
        self
    }

    pub fn with_playlist_items(mut self, items: Vec<u32>) -> Self {
        self.playlist_items = Some(items);
        self
    }

    /// The download mode this request resolves to.
    pub fn mode(&self) -> DownloadMode {
        match self.audio_format {
            Some(format) => DownloadMode::Audio { format },
            None => DownloadMode::Video {
                quality: self.video_quality.unwrap_or_default(),
                container: self.video_container.unwrap_or_default(),
            },
        }
    }

    /// Validates the request and returns it in normalized form.
    ///
    /// Normalization trims the URL and turns an empty playlist item list
    /// into `None`. The output directory check touches the filesystem.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.url = self.url.trim().to_string();
        if self.url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if self.url.starts_with('-') {
            return Err(ValidationError::UrlLooksLikeOption { url: self.url });
        }

        if self.audio_format.is_some()
            && (self.video_quality.is_some() || self.video_container.is_some())
        {
            return Err(ValidationError::ConflictingMode);
        }

        if let Some(items) = &self.playlist_items {
            let mut seen = HashSet::with_capacity(items.len());
            for &index in items {
                if index == 0 {
                    return Err(ValidationError::InvalidPlaylistItem { index });
                }
                if !seen.insert(index) {
                    return Err(ValidationError::DuplicatePlaylistItem { index });
                }
            }
        }
        if self.playlist_items.as_ref().is_some_and(Vec::is_empty) {
            self.playlist_items = None;
        }

        check_output_dir(&self.output_dir)?;
        Ok(self)
    }
}

fn check_output_dir(path: &Path) -> Result<(), ValidationError> {
    if !path.is_absolute() {
        return Err(ValidationError::OutputDirNotAbsolute {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ValidationError::OutputDirMissing {
            path: path.to_path_buf(),
        });
    }

    let probe = path.join(format!(".clipfetch-write-{}", uuid::Uuid::new_v4()));
    std::fs::File::create(&probe)
        .and_then(|_| std::fs::remove_file(&probe))
        .map_err(|e| ValidationError::OutputDirNotWritable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
