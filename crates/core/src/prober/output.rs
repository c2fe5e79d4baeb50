//! Interpretation of `--dump-json --flat-playlist` output.

use serde::Deserialize;

use super::error::ProbeError;
use super::types::{PlaylistEntry, VideoInfo};

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(rename = "_type")]
    kind: Option<String>,
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    thumbnails: Option<Vec<RawThumbnail>>,
    description: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    webpage_url: Option<String>,
    playlist_id: Option<String>,
    playlist_title: Option<String>,
    /// Unavailable playlist items show up as `null`.
    entries: Option<Vec<Option<RawInfo>>>,
}

#[derive(Debug, Deserialize)]
struct RawThumbnail {
    url: Option<String>,
}

impl RawInfo {
    /// Explicit thumbnail, else the last listed one (yt-dlp sorts by quality).
    fn best_thumbnail(&self) -> Option<String> {
        self.thumbnail
            .clone()
            .or_else(|| {
                self.thumbnails
                    .iter()
                    .flatten()
                    .rev()
                    .find_map(|t| t.url.clone())
            })
    }

    fn uploader(&self) -> Option<String> {
        self.uploader.clone().or_else(|| self.channel.clone())
    }

    /// A playlist item listed by `--flat-playlist` rather than a resolved video.
    fn is_flat_entry(&self) -> bool {
        self.kind.as_deref() == Some("url") || self.playlist_id.is_some()
    }

    fn into_entry(self) -> PlaylistEntry {
        let thumbnail = self.best_thumbnail();
        PlaylistEntry {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_else(|| "Unknown".to_string()),
            duration: self.duration,
            thumbnail,
        }
    }
}

/// Builds a `VideoInfo` from the tool's stdout lines.
pub(crate) fn parse_probe_output(lines: &[String]) -> Result<VideoInfo, ProbeError> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.starts_with('{'))
        .collect();

    match lines.as_slice() {
        [] => Err(ProbeError::parse("no JSON output")),
        [single] => {
            let raw: RawInfo = serde_json::from_str(single)
                .map_err(|e| ProbeError::parse(format!("invalid JSON: {e}")))?;
            if raw.is_flat_entry() {
                Ok(from_flat_entries(vec![raw]))
            } else {
                Ok(from_single(raw))
            }
        }
        many => {
            let raws = many
                .iter()
                .map(|line| serde_json::from_str::<RawInfo>(line))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ProbeError::parse(format!("invalid JSON entry: {e}")))?;
            Ok(from_flat_entries(raws))
        }
    }
}

fn from_single(raw: RawInfo) -> VideoInfo {
    if raw.kind.as_deref() == Some("playlist") {
        let thumbnail = raw.best_thumbnail();
        let uploader = raw.uploader();
        let entries: Vec<PlaylistEntry> = raw
            .entries
            .into_iter()
            .flatten()
            .flatten()
            .map(RawInfo::into_entry)
            .collect();
        return VideoInfo {
            id: raw.id.unwrap_or_else(|| "playlist".to_string()),
            title: raw.title.unwrap_or_else(|| "Playlist".to_string()),
            duration: None,
            thumbnail,
            description: raw.description,
            uploader,
            webpage_url: raw.webpage_url,
            is_playlist: true,
            playlist_count: Some(entries.len()),
            entries: Some(entries),
        };
    }

    let thumbnail = raw.best_thumbnail();
    let uploader = raw.uploader();
    VideoInfo {
        id: raw.id.unwrap_or_default(),
        title: raw.title.unwrap_or_else(|| "Unknown".to_string()),
        duration: raw.duration,
        thumbnail,
        description: raw.description,
        uploader,
        webpage_url: raw.webpage_url,
        is_playlist: false,
        playlist_count: None,
        entries: None,
    }
}

/// One JSON object per line is how `--flat-playlist` lists playlist items.
fn from_flat_entries(raws: Vec<RawInfo>) -> VideoInfo {
    let id = raws.iter().find_map(|r| r.playlist_id.clone());
    let title = raws.iter().find_map(|r| r.playlist_title.clone());
    let entries: Vec<PlaylistEntry> = raws.into_iter().map(RawInfo::into_entry).collect();

    VideoInfo {
        id: id.unwrap_or_else(|| "playlist".to_string()),
        title: title.unwrap_or_else(|| "Playlist".to_string()),
        duration: None,
        thumbnail: entries.iter().find_map(|e| e.thumbnail.clone()),
        description: None,
        uploader: None,
        webpage_url: None,
        is_playlist: true,
        playlist_count: Some(entries.len()),
        entries: Some(entries),
    }
}

/// Classifies a failed probe from its stderr.
pub(crate) fn classify_failure(code: Option<i32>, stderr: &[String]) -> ProbeError {
    let message = stderr
        .iter()
        .rev()
        .find_map(|l| l.trim().strip_prefix("ERROR:"))
        .map(|m| m.trim().to_string())
        .or_else(|| stderr.last().cloned())
        .unwrap_or_else(|| "yt-dlp failed without output".to_string());

    let lower = message.to_lowercase();
    if lower.contains("unsupported url") || lower.contains("is not a valid url") {
        return ProbeError::Unsupported { message };
    }

    const UNAVAILABLE: &[&str] = &[
        "private video",
        "video unavailable",
        "not available",
        "has been removed",
        "sign in to confirm",
        "login required",
        "members-only",
        "http error 403",
        "http error 404",
        "does not exist",
    ];
    if UNAVAILABLE.iter().any(|needle| lower.contains(needle)) {
        return ProbeError::Unavailable { message };
    }

    ProbeError::ToolFailed { code, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_video() {
        let out = lines(&[
            r#"{"id":"abc","title":"A Clip","duration":212.0,"thumbnail":"https://i/abc.jpg","uploader":"Someone","description":"desc","webpage_url":"https://example.com/v/abc"}"#,
        ]);
        let info = parse_probe_output(&out).unwrap();
        assert!(!info.is_playlist);
        assert_eq!(info.id, "abc");
        assert_eq!(info.duration, Some(212.0));
        assert_eq!(info.uploader.as_deref(), Some("Someone"));
        assert_eq!(info.entries, None);
        assert_eq!(info.playlist_count, None);
    }

    #[test]
    fn test_flat_playlist_lines() {
        let out = lines(&[
            r#"{"_type":"url","id":"a","title":"First","duration":10,"playlist_id":"PL1","playlist_title":"Mix"}"#,
            r#"{"_type":"url","id":"b","title":"Second","thumbnails":[{"url":"https://i/b0.jpg"},{"url":"https://i/b1.jpg"}],"playlist_id":"PL1","playlist_title":"Mix"}"#,
            r#"{"_type":"url","id":"c","playlist_id":"PL1","playlist_title":"Mix"}"#,
        ]);
        let info = parse_probe_output(&out).unwrap();
        assert!(info.is_playlist);
        assert_eq!(info.id, "PL1");
        assert_eq!(info.title, "Mix");
        assert_eq!(info.playlist_count, Some(3));

        let entries = info.entries.unwrap();
        assert_eq!(entries[0].duration, Some(10.0));
        assert_eq!(entries[1].thumbnail.as_deref(), Some("https://i/b1.jpg"));
        assert_eq!(entries[2].title, "Unknown");
    }

    #[test]
    fn test_one_entry_playlist_stays_a_playlist() {
        let out = lines(&[
            r#"{"_type":"url","id":"a","title":"Only","duration":60,"playlist_id":"PL1","playlist_title":"Mix"}"#,
        ]);
        let info = parse_probe_output(&out).unwrap();
        assert!(info.is_playlist);
        assert_eq!(info.id, "PL1");
        assert_eq!(info.title, "Mix");
        assert_eq!(info.playlist_count, Some(1));
        assert_eq!(info.entries.unwrap()[0].id, "a");
    }

    #[test]
    fn test_single_playlist_object() {
        let out = lines(&[
            r#"{"_type":"playlist","id":"PL9","title":"Album","uploader":"Band","entries":[{"id":"x","title":"One"},{"id":"y","title":"Two"}]}"#,
        ]);
        let info = parse_probe_output(&out).unwrap();
        assert!(info.is_playlist);
        assert_eq!(info.title, "Album");
        assert_eq!(info.playlist_count, Some(2));
        assert_eq!(info.entries.unwrap()[1].id, "y");
    }

    #[test]
    fn test_non_json_lines_are_skipped() {
        let out = lines(&["[debug] noise", r#"{"id":"abc","title":"A"}"#]);
        assert!(!parse_probe_output(&out).unwrap().is_playlist);
    }

    #[test]
    fn test_bad_output_is_parse_error() {
        assert!(matches!(
            parse_probe_output(&[]),
            Err(ProbeError::Parse { .. })
        ));
        assert!(matches!(
            parse_probe_output(&lines(&["{not json"])),
            Err(ProbeError::Parse { .. })
        ));
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(Some(1), &lines(&["ERROR: Unsupported URL: https://nope"])),
            ProbeError::Unsupported { .. }
        ));
        assert!(matches!(
            classify_failure(Some(1), &lines(&["ERROR: [youtube] abc: Private video. Sign in"])),
            ProbeError::Unavailable { .. }
        ));
        match classify_failure(Some(2), &lines(&["WARNING: x", "ERROR: something odd"])) {
            ProbeError::ToolFailed { code, message } => {
                assert_eq!(code, Some(2));
                assert_eq!(message, "something odd");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
