//! Translation of a download request into tool arguments.

use std::path::Path;

use super::request::{DownloadMode, DownloadRequest};

/// Output filename template, relative to the output directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Builds the yt-dlp argument list for `request`.
///
/// Pure: the same request and ffmpeg location always yield the same list.
/// The URL is always last, after `--`.
pub fn build_args(request: &DownloadRequest, ffmpeg: Option<&Path>) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--newline".into(),
        "--progress".into(),
        "--no-colors".into(),
        "-o".into(),
        request
            .output_dir
            .join(OUTPUT_TEMPLATE)
            .to_string_lossy()
            .into_owned(),
    ];

    match request.mode() {
        DownloadMode::Video { quality, container } => {
            args.push("-f".into());
            args.push(quality.format_selector().into());
            args.push("--merge-output-format".into());
            args.push(container.extension().into());
        }
        DownloadMode::Audio { format } => {
            args.push("-x".into());
            args.push("--audio-format".into());
            args.push(format.extension().into());
        }
    }

    if request.embed_subs {
        args.push("--write-subs".into());
        args.push("--embed-subs".into());
    }

    if let Some(items) = request.playlist_items.as_ref().filter(|i| !i.is_empty()) {
        let list = items
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        args.push("--playlist-items".into());
        args.push(list);
    }

    if let Some(path) = ffmpeg {
        args.push("--ffmpeg-location".into());
        args.push(path.to_string_lossy().into_owned());
    }

    args.push("--".into());
    args.push(request.url.clone());
    args
}
