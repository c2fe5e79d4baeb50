//! Line grammar for yt-dlp `--newline` output.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::{ParsedEvent, PhaseMarker, ProgressSample};

/// Version of the line grammar. Bump whenever a recognized line shape is
/// added, removed or reinterpreted.
pub const GRAMMAR_VERSION: u32 = 1;

static TAGGED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([A-Za-z0-9_:+-]+)\]\s*(.*)$").unwrap());

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)%").unwrap());

static TOTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bof\s+~?\s*(\S+)").unwrap());

static SPEED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bat\s+(Unknown(?:\s+(?:B/s|speed))?|\S+/s)").unwrap());

static ETA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bETA\s+(\S+)").unwrap());

static DOWNLOADED_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?\s?[KMGTPE]?i?B)\s+at\s+").unwrap());

static EXTRACTOR_STEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s:]+: (?:Downloading|Extracting|Checking)\b").unwrap());

static MERGER_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^Merging formats into "(.+)"$"#).unwrap());

static ALREADY_DOWNLOADED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?) has already been downloaded").unwrap());

/// Post-processor tags that do not follow the `Fixup*` naming.
const POSTPROCESSORS: &[&str] = &[
    "Merger",
    "ExtractAudio",
    "VideoConvertor",
    "VideoRemuxer",
    "EmbedSubtitle",
    "EmbedThumbnail",
    "ThumbnailsConvertor",
    "Metadata",
    "SponsorBlock",
    "ModifyChapters",
    "SplitChapters",
    "MoveFiles",
    "Exec",
];

/// Parses one line of tool output.
///
/// Returns `None` for anything the grammar does not recognize.
pub fn parse_line(line: &str) -> Option<ParsedEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(message) = line.strip_prefix("ERROR:") {
        let message = message.trim();
        return (!message.is_empty()).then(|| ParsedEvent::ToolError {
            message: message.to_string(),
        });
    }

    if line.starts_with("Extracting URL") {
        return Some(phase(PhaseMarker::Extracting, None));
    }

    let caps = TAGGED_LINE.captures(line)?;
    let tag = caps.get(1)?.as_str();
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    match tag {
        "download" => parse_download(rest),
        _ if is_postprocessor(tag) => Some(parse_postprocessor(tag, rest)),
        "info" => Some(phase(PhaseMarker::Extracting, None)),
        _ if is_extractor_line(tag, rest) => Some(phase(PhaseMarker::Extracting, None)),
        _ => None,
    }
}

fn parse_download(rest: &str) -> Option<ParsedEvent> {
    if let Some(path) = rest.strip_prefix("Destination:") {
        let filename = path.trim();
        return (!filename.is_empty()).then(|| ParsedEvent::Destination {
            filename: filename.to_string(),
        });
    }

    if let Some(caps) = ALREADY_DOWNLOADED.captures(rest) {
        let filename = caps.get(1).map(|m| m.as_str().trim().to_string());
        return Some(phase(PhaseMarker::AlreadyDownloaded, filename));
    }

    if let Some(caps) = PERCENT.captures(rest) {
        let percentage = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0));

        return Some(ParsedEvent::Progress(ProgressSample {
            percentage,
            downloaded: None,
            total: capture(&TOTAL, rest),
            speed: capture(&SPEED, rest),
            eta: capture(&ETA, rest),
        }));
    }

    if let Some(caps) = DOWNLOADED_ONLY.captures(rest) {
        return Some(ParsedEvent::Progress(ProgressSample {
            percentage: None,
            downloaded: caps.get(1).map(|m| m.as_str().to_string()),
            total: None,
            speed: capture(&SPEED, rest),
            eta: None,
        }));
    }

    None
}

fn parse_postprocessor(tag: &str, rest: &str) -> ParsedEvent {
    let filename = match tag {
        "Merger" => MERGER_TARGET
            .captures(rest)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        "ExtractAudio" | "VideoConvertor" | "VideoRemuxer" => rest
            .strip_prefix("Destination:")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        _ => None,
    };
    phase(PhaseMarker::Processing, filename)
}

fn is_postprocessor(tag: &str) -> bool {
    POSTPROCESSORS.contains(&tag) || tag.starts_with("Fixup")
}

/// Extractor lines look like `[youtube] dQw4w9WgXcQ: Downloading webpage`.
/// Extractor names are lowercase; post-processors are CamelCase.
fn is_extractor_line(tag: &str, rest: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && (rest.starts_with("Extracting URL") || EXTRACTOR_STEP.is_match(rest))
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .and_then(known_value)
}

/// Maps the tool's placeholders for unknown values to `None`.
fn known_value(value: &str) -> Option<String> {
    if value.is_empty() || value.starts_with("Unknown") || value == "N/A" || value == "NA" {
        None
    } else {
        Some(value.to_string())
    }
}

fn phase(phase: PhaseMarker, filename: Option<String>) -> ParsedEvent {
    ParsedEvent::Phase { phase, filename }
}
