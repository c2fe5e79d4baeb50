//! Metadata prober.
//!
//! Resolves a URL into a `VideoInfo` (title, duration, thumbnail, playlist
//! entries) by running the download tool once in info-only mode.
//!
//! # Example
//!
//! ```ignore
//! use clipfetch_core::prober::{MetadataProber, ProberConfig};
//!
//! let prober = MetadataProber::new(ProberConfig::default(), toolchain, runner);
//! let info = prober.probe("https://example.com/watch?v=abc").await?;
//! if info.is_playlist {
//!     println!("{} items", info.playlist_count.unwrap_or(0));
//! }
//! ```

mod config;
mod error;
mod metadata;
mod output;
mod types;

pub use config::ProberConfig;
pub use error::ProbeError;
pub use metadata::MetadataProber;
pub use types::{PlaylistEntry, VideoInfo};
