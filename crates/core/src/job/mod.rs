//! Download jobs.
//!
//! A job is one user-requested download tracked from submission to a
//! terminal status. This module holds the request and option types, request
//! validation, the status state machine, and the pure translation of a
//! request into download tool arguments.
//!
//! # Example
//!
//! ```ignore
//! use clipfetch_core::job::{build_args, AudioFormat, DownloadRequest};
//!
//! let request = DownloadRequest::new("https://example.com/watch?v=abc", "/home/me/Music")
//!     .with_audio(AudioFormat::Mp3)
//!     .validated()?;
//!
//! let args = build_args(&request, None);
//! assert_eq!(args.last().map(String::as_str), Some("https://example.com/watch?v=abc"));
//! ```

mod args;
mod error;
mod request;
mod types;

pub use args::{build_args, OUTPUT_TEMPLATE};
pub use error::ValidationError;
pub use request::{AudioFormat, DownloadMode, DownloadRequest, VideoContainer, VideoQuality};
pub use types::{Job, JobError, JobErrorKind, JobEvent, JobId, JobProgress, JobStatus};
