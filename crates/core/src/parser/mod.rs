//! Progress parser for download tool output.
//!
//! Turns one raw output line into at most one structured `ParsedEvent`.
//! The parser is pure and stateless; lines it does not recognize yield
//! `None` and are never treated as errors.
//!
//! # Example
//!
//! ```ignore
//! use clipfetch_core::parser::{parse_line, ParsedEvent};
//!
//! match parse_line("[download]  42.5% of ~ 10.00MiB at 1.23MiB/s ETA 00:05") {
//!     Some(ParsedEvent::Progress(sample)) => println!("{:?}%", sample.percentage),
//!     _ => {}
//! }
//! ```

mod grammar;
mod types;

pub use grammar::{parse_line, GRAMMAR_VERSION};
pub use types::{ParsedEvent, PhaseMarker, ProgressSample};
