//! Process runner for external command-line tools.
//!
//! This module provides the `ProcessRunner` trait and a tokio-based
//! implementation that spawns one OS process per call, merges its stdout and
//! stderr into a single stream of tagged lines, and hands back a
//! `ProcessHandle` for waiting on and cooperatively killing the process.
//!
//! # Example
//!
//! ```ignore
//! use clipfetch_core::runner::{CommandSpec, ProcessRunner, RunnerConfig, TokioProcessRunner};
//!
//! let runner = TokioProcessRunner::new(RunnerConfig::default());
//! let mut process = runner
//!     .run(CommandSpec::new("/usr/local/bin/yt-dlp").with_args(["--version"]))
//!     .await?;
//!
//! while let Some(line) = process.lines.recv().await {
//!     println!("[{}] {}", line.stream, line.text);
//! }
//!
//! let outcome = process.handle.wait().await;
//! println!("exited with {:?}", outcome.code);
//! ```

mod config;
mod error;
mod handle;
mod process;
mod traits;
mod types;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use handle::ProcessHandle;
pub(crate) use handle::ProcessControl;
pub use process::TokioProcessRunner;
pub use traits::ProcessRunner;
pub use types::{CommandSpec, ExitOutcome, OutputLine, RunningProcess, StreamKind};
