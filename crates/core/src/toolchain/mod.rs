//! Toolchain readiness.
//!
//! Downloads and probes need yt-dlp (and, for merging and audio extraction,
//! ffmpeg). This module answers whether those executables are usable and
//! where they live. Installing or updating them is handled elsewhere.
//!
//! # Example
//!
//! ```ignore
//! use clipfetch_core::toolchain::{LocalToolchain, ToolConfig, Toolchain};
//!
//! let toolchain = LocalToolchain::new(ToolConfig::default());
//! let status = toolchain.ensure_ready().await;
//! if !status.tool_installed {
//!     eprintln!("yt-dlp not found at {}", status.tool_path.display());
//! }
//! ```

mod config;
mod local;
mod traits;
mod types;

pub use config::ToolConfig;
pub use local::{resolve_executable, LocalToolchain};
pub use traits::Toolchain;
pub use types::BinaryStatus;
