//! Job registry.
//!
//! The registry owns every job, enforces the concurrency limit, drives each
//! job's process through a supervising task, and broadcasts status and
//! progress changes to any number of subscribers.
//!
//! Jobs are started in FIFO order. A job holds one slot from the moment it
//! is dispatched until its process has been reaped, so cancelled jobs never
//! push the number of live processes over the limit.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clipfetch_core::registry::{JobRegistry, RegistryConfig};
//! use clipfetch_core::runner::TokioProcessRunner;
//! use clipfetch_core::toolchain::{LocalToolchain, ToolConfig};
//!
//! let registry = JobRegistry::new(
//!     RegistryConfig::default(),
//!     Arc::new(LocalToolchain::new(ToolConfig::default())),
//!     Arc::new(TokioProcessRunner::default()),
//! );
//!
//! let mut events = registry.subscribe();
//! let id = registry.submit(request).await?;
//!
//! while let Ok(event) = events.recv().await {
//!     if event.job_id == id && event.status.is_terminal() {
//!         break;
//!     }
//! }
//! ```

mod config;
mod error;
mod job_registry;
mod supervisor;
mod types;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use job_registry::JobRegistry;
pub use types::RegistryStatus;
