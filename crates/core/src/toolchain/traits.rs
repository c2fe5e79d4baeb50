//! Toolchain trait definition.

use async_trait::async_trait;

use super::types::BinaryStatus;

/// Reports whether the external tools are usable.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Toolchain name for logging.
    fn name(&self) -> &str;

    /// Checks the tools and returns their status. Never fails; a missing
    /// tool is reported through the returned flags.
    async fn ensure_ready(&self) -> BinaryStatus;
}
