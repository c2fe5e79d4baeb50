use std::sync::Arc;
use clipfetch_core::{Config, JobRegistry, MetadataProber, Toolchain};

/// Shared application state
pub struct AppState {
    config: Config,
    registry: JobRegistry,
    prober: Arc<MetadataProber>,
    toolchain: Arc<dyn Toolchain>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: JobRegistry,
        prober: Arc<MetadataProber>,
        toolchain: Arc<dyn Toolchain>,
    ) -> Self {
        Self {
            config,
            registry,
            prober,
            toolchain,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn prober(&self) -> &MetadataProber {
        self.prober.as_ref()
    }

    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }
}
