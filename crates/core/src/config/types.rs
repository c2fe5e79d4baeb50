use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::prober::ProberConfig;
use crate::registry::RegistryConfig;
use crate::runner::RunnerConfig;
use crate::toolchain::ToolConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tools: ToolConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub prober: ProberConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow cross-origin requests from any origin (the GUI front end is
    /// usually served from a different origin).
    #[serde(default = "default_permissive_cors")]
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            permissive_cors: default_permissive_cors(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}

fn default_permissive_cors() -> bool {
    true
}
