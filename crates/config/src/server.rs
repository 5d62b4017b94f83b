//! HTTP server configuration settings.

use std::net::SocketAddr;

use serde::Deserialize;

use crate::{CorsConfig, HealthConfig};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// Whether a CORS layer is applied at all. A permissive layer is used
    /// when enabled without an explicit `[server.cors]` table.
    pub cors_enabled: bool,
    /// CORS configuration.
    pub cors: Option<CorsConfig>,
    /// Health endpoint configuration.
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            cors_enabled: true,
            cors: None,
            health: HealthConfig::default(),
        }
    }
}
