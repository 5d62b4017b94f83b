//! Relay configuration structures to map the relay.toml configuration.
//!
//! Configuration comes from two places: an optional TOML file whose string
//! values may reference environment variables as `${VAR}`, and a set of plain
//! environment variables (`PORT`, `CEREBRAS_API_KEY`, ...) used when no file
//! is given.

#![deny(missing_docs)]

mod cors;
mod env;
mod health;
mod llm;
mod loader;
mod metrics;
mod server;

use std::path::Path;

pub use cors::{AnyOrArray, CorsConfig, HttpMethod};
pub use health::HealthConfig;
pub use llm::{ApiProviderConfig, LlmConfig, McpGatewayConfig};
pub use metrics::{DemoConfig, MetricsConfig, PrometheusConfig};
use serde::Deserialize;
pub use server::ServerConfig;

/// Main configuration structure for the relay application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM provider configuration settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Metrics store and exposition configuration settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file, expanding `${VAR}` references.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Build configuration from the recognized environment variables alone.
    ///
    /// Used when no configuration file exists, which is the common deployment
    /// mode (everything injected through the process environment).
    pub fn from_env() -> Config {
        env::from_env(|name| std::env::var(name).ok())
    }
}
