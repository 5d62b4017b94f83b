//! Configuration from plain environment variables.
//!
//! This is the file-less deployment mode: every recognized knob is a single
//! environment variable. The lookup function is injected so tests never touch
//! the process environment.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use secrecy::SecretString;

use crate::{ApiProviderConfig, Config, McpGatewayConfig, llm::DEFAULT_TIMEOUT};

const DEFAULT_PORT: u16 = 3000;

pub(crate) fn from_env<F>(lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::default();

    let host = lookup("HOST").and_then(|v| v.parse::<IpAddr>().ok());
    let port = lookup("PORT").and_then(|v| v.parse::<u16>().ok());

    if host.is_some() || port.is_some() {
        config.server.listen_address = Some(SocketAddr::new(
            host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port.unwrap_or(DEFAULT_PORT),
        ));
    }

    if let Some(enabled) = lookup("CORS_ENABLED").and_then(|v| v.parse::<bool>().ok()) {
        config.server.cors_enabled = enabled;
    }

    apply_provider(&mut config.llm.cerebras, "CEREBRAS", &lookup);
    apply_provider(&mut config.llm.openrouter, "OPENROUTER", &lookup);
    apply_provider(&mut config.llm.llama, "LLAMA", &lookup);

    config.llm.mcp = mcp_from_env(&lookup);

    if let Some(size) = lookup("METRICS_MAX_SIZE").and_then(|v| v.parse::<usize>().ok()) {
        config.metrics.max_size = size;
    }

    // Interval in milliseconds; zero disables the generator outright.
    if let Some(interval) = lookup("DEMO_INTERVAL").and_then(|v| v.parse::<u64>().ok()) {
        if interval == 0 {
            config.metrics.demo.enabled = false;
        } else {
            config.metrics.demo.interval = Duration::from_millis(interval);
        }
    }

    if let Some(enabled) = lookup("PROMETHEUS_ENABLED").and_then(|v| v.parse::<bool>().ok()) {
        config.metrics.prometheus.enabled = enabled;
    }

    if let Some(path) = lookup("PROMETHEUS_ENDPOINT") {
        config.metrics.prometheus.path = path.into();
    }

    config
}

fn apply_provider<F>(provider: &mut ApiProviderConfig, prefix: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(&format!("{prefix}_API_KEY")) {
        provider.api_key = Some(SecretString::from(key));
    }

    if let Some(url) = lookup(&format!("{prefix}_API_URL")) {
        provider.base_url = Some(url);
    }

    if let Some(ms) = lookup(&format!("{prefix}_TIMEOUT")).and_then(|v| v.parse::<u64>().ok()) {
        provider.timeout = Duration::from_millis(ms);
    }

    if let Some(rate) = lookup(&format!("{prefix}_COST_PER_MILLION")).and_then(|v| v.parse::<f64>().ok()) {
        provider.cost_per_million = rate;
    }
}

fn mcp_from_env<F>(lookup: &F) -> Option<McpGatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("MCP_GATEWAY_URL").or_else(|| {
        lookup("MCP_GATEWAY_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .map(|port| format!("http://127.0.0.1:{port}"))
    })?;

    let timeout = lookup("MCP_TIMEOUT")
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT);

    Some(McpGatewayConfig {
        url,
        timeout,
        cost_per_million: 0.0,
    })
}
