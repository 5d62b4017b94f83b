//! Metrics store and exposition configuration.

use std::{borrow::Cow, time::Duration};

use duration_str::deserialize_duration;
use serde::Deserialize;

/// Metrics store and exposition configuration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Maximum number of records the store retains before evicting the
    /// oldest.
    pub max_size: usize,
    /// Demo record generator configuration.
    pub demo: DemoConfig,
    /// Prometheus text exposition configuration.
    pub prometheus: PrometheusConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            max_size: 500,
            demo: DemoConfig::default(),
            prometheus: PrometheusConfig::default(),
        }
    }
}

/// Configuration of the periodic demo record generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Whether the generator runs at all.
    pub enabled: bool,
    /// Interval between synthesized records.
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_millis(3000),
        }
    }
}

/// Configuration of the Prometheus text exposition endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Whether the endpoint is exposed.
    pub enabled: bool,
    /// The path the exposition is served from.
    pub path: Cow<'static, str>,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: Cow::Borrowed("/metrics"),
        }
    }
}
