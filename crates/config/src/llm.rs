//! LLM provider configuration structures.

use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;

/// LLM provider configuration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider used when a call does not name one.
    pub default_provider: String,
    /// Cerebras inference API.
    pub cerebras: ApiProviderConfig,
    /// OpenRouter API.
    pub openrouter: ApiProviderConfig,
    /// Llama API.
    pub llama: ApiProviderConfig,
    /// Optional MCP gateway; the provider is only registered when this
    /// section is present.
    pub mcp: Option<McpGatewayConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: "cerebras".to_string(),
            cerebras: ApiProviderConfig::default(),
            openrouter: ApiProviderConfig::default(),
            llama: ApiProviderConfig::default(),
            mcp: None,
        }
    }
}

/// Configuration for an API-key authenticated provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiProviderConfig {
    /// API key for authentication. A provider without a key is still
    /// registered; calling it fails before any network request is made.
    pub api_key: Option<SecretString>,

    /// Custom base URL for the provider API. Each adapter carries its own
    /// default.
    pub base_url: Option<String>,

    /// Upstream request timeout.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    /// Cost estimate rate in USD per million tokens.
    pub cost_per_million: f64,
}

impl Default for ApiProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            cost_per_million: DEFAULT_COST_PER_MILLION,
        }
    }
}

/// Configuration for the MCP gateway provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McpGatewayConfig {
    /// Base URL of the gateway.
    pub url: String,

    /// Gateway request timeout.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    /// Cost estimate rate in USD per million tokens. The gateway itself does
    /// not bill, so this defaults to zero.
    #[serde(default)]
    pub cost_per_million: f64,
}

/// Upstream timeout applied when none is configured.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cost rate applied when none is configured.
pub(crate) const DEFAULT_COST_PER_MILLION: f64 = 0.10;

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}
