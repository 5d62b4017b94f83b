use std::time::Instant;

use anyhow::Context as _;
use async_trait::async_trait;
use config::McpGatewayConfig;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::{LlmError, truncate},
    messages::{ChatPayload, Completion},
    provider::{
        Provider,
        extract::{self, TextPath},
    },
};

const DEFAULT_MCP_MODEL: &str = "default";

/// The gateway answers with a bare `result` for simple forwards and relays
/// the provider body untouched otherwise.
const TEXT_PATHS: &[TextPath] = &[
    TextPath::Result,
    TextPath::OutputContent,
    TextPath::ChoicesMessageContent,
];

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Forwards calls through an MCP gateway. The gateway holds the provider
/// credentials, so this adapter authenticates with nothing.
pub(crate) struct McpGatewayProvider {
    client: Client,
    config: McpGatewayConfig,
}

impl McpGatewayProvider {
    pub(crate) fn new(config: McpGatewayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to create HTTP client for MCP gateway provider")?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Provider for McpGatewayProvider {
    async fn complete(&self, prompt: &str, model: &str) -> crate::Result<Completion> {
        let url = format!("{}/call", self.config.url.trim_end_matches('/'));
        let payload = ChatPayload::user(model, prompt);

        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&self.config.url, self.config.timeout, e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("MCP gateway error ({status}): {body}");

            return Err(LlmError::ProviderApi {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::from_transport(&self.config.url, self.config.timeout, e))?;

        let latency = started.elapsed();

        let body: Value = sonic_rs::from_str(&body).map_err(|e| {
            log::error!("Failed to parse MCP gateway response: {e}");
            LlmError::InvalidResponse(format!("unparseable MCP gateway response: {e}"))
        })?;

        Ok(extract::normalize(
            prompt,
            &body,
            TEXT_PATHS,
            self.config.cost_per_million,
            latency,
        ))
    }

    fn name(&self) -> &str {
        "mcp"
    }

    fn default_model(&self) -> &str {
        DEFAULT_MCP_MODEL
    }
}
