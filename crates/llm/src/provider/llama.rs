use std::time::Instant;

use anyhow::Context as _;
use async_trait::async_trait;
use config::ApiProviderConfig;
use reqwest::{Client, header::AUTHORIZATION};
use secrecy::ExposeSecret;
use serde_json::Value;

use crate::{
    error::{LlmError, truncate},
    messages::{ChatPayload, Completion},
    provider::{
        Provider,
        extract::{self, TextPath},
    },
};

const DEFAULT_LLAMA_API_URL: &str = "https://api.llama.com/compat/v1";
const DEFAULT_LLAMA_MODEL: &str = "Llama-3.3-70B-Instruct";

/// The Llama API speaks the OpenAI chat shape on its compat endpoint but has
/// been seen answering with a responses-style body, so that shape is the
/// last fallback.
const TEXT_PATHS: &[TextPath] = &[
    TextPath::ChoicesMessageContent,
    TextPath::ChoicesText,
    TextPath::OutputContent,
];

const MAX_ERROR_BODY_CHARS: usize = 300;

pub(crate) struct LlamaProvider {
    client: Client,
    base_url: String,
    config: ApiProviderConfig,
}

impl LlamaProvider {
    pub(crate) fn new(config: ApiProviderConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to create HTTP client for Llama provider")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_LLAMA_API_URL.to_string());

        Ok(Self {
            client,
            base_url,
            config,
        })
    }
}

#[async_trait]
impl Provider for LlamaProvider {
    async fn complete(&self, prompt: &str, model: &str) -> crate::Result<Completion> {
        let Some(key) = self.config.api_key.as_ref() else {
            return Err(LlmError::ApiKeyMissing(self.name().to_string()));
        };

        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatPayload::user(model, prompt);

        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", key.expose_secret()))
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&self.base_url, self.config.timeout, e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Llama API error ({status}): {body}");

            return Err(LlmError::ProviderApi {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::from_transport(&self.base_url, self.config.timeout, e))?;

        let latency = started.elapsed();

        let body: Value = sonic_rs::from_str(&body).map_err(|e| {
            log::error!("Failed to parse Llama response: {e}");
            LlmError::InvalidResponse(format!("unparseable Llama response: {e}"))
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
        "llama"
    }

    fn default_model(&self) -> &str {
        DEFAULT_LLAMA_MODEL
    }
}
