use config::LlmConfig;
use itertools::Itertools as _;

use crate::{
    error::LlmError,
    provider::{
        Provider, cerebras::CerebrasProvider, llama::LlamaProvider, mcp::McpGatewayProvider,
        openrouter::OpenRouterProvider,
    },
};

/// Maps provider names to adapters.
///
/// Providers are registered in a fixed order; that order is what `/health`
/// reports. A provider without an API key is still registered so that calling
/// it produces the missing-key diagnostic instead of an unknown-provider one.
pub struct Registry {
    providers: Vec<Box<dyn Provider>>,
}

impl Registry {
    /// Build the registry from configuration. The MCP gateway is only
    /// registered when a gateway section is configured.
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Self> {
        let mut providers: Vec<Box<dyn Provider>> = vec![
            Box::new(CerebrasProvider::new(config.cerebras.clone())?),
            Box::new(OpenRouterProvider::new(config.openrouter.clone())?),
            Box::new(LlamaProvider::new(config.llama.clone())?),
        ];

        if let Some(mcp) = &config.mcp {
            providers.push(Box::new(McpGatewayProvider::new(mcp.clone())?));
        }

        log::debug!("provider registry initialized with {} provider(s)", providers.len());

        Ok(Self { providers })
    }

    pub(crate) fn get(&self, name: &str) -> crate::Result<&dyn Provider> {
        self.providers
            .iter()
            .find(|provider| provider.name() == name)
            .map(|provider| &**provider)
            .ok_or_else(|| LlmError::ProviderNotFound {
                name: name.to_string(),
                known: self.providers.iter().map(|provider| provider.name()).join(", "),
            })
    }

    /// Registered provider names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }
}
