pub(crate) mod cerebras;
pub(crate) mod extract;
pub(crate) mod llama;
pub(crate) mod mcp;
pub(crate) mod openrouter;

use async_trait::async_trait;

use crate::messages::Completion;

/// Trait for LLM provider adapters.
///
/// Note for async_trait: the trait must be dyn-compatible for the registry,
/// so plain Rust async trait functions are not enough.
#[async_trait]
pub(crate) trait Provider: Send + Sync {
    /// Send one chat completion request upstream and normalize the reply.
    ///
    /// Adapters never retry and never touch the metrics store; a single
    /// failed attempt surfaces to the caller as the error.
    async fn complete(&self, prompt: &str, model: &str) -> crate::Result<Completion>;

    /// The registry name of this provider.
    fn name(&self) -> &str;

    /// Model used when the caller does not name one.
    fn default_model(&self) -> &str;
}
