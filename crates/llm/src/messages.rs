use std::time::Duration;

use metrics::MetricRecord;
use serde::{Deserialize, Serialize};

/// Body of a `POST /call` request.
///
/// `prompt` is optional at the deserialization layer so that a missing
/// prompt is our own invalid-request answer, not a framework rejection.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CallRequest {
    pub(crate) provider: Option<String>,
    pub(crate) prompt: Option<String>,
    pub(crate) model: Option<String>,
}

/// Envelope of a successful call.
#[derive(Debug, Serialize)]
pub(crate) struct CallResponse {
    pub(crate) ok: bool,
    pub(crate) metrics: MetricRecord,
    pub(crate) output: String,
    pub(crate) provider: String,
    pub(crate) model: String,
}

/// Envelope of a failed call. The record carries the same error message so
/// error-rate aggregates stay accurate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CallErrorResponse {
    pub(crate) ok: bool,
    pub(crate) metrics: MetricRecord,
    pub(crate) error: String,
    pub(crate) error_code: &'static str,
}

/// Normalized result of one upstream completion call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Completion {
    pub(crate) text: String,
    pub(crate) prompt_tokens: u64,
    pub(crate) completion_tokens: u64,
    pub(crate) total_tokens: u64,
    pub(crate) cost: f64,
    pub(crate) latency: Duration,
}

/// Token usage block as reported by a provider.
///
/// Counts default to zero on partial blocks; the total stays optional so we
/// can tell a reported total apart from an absent one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub(crate) prompt_tokens: u64,
    #[serde(default)]
    pub(crate) completion_tokens: u64,
    #[serde(default)]
    pub(crate) total_tokens: Option<u64>,
}

/// Chat completion payload in the OpenAI-compatible wire format all our
/// API providers accept.
#[derive(Debug, Serialize)]
pub(crate) struct ChatPayload<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: Vec<ChatMessage<'a>>,
}

/// Single chat message.
#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

impl<'a> ChatPayload<'a> {
    /// Payload with the prompt as a single user message.
    pub(crate) fn user(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}
