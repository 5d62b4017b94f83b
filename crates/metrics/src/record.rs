use serde::{Deserialize, Serialize};

/// One immutable observation of a single call attempt, success or failure.
///
/// Serialized field names are the wire contract consumed by the visualization
/// layer, hence the camelCase rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    /// Creation time in epoch milliseconds, set once at append time.
    pub timestamp: i64,
    /// Provider identifier, e.g. "cerebras" or "demo".
    pub provider: String,
    /// Model identifier the call was made with.
    pub model: String,
    /// Wall-clock duration of the upstream call in milliseconds.
    pub latency_ms: f64,
    /// Tokens in the prompt, provider-reported or estimated.
    pub prompt_tokens: u64,
    /// Tokens in the completion, provider-reported or estimated.
    pub completion_tokens: u64,
    /// Provider-reported total when present, prompt + completion otherwise.
    pub total_tokens: u64,
    /// Estimated cost in USD.
    pub cost: f64,
    /// Human-readable failure message; `None` means the call succeeded.
    pub error: Option<String>,
}

impl MetricRecord {
    /// Whether this record observed a failed call.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Rolling aggregates over the most recent records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    /// Mean latency over the window, in milliseconds.
    pub avg_latency: f64,
    /// Mean cost over the window, in USD.
    pub avg_cost: f64,
    /// Fraction of records in the window that carry an error.
    pub error_rate: f64,
}

/// Current time in epoch milliseconds.
pub fn epoch_ms() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}
