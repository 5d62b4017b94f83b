//! Normalization of heterogeneous provider response bodies.
//!
//! Providers nest the completion text differently. Each adapter declares the
//! known locations for its upstream as an ordered list of [`TextPath`]
//! strategies; the first that matches wins, and none matching yields an empty
//! string. Token counts come from the provider's usage block when it reports
//! one and from a word-count estimate otherwise.

use std::time::Duration;

use serde_json::Value;

use crate::messages::{Completion, Usage};

/// A known location for completion text in a provider response body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TextPath {
    /// `choices[0].message.content`, the chat completion shape.
    ChoicesMessageContent,
    /// `choices[0].text`, the legacy completion shape.
    ChoicesText,
    /// `output[0].content`, the responses shape.
    OutputContent,
    /// A bare top-level `result` field.
    Result,
}

impl TextPath {
    fn get(self, body: &Value) -> Option<&str> {
        match self {
            Self::ChoicesMessageContent => body
                .get("choices")?
                .get(0)?
                .get("message")?
                .get("content")?
                .as_str(),
            Self::ChoicesText => body.get("choices")?.get(0)?.get("text")?.as_str(),
            Self::OutputContent => body.get("output")?.get(0)?.get("content")?.as_str(),
            Self::Result => body.get("result")?.as_str(),
        }
    }
}

/// Extract the completion text, trying `paths` in order.
pub(crate) fn completion_text(body: &Value, paths: &[TextPath]) -> String {
    paths
        .iter()
        .find_map(|path| path.get(body))
        .unwrap_or_default()
        .to_string()
}

/// The provider-reported usage block, when the body carries one.
pub(crate) fn usage(body: &Value) -> Option<Usage> {
    let block = body.get("usage")?;
    serde_json::from_value(block.clone()).ok()
}

/// Deterministic token estimate for text without provider-reported usage.
pub(crate) fn estimate_tokens(text: &str) -> u64 {
    (text.split_whitespace().count() as f64 * 1.3).ceil() as u64
}

/// Build a [`Completion`] from a parsed 2xx response body.
///
/// The provider-reported total wins when present, even if it disagrees with
/// prompt + completion; otherwise the sum is used.
pub(crate) fn normalize(
    prompt: &str,
    body: &Value,
    paths: &[TextPath],
    cost_per_million: f64,
    latency: Duration,
) -> Completion {
    let text = completion_text(body, paths);

    let (prompt_tokens, completion_tokens, reported_total) = match usage(body) {
        Some(usage) => (usage.prompt_tokens, usage.completion_tokens, usage.total_tokens),
        None => (estimate_tokens(prompt), estimate_tokens(&text), None),
    };

    let total_tokens = reported_total.unwrap_or(prompt_tokens + completion_tokens);
    let cost = total_tokens as f64 / 1_000_000.0 * cost_per_million;

    Completion {
        text,
        prompt_tokens,
        completion_tokens,
        total_tokens,
        cost,
        latency,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const CHAT_PATHS: &[TextPath] = &[TextPath::ChoicesMessageContent, TextPath::ChoicesText];

    #[test]
    fn chat_shape_wins() {
        let body = json!({
            "choices": [{ "message": { "content": "hi there" }, "text": "legacy" }]
        });

        assert_eq!(completion_text(&body, CHAT_PATHS), "hi there");
    }

    #[test]
    fn falls_through_to_legacy_shape() {
        let body = json!({ "choices": [{ "text": "legacy" }] });

        assert_eq!(completion_text(&body, CHAT_PATHS), "legacy");
    }

    #[test]
    fn output_and_result_shapes() {
        let output = json!({ "output": [{ "content": "from output" }] });
        let result = json!({ "result": "from result" });
        let paths = &[TextPath::Result, TextPath::OutputContent];

        assert_eq!(completion_text(&output, paths), "from output");
        assert_eq!(completion_text(&result, paths), "from result");
    }

    #[test]
    fn order_is_respected() {
        let body = json!({ "result": "bare", "output": [{ "content": "nested" }] });

        assert_eq!(completion_text(&body, &[TextPath::Result, TextPath::OutputContent]), "bare");
        assert_eq!(completion_text(&body, &[TextPath::OutputContent, TextPath::Result]), "nested");
    }

    #[test]
    fn no_shape_matches_yields_empty() {
        let body = json!({ "unexpected": true });

        assert_eq!(completion_text(&body, CHAT_PATHS), "");
    }

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("one"), 2); // ceil(1 * 1.3)
        assert_eq!(estimate_tokens("one two three"), 4); // ceil(3 * 1.3)
        assert_eq!(estimate_tokens("a b c d e f g h i j"), 13); // ceil(10 * 1.3)
    }

    #[test]
    fn normalize_prefers_reported_usage() {
        let body = json!({
            "choices": [{ "message": { "content": "out" } }],
            "usage": { "prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 11 }
        });

        let completion = normalize("in", &body, CHAT_PATHS, 2.0, Duration::from_millis(100));

        assert_eq!(completion.prompt_tokens, 7);
        assert_eq!(completion.completion_tokens, 3);
        // reported total wins even though it disagrees with the sum
        assert_eq!(completion.total_tokens, 11);
        assert_eq!(completion.cost, 11.0 / 1_000_000.0 * 2.0);
    }

    #[test]
    fn normalize_sums_when_total_absent() {
        let body = json!({
            "choices": [{ "message": { "content": "out" } }],
            "usage": { "prompt_tokens": 7, "completion_tokens": 3 }
        });

        let completion = normalize("in", &body, CHAT_PATHS, 1.0, Duration::ZERO);

        assert_eq!(completion.total_tokens, 10);
    }

    #[test]
    fn normalize_estimates_without_usage() {
        let body = json!({
            "choices": [{ "message": { "content": "three word reply" } }]
        });

        let completion = normalize("two words", &body, CHAT_PATHS, 1.0, Duration::ZERO);

        assert_eq!(completion.prompt_tokens, 3); // ceil(2 * 1.3)
        assert_eq!(completion.completion_tokens, 4); // ceil(3 * 1.3)
        assert_eq!(completion.total_tokens, 7);
    }
}
