//! Plain-text Prometheus exposition of the metrics store.
//!
//! The metric names here are a contract with the visualization layer and any
//! scraper pointed at the endpoint; renaming them breaks dashboards.

use crate::store::MetricsStore;

/// Content type of the exposition, including the format version scrapers
/// negotiate on.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Render the exposition in one pass over the store's grouped view.
pub fn render(store: &MetricsStore) -> String {
    let groups = store.grouped_by_provider_model();
    let mut out = String::new();

    out.push_str("# HELP llm_requests_total Calls attempted, including failures.\n");
    out.push_str("# TYPE llm_requests_total counter\n");
    out.push_str(&format!("llm_requests_total {}\n", store.requests_total()));

    for ((provider, model), stats) in &groups {
        let labels = label_pair(provider, model);

        out.push_str(&format!(
            "llm_requests_total{{{labels},status=\"success\"}} {}\n",
            stats.success_count
        ));
        out.push_str(&format!(
            "llm_requests_total{{{labels},status=\"error\"}} {}\n",
            stats.error_count
        ));
    }

    out.push_str("# HELP llm_errors_total Calls that failed.\n");
    out.push_str("# TYPE llm_errors_total counter\n");
    out.push_str(&format!("llm_errors_total {}\n", store.errors_total()));

    out.push_str("# HELP llm_request_duration_ms Call latency in milliseconds, over retained records.\n");
    out.push_str("# TYPE llm_request_duration_ms gauge\n");

    for ((provider, model), stats) in &groups {
        let labels = label_pair(provider, model);
        let avg = stats.sum_latency_ms / stats.count as f64;

        out.push_str(&format!("llm_request_duration_ms{{{labels},stat=\"avg\"}} {avg}\n"));
        out.push_str(&format!(
            "llm_request_duration_ms{{{labels},stat=\"latest\"}} {}\n",
            stats.latest_latency_ms
        ));
    }

    out.push_str("# HELP llm_request_cost_usd Estimated cost in USD, over retained records.\n");
    out.push_str("# TYPE llm_request_cost_usd gauge\n");

    for ((provider, model), stats) in &groups {
        out.push_str(&format!(
            "llm_request_cost_usd{{{}}} {}\n",
            label_pair(provider, model),
            stats.sum_cost
        ));
    }

    out.push_str("# HELP llm_tokens_total Tokens consumed, over retained records.\n");
    out.push_str("# TYPE llm_tokens_total counter\n");

    for ((provider, model), stats) in &groups {
        out.push_str(&format!(
            "llm_tokens_total{{{}}} {}\n",
            label_pair(provider, model),
            stats.sum_tokens
        ));
    }

    out
}

fn label_pair(provider: &str, model: &str) -> String {
    format!(
        "provider=\"{}\",model=\"{}\"",
        escape_label(provider),
        escape_label(model)
    )
}

/// Escape a label value per the exposition format: backslash, quote, newline.
fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }

    escaped
}
