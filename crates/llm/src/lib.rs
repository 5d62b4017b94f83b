//! Provider adapters, the provider registry and the `/call` endpoint.
//!
//! The `/call` handler is the error boundary of the whole call path: every
//! outcome, success or failure, appends exactly one record to the metrics
//! store, so error-rate aggregates stay accurate.

use std::{sync::Arc, time::Instant};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use config::LlmConfig;
use metrics::{MetricRecord, MetricsStore, epoch_ms};

mod error;
mod messages;
mod provider;
mod registry;

pub use error::LlmError;
use messages::{CallErrorResponse, CallRequest, CallResponse, Completion};
pub use registry::Registry;

pub(crate) type Result<T> = std::result::Result<T, LlmError>;

/// Creates an axum router for the call endpoint.
pub fn router(registry: Arc<Registry>, store: MetricsStore, config: &LlmConfig) -> Router {
    let state = CallState {
        registry,
        store,
        default_provider: config.default_provider.clone(),
    };

    Router::new().route("/call", post(call)).with_state(state)
}

#[derive(Clone)]
struct CallState {
    registry: Arc<Registry>,
    store: MetricsStore,
    default_provider: String,
}

/// Handle a call request: resolve the adapter, time the upstream round trip,
/// record the outcome.
async fn call(State(state): State<CallState>, Json(request): Json<CallRequest>) -> Response {
    let provider = request
        .provider
        .clone()
        .unwrap_or_else(|| state.default_provider.clone());

    let prompt = request.prompt.clone().unwrap_or_default();

    log::info!("call requested for provider '{provider}'");

    let started = Instant::now();
    let (model, outcome) = invoke(&state, &provider, &prompt, request.model.as_deref()).await;

    match outcome {
        Ok(completion) => {
            let record = MetricRecord {
                timestamp: epoch_ms(),
                provider: provider.clone(),
                model: model.clone(),
                latency_ms: completion.latency.as_secs_f64() * 1000.0,
                prompt_tokens: completion.prompt_tokens,
                completion_tokens: completion.completion_tokens,
                total_tokens: completion.total_tokens,
                cost: completion.cost,
                error: None,
            };

            state.store.append(record.clone());

            let response = CallResponse {
                ok: true,
                metrics: record,
                output: completion.text,
                provider,
                model,
            };

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(error) => {
            log::warn!("call to provider '{provider}' failed: {error}");

            let message = error.to_string();

            let record = MetricRecord {
                timestamp: epoch_ms(),
                provider,
                model,
                latency_ms: started.elapsed().as_secs_f64() * 1000.0,
                prompt_tokens: 0,
                completion_tokens: 0,
                total_tokens: 0,
                cost: 0.0,
                error: Some(message.clone()),
            };

            state.store.append(record.clone());

            let response = CallErrorResponse {
                ok: false,
                metrics: record,
                error: message,
                error_code: error.error_code(),
            };

            (error.status_code(), Json(response)).into_response()
        }
    }
}

/// Resolve provider and model, then run the upstream call.
///
/// The resolved model is returned alongside the outcome so a failed call
/// still produces a fully attributed metric record.
async fn invoke(
    state: &CallState,
    provider_name: &str,
    prompt: &str,
    requested_model: Option<&str>,
) -> (String, Result<Completion>) {
    let provider = match state.registry.get(provider_name) {
        Ok(provider) => provider,
        Err(error) => {
            return (requested_model.unwrap_or("unknown").to_string(), Err(error));
        }
    };

    let model = requested_model.unwrap_or_else(|| provider.default_model()).to_string();

    if prompt.trim().is_empty() {
        let error = LlmError::InvalidRequest("prompt must be a non-empty string".to_string());
        return (model, Err(error));
    }

    let outcome = provider.complete(prompt, &model).await;
    (model, outcome)
}
