//! Bounded in-memory metrics store, rolling aggregates, Prometheus text
//! exposition, and the HTTP read surface over them.
//!
//! Everything here is process-local: the store is lost on restart by design.

#![deny(missing_docs)]

mod demo;
mod prometheus;
mod record;
mod store;

pub use demo::{DEMO_PROVIDER, DemoGenerator, synthesize};
pub use prometheus::{PROMETHEUS_CONTENT_TYPE, render};
pub use record::{AggregateView, MetricRecord, epoch_ms};
pub use store::{AggregateWindow, GroupStats, MetricsStore};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::get,
};
use config::MetricsConfig;
use serde::{Deserialize, Serialize};

/// Window size used when `/metrics/aggregates` is queried without a count.
const DEFAULT_AGGREGATE_WINDOW: usize = 10;

/// Creates an axum router for the metrics read endpoints.
///
/// All routes are pure reads over the store; none of them mutates state or
/// performs network I/O.
pub fn router(store: MetricsStore, config: &MetricsConfig) -> Router {
    let mut router = Router::new()
        .route("/metrics/latest", get(latest))
        .route("/metrics/all", get(all))
        .route("/metrics/aggregates", get(aggregates));

    if config.prometheus.enabled {
        router = router.route(config.prometheus.path.as_ref(), get(exposition));
    }

    router.with_state(store)
}

#[derive(Serialize)]
struct LatestResponse {
    ok: bool,
    metrics: Option<MetricRecord>,
}

async fn latest(State(store): State<MetricsStore>) -> Json<LatestResponse> {
    Json(LatestResponse {
        ok: true,
        metrics: store.get_latest(),
    })
}

#[derive(Serialize)]
struct AllResponse {
    ok: bool,
    metrics: Vec<MetricRecord>,
    count: usize,
}

async fn all(State(store): State<MetricsStore>) -> Json<AllResponse> {
    let metrics = store.get_all();
    let count = metrics.len();

    Json(AllResponse { ok: true, metrics, count })
}

#[derive(Deserialize)]
struct AggregateParams {
    count: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AggregatesResponse {
    ok: bool,
    aggregates: AggregateView,
    sample_size: usize,
}

async fn aggregates(
    State(store): State<MetricsStore>,
    Query(params): Query<AggregateParams>,
) -> Json<AggregatesResponse> {
    let window = store.aggregates(params.count.unwrap_or(DEFAULT_AGGREGATE_WINDOW));

    Json(AggregatesResponse {
        ok: true,
        aggregates: window.view,
        sample_size: window.sample_size,
    })
}

async fn exposition(State(store): State<MetricsStore>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], prometheus::render(&store))
}
