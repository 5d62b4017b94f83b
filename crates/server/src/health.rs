use axum::Json;
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum HealthStatus {
    /// Indicates that the server is healthy and operational.
    Healthy,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) ok: bool,
    pub(crate) status: HealthStatus,
    pub(crate) providers: Vec<String>,
    pub(crate) timestamp: i64,
}

/// Handles health check requests: reports the registered providers and the
/// current time so pollers can tell a stale response from a live one.
pub(crate) async fn health(providers: Vec<String>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        ok: true,
        status: HealthStatus::Healthy,
        providers,
        timestamp: metrics::epoch_ms(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shape() {
        let response = HealthResponse {
            ok: true,
            status: HealthStatus::Healthy,
            providers: vec!["cerebras".to_string(), "llama".to_string()],
            timestamp: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["providers"][0], "cerebras");
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
    }
}
