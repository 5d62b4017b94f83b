use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Call errors with their HTTP status and wire error code.
///
/// The rendered messages are operator-facing; they name the failing provider
/// or host so a misconfigured key, a firewalled upstream and a dead gateway
/// can be told apart without reading logs.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider selected but no API key configured. Raised before any
    /// network call is attempted.
    #[error("No API key configured for provider '{0}'. Set the key in the configuration and restart.")]
    ApiKeyMissing(String),

    /// Missing or empty prompt, or otherwise malformed input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider name not present in the registry.
    #[error("Unknown provider '{name}'. Known providers: [{known}]")]
    ProviderNotFound {
        /// The requested name.
        name: String,
        /// Comma-separated registered names.
        known: String,
    },

    /// Upstream answered with a non-2xx status.
    #[error("Provider API error ({status}): {message}")]
    ProviderApi {
        /// Upstream HTTP status.
        status: u16,
        /// Truncated upstream body.
        message: String,
    },

    /// Upstream answered 2xx with a body we could not parse.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Hostname did not resolve.
    #[error("DNS resolution failed reaching {host}")]
    DnsFailure {
        /// The unreachable base URL.
        host: String,
    },

    /// TCP connection was refused.
    #[error("Connection refused by {host}")]
    ConnectionRefused {
        /// The refusing base URL.
        host: String,
    },

    /// Some other transport failure between us and the upstream.
    #[error("Connection error reaching {host}: {message}")]
    Connection {
        /// The base URL we failed to reach.
        host: String,
        /// Rendered transport error.
        message: String,
    },

    /// Upstream did not answer within the configured timeout.
    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),
}

impl LlmError {
    /// The HTTP status `/call` answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ApiKeyMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequest(_) | Self::ProviderNotFound { .. } => StatusCode::BAD_REQUEST,
            Self::ProviderApi { .. } | Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::DnsFailure { .. } | Self::ConnectionRefused { .. } | Self::Connection { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// The `errorCode` string carried in the `/call` error envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ApiKeyMissing(_) => "API_KEY_MISSING",
            Self::InvalidRequest(_) | Self::ProviderNotFound { .. } => "INVALID_REQUEST",
            Self::ProviderApi { .. } | Self::InvalidResponse(_) => "PROVIDER_ERROR",
            Self::DnsFailure { .. } | Self::ConnectionRefused { .. } | Self::Connection { .. } => "NETWORK_ERROR",
            Self::Timeout(_) => "TIMEOUT",
        }
    }

    /// Classify a reqwest transport error by its underlying cause.
    ///
    /// Classification inspects the typed error and the io error kind in its
    /// source chain, never the rendered message: message matching breaks
    /// across network stacks.
    pub(crate) fn from_transport(host: &str, timeout: Duration, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout(timeout);
        }

        if error.is_connect() {
            return match io_error_kind(&error) {
                Some(std::io::ErrorKind::ConnectionRefused) => Self::ConnectionRefused {
                    host: host.to_string(),
                },
                // A connect error that never reached a socket is a resolver
                // failure.
                _ => Self::DnsFailure {
                    host: host.to_string(),
                },
            };
        }

        Self::Connection {
            host: host.to_string(),
            message: error.to_string(),
        }
    }
}

/// Walk an error's source chain for the first io error kind.
fn io_error_kind(error: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    let mut source = error.source();

    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }

        source = current.source();
    }

    None
}

/// Cap a provider-supplied message at `max_chars` characters.
pub(crate) fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        message.to_string()
    } else {
        let cut: String = message.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
