use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use serde_json::json;

/// Builder for an OpenAI-compatible upstream mock.
///
/// Serves `/chat/completions` for the API providers and `/call` for the
/// gateway provider, answering every request with one configured response.
pub struct OpenAIMock {
    reply: Reply,
    delay: Option<Duration>,
}

#[derive(Clone)]
enum Reply {
    Chat {
        text: String,
        usage: Option<Usage>,
    },
    LegacyText {
        text: String,
    },
    BareResult {
        text: String,
    },
    Error {
        status: u16,
        body: String,
    },
}

#[derive(Clone, Copy)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: Option<u64>,
}

impl Default for OpenAIMock {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAIMock {
    pub fn new() -> Self {
        Self {
            reply: Reply::Chat {
                text: "Hello from the mock model.".to_string(),
                usage: Some(Usage {
                    prompt_tokens: 9,
                    completion_tokens: 12,
                    total_tokens: Some(21),
                }),
            },
            delay: None,
        }
    }

    /// Answer with this completion text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();

        self.reply = match self.reply {
            Reply::Chat { usage, .. } => Reply::Chat { text, usage },
            Reply::LegacyText { .. } => Reply::LegacyText { text },
            Reply::BareResult { .. } => Reply::BareResult { text },
            Reply::Error { .. } => Reply::Chat {
                text,
                usage: None,
            },
        };

        self
    }

    /// Report this usage block.
    pub fn with_usage(mut self, prompt_tokens: u64, completion_tokens: u64, total_tokens: Option<u64>) -> Self {
        if let Reply::Chat { ref mut usage, .. } = self.reply {
            *usage = Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens,
            });
        }

        self
    }

    /// Report no usage block at all, forcing the adapter to estimate.
    pub fn without_usage(mut self) -> Self {
        if let Reply::Chat { ref mut usage, .. } = self.reply {
            *usage = None;
        }

        self
    }

    /// Answer in the legacy `choices[0].text` shape.
    pub fn with_legacy_text_shape(mut self) -> Self {
        self.reply = Reply::LegacyText {
            text: reply_text(&self.reply),
        };

        self
    }

    /// Answer in the bare `result` shape the gateway uses.
    pub fn with_bare_result_shape(mut self) -> Self {
        self.reply = Reply::BareResult {
            text: reply_text(&self.reply),
        };

        self
    }

    /// Answer every request with this status and body.
    pub fn with_error(mut self, status: u16, body: impl Into<String>) -> Self {
        self.reply = Reply::Error {
            status,
            body: body.into(),
        };

        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Bind on a random port and start serving.
    pub async fn spawn(self) -> SpawnedMock {
        let hits = Arc::new(AtomicUsize::new(0));

        let state = MockState {
            reply: self.reply,
            delay: self.delay,
            hits: hits.clone(),
        };

        let router = Router::new()
            .route("/chat/completions", post(respond))
            .route("/call", post(respond))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock upstream");

        let address = listener.local_addr().expect("mock listener has no local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        SpawnedMock {
            url: format!("http://{address}"),
            hits,
        }
    }
}

fn reply_text(reply: &Reply) -> String {
    match reply {
        Reply::Chat { text, .. } | Reply::LegacyText { text } | Reply::BareResult { text } => text.clone(),
        Reply::Error { .. } => "Hello from the mock model.".to_string(),
    }
}

/// Handle to a running mock upstream.
pub struct SpawnedMock {
    /// Base URL to point a provider's `base_url` at.
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl SpawnedMock {
    /// How many requests the mock has served.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
}

async fn respond(State(state): State<MockState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    match &state.reply {
        Reply::Chat { text, usage } => {
            let mut body = json!({
                "choices": [{ "message": { "role": "assistant", "content": text } }]
            });

            if let Some(usage) = usage {
                let mut block = json!({
                    "prompt_tokens": usage.prompt_tokens,
                    "completion_tokens": usage.completion_tokens,
                });

                if let Some(total) = usage.total_tokens {
                    block["total_tokens"] = json!(total);
                }

                body["usage"] = block;
            }

            Json(body).into_response()
        }
        Reply::LegacyText { text } => Json(json!({ "choices": [{ "text": text }] })).into_response(),
        Reply::BareResult { text } => Json(json!({ "result": text })).into_response(),
        Reply::Error { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        }
    }
}
