//! Test harness: spawns a real relay server on a random port and talks to it
//! over HTTP, with mock upstream providers standing in for the real APIs.

pub mod llms;

use std::{net::SocketAddr, time::Duration};

use config::Config;
use server::ServeConfig;

/// Test client for making HTTP requests to the test server
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a POST request to the given path with JSON body
    pub async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    async fn try_get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(format!("{}{}", self.base_url, path)).send().await
    }
}

/// A relay server running on a random local port.
pub struct TestServer {
    /// Client pointed at the server.
    pub client: TestClient,
    /// The address the server is listening on.
    pub address: SocketAddr,
}

impl TestServer {
    /// Spawn a server from a TOML configuration string and wait until it
    /// answers on its health endpoint.
    ///
    /// Tests keep the demo generator disabled unless they exercise it, so
    /// record counts stay deterministic.
    pub async fn spawn(config_toml: &str) -> Self {
        let config: Config = toml::from_str(config_toml).expect("invalid test configuration");
        Self::spawn_with_config(config).await
    }

    /// Spawn a server from an already built configuration.
    pub async fn spawn_with_config(config: Config) -> Self {
        let address = free_port_address().await;

        tokio::spawn(server::serve(ServeConfig {
            listen_address: address,
            config,
        }));

        let client = TestClient::new(format!("http://{address}"));
        wait_until_ready(&client).await;

        Self { client, address }
    }
}

async fn free_port_address() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind a local port");

    let address = listener.local_addr().expect("listener has no local address");
    drop(listener);

    address
}

async fn wait_until_ready(client: &TestClient) {
    // The metrics read routes are always mounted, unlike /health.
    for _ in 0..100 {
        if let Ok(response) = client.try_get("/metrics/all").await
            && response.status().is_success()
        {
            return;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("server did not become ready in time");
}
