//! Relay server library.
//!
//! Provides a reusable server function to serve relay either for the binary,
//! or for the integration tests.

#![deny(missing_docs)]

mod cors;
mod health;

use std::{net::SocketAddr, sync::Arc};

use anyhow::anyhow;
use axum::{Router, routing::get};
use config::Config;
use metrics::{DemoGenerator, MetricsStore};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

/// Configuration for serving relay.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized relay configuration.
    pub config: Config,
}

/// Starts and runs the relay server with the provided configuration.
///
/// The demo metric generator is owned here: spawned before the listener
/// starts accepting and cancelled when the server shuts down. All state is
/// in-memory; a restart starts from an empty store.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> anyhow::Result<()> {
    let registry = Arc::new(llm::Registry::from_config(&config.llm)?);
    let store = MetricsStore::new(config.metrics.max_size);

    let mut app = Router::new()
        .merge(llm::router(registry.clone(), store.clone(), &config.llm))
        .merge(metrics::router(store.clone(), &config.metrics));

    if config.server.health.enabled {
        let providers: Vec<String> = registry.names().iter().map(|name| name.to_string()).collect();

        app = app.route(
            &config.server.health.path,
            get(move || health::health(providers.clone())),
        );
    }

    if config.server.cors_enabled {
        let cors = match &config.server.cors {
            Some(cors_config) => cors::generate(cors_config),
            None => CorsLayer::permissive(),
        };

        app = app.layer(cors);
    }

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    let shutdown = CancellationToken::new();

    let demo_handle = if config.metrics.demo.enabled {
        let generator = DemoGenerator::new(store.clone(), config.metrics.demo.interval);
        Some(generator.spawn(shutdown.child_token()))
    } else {
        None
    };

    log::info!("relay listening at http://{listen_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;

    shutdown.cancel();

    if let Some(handle) = demo_handle {
        let _ = handle.await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
    }

    log::info!("shutting down");
}
