//! Periodic generator of synthetic metric records.
//!
//! Gives the visualization something to render before any real call has been
//! made. The generator is owned by the process lifecycle: spawned at boot,
//! cancelled on shutdown, never started from request handling.

use std::time::Duration;

use rand::Rng as _;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    record::{MetricRecord, epoch_ms},
    store::MetricsStore,
};

/// Provider name stamped on synthesized records.
pub const DEMO_PROVIDER: &str = "demo";

const DEMO_MODEL: &str = "demo-model";
const DEMO_COST_PER_MILLION: f64 = 0.10;

/// Periodic task appending one synthetic record per tick.
pub struct DemoGenerator {
    store: MetricsStore,
    interval: Duration,
}

impl DemoGenerator {
    /// Create a generator appending to `store` every `interval`.
    pub fn new(store: MetricsStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Spawn the generator loop. It runs until `shutdown` is cancelled.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::debug!("demo metric generator running every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.store.append(synthesize()),
            }
        }

        log::debug!("demo metric generator stopped");
    }
}

/// Synthesize one bounded pseudo-random record.
///
/// Pure apart from the RNG and clock, so tests can single-step the generator
/// without running the loop.
pub fn synthesize() -> MetricRecord {
    let mut rng = rand::thread_rng();

    let latency_ms = rng.gen_range(50..=250) as f64;
    let prompt_tokens = rng.gen_range(0..100);
    let completion_tokens = rng.gen_range(0..150);
    let total_tokens = prompt_tokens + completion_tokens;
    let cost = total_tokens as f64 / 1_000_000.0 * DEMO_COST_PER_MILLION;

    MetricRecord {
        timestamp: epoch_ms(),
        provider: DEMO_PROVIDER.to_string(),
        model: DEMO_MODEL.to_string(),
        latency_ms,
        prompt_tokens,
        completion_tokens,
        total_tokens,
        cost,
        error: None,
    }
}
