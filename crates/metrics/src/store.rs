use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::record::{AggregateView, MetricRecord};

/// Bounded, append-only store of call metrics.
///
/// The store owns its buffer and counters exclusively; all access goes
/// through these methods. Cloning is cheap and shares the same buffer. The
/// inner mutex is scoped to each operation and is never held across await
/// points, so reads proceed while a call is in flight upstream.
#[derive(Clone)]
pub struct MetricsStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    records: VecDeque<MetricRecord>,
    max_size: usize,
    requests_total: u64,
    errors_total: u64,
}

/// Per (provider, model) summary used to build the Prometheus exposition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStats {
    /// Records observed for this pair.
    pub count: u64,
    /// Records without an error.
    pub success_count: u64,
    /// Records with an error.
    pub error_count: u64,
    /// Sum of latencies in milliseconds.
    pub sum_latency_ms: f64,
    /// Latency of the most recent record, in milliseconds.
    pub latest_latency_ms: f64,
    /// Sum of estimated costs in USD.
    pub sum_cost: f64,
    /// Sum of total token counts.
    pub sum_tokens: u64,
}

/// Aggregates over a rolling window, along with how many records actually
/// contributed to them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateWindow {
    /// The computed aggregates; all zeroes when the store is empty.
    pub view: AggregateView,
    /// Number of records aggregated, at most the requested window size.
    pub sample_size: usize,
}

impl MetricsStore {
    /// Create a store retaining at most `max_size` records.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                records: VecDeque::new(),
                max_size: max_size.max(1),
                requests_total: 0,
                errors_total: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a record, evicting the oldest when the buffer is full.
    ///
    /// The monotonic counters are unaffected by eviction. Never fails.
    pub fn append(&self, record: MetricRecord) {
        let mut inner = self.lock();

        inner.requests_total += 1;

        if record.is_error() {
            inner.errors_total += 1;
        }

        if inner.records.len() == inner.max_size {
            inner.records.pop_front();
        }

        inner.records.push_back(record);
    }

    /// All retained records, oldest first. A snapshot; later appends are not
    /// reflected.
    pub fn get_all(&self) -> Vec<MetricRecord> {
        self.lock().records.iter().cloned().collect()
    }

    /// The most recently appended record, if any.
    pub fn get_latest(&self) -> Option<MetricRecord> {
        self.lock().records.back().cloned()
    }

    /// Up to the last `n` records, oldest first.
    pub fn get_last(&self, n: usize) -> Vec<MetricRecord> {
        let inner = self.lock();
        let skip = inner.records.len().saturating_sub(n);

        inner.records.iter().skip(skip).cloned().collect()
    }

    /// Rolling aggregates over the last `count` records.
    ///
    /// An empty store yields zeroed aggregates with a sample size of zero,
    /// never NaN.
    pub fn aggregates(&self, count: usize) -> AggregateWindow {
        let inner = self.lock();
        let sample = inner.records.len().min(count);

        if sample == 0 {
            return AggregateWindow {
                view: AggregateView::default(),
                sample_size: 0,
            };
        }

        let mut sum_latency = 0.0;
        let mut sum_cost = 0.0;
        let mut errors = 0u64;

        for record in inner.records.iter().skip(inner.records.len() - sample) {
            sum_latency += record.latency_ms;
            sum_cost += record.cost;

            if record.is_error() {
                errors += 1;
            }
        }

        AggregateWindow {
            view: AggregateView {
                avg_latency: sum_latency / sample as f64,
                avg_cost: sum_cost / sample as f64,
                error_rate: errors as f64 / sample as f64,
            },
            sample_size: sample,
        }
    }

    /// One pass over all retained records, grouped by (provider, model).
    ///
    /// The map is ordered so the Prometheus exposition is stable between
    /// scrapes.
    pub fn grouped_by_provider_model(&self) -> BTreeMap<(String, String), GroupStats> {
        let inner = self.lock();
        let mut groups: BTreeMap<(String, String), GroupStats> = BTreeMap::new();

        for record in &inner.records {
            let stats = groups
                .entry((record.provider.clone(), record.model.clone()))
                .or_default();

            stats.count += 1;

            if record.is_error() {
                stats.error_count += 1;
            } else {
                stats.success_count += 1;
            }

            stats.sum_latency_ms += record.latency_ms;
            stats.latest_latency_ms = record.latency_ms;
            stats.sum_cost += record.cost;
            stats.sum_tokens += record.total_tokens;
        }

        groups
    }

    /// Total records ever appended, including evicted ones.
    pub fn requests_total(&self) -> u64 {
        self.lock().requests_total
    }

    /// Total error records ever appended, including evicted ones.
    pub fn errors_total(&self) -> u64 {
        self.lock().errors_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(provider: &str, model: &str, latency_ms: f64, cost: f64, error: Option<&str>) -> MetricRecord {
        MetricRecord {
            timestamp: 0,
            provider: provider.to_string(),
            model: model.to_string(),
            latency_ms,
            prompt_tokens: 10,
            completion_tokens: 20,
            total_tokens: 30,
            cost,
            error: error.map(str::to_string),
        }
    }

    fn numbered(n: u64) -> MetricRecord {
        MetricRecord {
            timestamp: n as i64,
            ..record("cerebras", "llama3.1-8b", 100.0, 0.001, None)
        }
    }

    #[test]
    fn fifo_eviction_keeps_newest() {
        let store = MetricsStore::new(3);

        for n in 0..5 {
            store.append(numbered(n));
        }

        let all = store.get_all();
        let timestamps: Vec<i64> = all.iter().map(|r| r.timestamp).collect();

        assert_eq!(timestamps, vec![2, 3, 4]);
        assert_eq!(store.requests_total(), 5);
    }

    #[test]
    fn retains_fewer_than_capacity() {
        let store = MetricsStore::new(500);

        for n in 0..7 {
            store.append(numbered(n));
        }

        assert_eq!(store.get_all().len(), 7);
    }

    #[test]
    fn latest_and_last() {
        let store = MetricsStore::new(10);
        assert!(store.get_latest().is_none());
        assert!(store.get_last(3).is_empty());

        for n in 0..4 {
            store.append(numbered(n));
        }

        assert_eq!(store.get_latest().unwrap().timestamp, 3);

        let last = store.get_last(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].timestamp, 2);
        assert_eq!(last[1].timestamp, 3);

        assert_eq!(store.get_last(100).len(), 4);
    }

    #[test]
    fn empty_aggregates_are_zero() {
        let store = MetricsStore::new(10);
        let window = store.aggregates(10);

        assert_eq!(window.sample_size, 0);
        assert_eq!(window.view.avg_latency, 0.0);
        assert_eq!(window.view.avg_cost, 0.0);
        assert_eq!(window.view.error_rate, 0.0);
    }

    #[test]
    fn aggregates_over_identical_records() {
        let store = MetricsStore::new(10);

        for _ in 0..5 {
            store.append(record("cerebras", "llama3.1-8b", 120.0, 0.002, None));
        }

        let window = store.aggregates(5);

        assert_eq!(window.sample_size, 5);
        assert_eq!(window.view.avg_latency, 120.0);
        assert_eq!(window.view.avg_cost, 0.002);
        assert_eq!(window.view.error_rate, 0.0);
    }

    #[test]
    fn aggregates_window_is_the_tail() {
        let store = MetricsStore::new(10);

        store.append(record("cerebras", "m", 1000.0, 0.0, Some("boom")));
        store.append(record("cerebras", "m", 100.0, 0.001, None));
        store.append(record("cerebras", "m", 200.0, 0.003, None));

        let window = store.aggregates(2);

        assert_eq!(window.sample_size, 2);
        assert_eq!(window.view.avg_latency, 150.0);
        assert_eq!(window.view.avg_cost, 0.002);
        assert_eq!(window.view.error_rate, 0.0);
    }

    #[test]
    fn error_rate_counts_errors_in_window() {
        let store = MetricsStore::new(10);

        store.append(record("cerebras", "m", 100.0, 0.0, Some("timeout")));
        store.append(record("cerebras", "m", 100.0, 0.0, None));

        let window = store.aggregates(10);

        assert_eq!(window.sample_size, 2);
        assert_eq!(window.view.error_rate, 0.5);
        assert_eq!(store.errors_total(), 1);
    }

    #[test]
    fn reads_are_idempotent() {
        let store = MetricsStore::new(10);

        store.append(record("cerebras", "m", 100.0, 0.001, None));
        store.append(record("llama", "m2", 50.0, 0.002, Some("boom")));

        assert_eq!(store.get_all(), store.get_all());
        assert_eq!(store.aggregates(10), store.aggregates(10));
        assert_eq!(store.grouped_by_provider_model(), store.grouped_by_provider_model());
    }

    #[test]
    fn grouping_by_provider_and_model() {
        let store = MetricsStore::new(10);

        store.append(record("cerebras", "m", 100.0, 0.001, None));
        store.append(record("cerebras", "m", 300.0, 0.003, Some("boom")));
        store.append(record("llama", "m2", 50.0, 0.002, None));

        let groups = store.grouped_by_provider_model();
        assert_eq!(groups.len(), 2);

        let cerebras = &groups[&("cerebras".to_string(), "m".to_string())];
        assert_eq!(cerebras.count, 2);
        assert_eq!(cerebras.success_count, 1);
        assert_eq!(cerebras.error_count, 1);
        assert_eq!(cerebras.sum_latency_ms, 400.0);
        assert_eq!(cerebras.latest_latency_ms, 300.0);
        assert_eq!(cerebras.sum_tokens, 60);

        let llama = &groups[&("llama".to_string(), "m2".to_string())];
        assert_eq!(llama.count, 1);
        assert_eq!(llama.error_count, 0);
    }

    #[test]
    fn concurrent_appends_lose_nothing() {
        let store = MetricsStore::new(1000);
        let mut handles = Vec::new();

        for n in 0..8 {
            let store = store.clone();

            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    store.append(numbered(n * 50 + i));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.requests_total(), 400);
        assert_eq!(store.get_all().len(), 400);
    }

    #[test]
    fn zero_capacity_still_retains_one() {
        let store = MetricsStore::new(0);

        store.append(numbered(1));
        store.append(numbered(2));

        assert_eq!(store.get_all().len(), 1);
        assert_eq!(store.get_latest().unwrap().timestamp, 2);
    }
}
