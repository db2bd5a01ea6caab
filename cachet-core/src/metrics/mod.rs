//! Prometheus Metrics for Cachet
//!
//! Ambient instrumentation for the strategy engine:
//! - Strategy invocations by outcome
//! - DataSource latency per strategy
//! - Write-behind background failures
//! - Cache store degradation events
//! - Invalidated keys
//!
//! The engine's own `StatsCollector` remains the authoritative counter set.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, TextEncoder, register_histogram_vec,
    register_int_counter, register_int_counter_vec,
};

lazy_static! {
    /// Strategy invocations by strategy and result (hit, miss, bypass, accepted, error)
    pub static ref STRATEGY_INVOCATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cachet_strategy_invocations_total",
        "Total number of strategy invocations by result",
        &["strategy", "result"]
    ).unwrap();

    /// DataSource call latency in seconds
    pub static ref DATASOURCE_DURATION: HistogramVec = register_histogram_vec!(
        "cachet_datasource_duration_seconds",
        "DataSource call latency in seconds",
        &["strategy", "kind"],
        vec![0.0001, 0.001, 0.01, 0.1, 1.0, 10.0]
    ).unwrap();

    /// Background write-behind tasks that failed
    pub static ref WRITE_BEHIND_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cachet_write_behind_failures_total",
        "Number of failed asynchronous write-behind updates",
        &["operation"]
    ).unwrap();

    /// Cache store calls that failed and were degraded around
    pub static ref STORE_DEGRADED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cachet_store_degraded_total",
        "Number of cache store calls that failed and were bypassed",
        &["operation"]
    ).unwrap();

    /// Keys removed by pattern invalidation
    pub static ref INVALIDATED_KEYS_TOTAL: IntCounter = register_int_counter!(
        "cachet_invalidated_keys_total",
        "Number of keys removed by pattern invalidation"
    ).unwrap();
}

/// Force registration of every collector
pub fn init() {
    lazy_static::initialize(&STRATEGY_INVOCATIONS_TOTAL);
    lazy_static::initialize(&DATASOURCE_DURATION);
    lazy_static::initialize(&WRITE_BEHIND_FAILURES_TOTAL);
    lazy_static::initialize(&STORE_DEGRADED_TOTAL);
    lazy_static::initialize(&INVALIDATED_KEYS_TOTAL);
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a strategy invocation
pub fn record_invocation(strategy: &str, result: &str) {
    STRATEGY_INVOCATIONS_TOTAL
        .with_label_values(&[strategy, result])
        .inc();
}

/// Record DataSource latency
pub fn record_datasource_call(strategy: &str, kind: &str, duration_secs: f64) {
    DATASOURCE_DURATION
        .with_label_values(&[strategy, kind])
        .observe(duration_secs);
}

/// Record a failed write-behind update
pub fn record_write_behind_failure(operation: &str) {
    WRITE_BEHIND_FAILURES_TOTAL
        .with_label_values(&[operation])
        .inc();
}

/// Record a degraded cache store call
pub fn record_store_degraded(operation: &str) {
    STORE_DEGRADED_TOTAL.with_label_values(&[operation]).inc();
}

/// Record keys removed by invalidation
pub fn record_invalidated(count: usize) {
    INVALIDATED_KEYS_TOTAL.inc_by(count as u64);
}
