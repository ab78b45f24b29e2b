// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the k8gb synchronization controller.
//!
//! All metrics carry the namespace prefix `k8gb_sync_`.
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Passes by outcome and their duration
//! - **Delegation Metrics** - `DNSEndpoint` writes and deletions
//! - **Split-Brain Metrics** - Freshness check outcomes
//! - **Peer Metrics** - Peer target resolution failures
//!
//! # Example
//!
//! ```rust,no_run
//! use k8gb_sync::metrics::record_reconciliation;
//!
//! record_reconciliation("Gslb", "requeue_delay", std::time::Duration::from_millis(120));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "k8gb_sync";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry, exposed via the `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliation passes by resource type and outcome
///
/// Labels:
/// - `resource_type`: Kind of resource (e.g., `Gslb`)
/// - `outcome`: `stop`, `requeue_delay`, `requeue_delay_with_error`, `requeue_now_with_error`
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliation passes by resource type and outcome",
    );
    let counter = CounterVec::new(opts, &["resource_type", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliation passes in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliation passes in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of errors by resource type and reason code
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by resource type and reason",
    );
    let counter = CounterVec::new(opts, &["resource_type", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Delegation Metrics
// ============================================================================

/// Total number of `DNSEndpoint` writes
///
/// Labels:
/// - `name`: `DNSEndpoint` name (`k8gb-ns-<provider>`)
/// - `operation`: `created`, `updated`, `deleted`
pub static DNS_ENDPOINT_WRITES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_dns_endpoint_writes_total"),
        "Total number of DNSEndpoint writes by name and operation",
    );
    let counter = CounterVec::new(opts, &["name", "operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Split-Brain / Peer Metrics
// ============================================================================

/// Split-brain freshness checks by provider and result (`fresh`, `stale`)
pub static SPLIT_BRAIN_CHECKS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_split_brain_checks_total"),
        "Total number of split brain freshness checks by provider and result",
    );
    let counter = CounterVec::new(opts, &["provider", "result"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Peer target resolutions that failed part way
pub static PEER_RESOLUTION_FAILURES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_peer_resolution_failures_total"),
        "Total number of failed peer target resolutions by provider",
    );
    let counter = CounterVec::new(opts, &["provider"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Recording Helpers
// ============================================================================

/// Record one reconciliation pass
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled (e.g., `Gslb`)
/// * `outcome` - Scheduling decision taken for the pass
/// * `duration` - Duration of the pass
pub fn record_reconciliation(resource_type: &str, outcome: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, outcome])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record an error by its reason code
pub fn record_error(resource_type: &str, reason: &str) {
    ERRORS_TOTAL.with_label_values(&[resource_type, reason]).inc();
}

/// Record a `DNSEndpoint` write
pub fn record_dns_endpoint_write(name: &str, operation: &str) {
    DNS_ENDPOINT_WRITES_TOTAL
        .with_label_values(&[name, operation])
        .inc();
}

/// Record a split-brain check outcome
pub fn record_split_brain_check(provider: &str, fresh: bool) {
    let result = if fresh { "fresh" } else { "stale" };
    SPLIT_BRAIN_CHECKS_TOTAL
        .with_label_values(&[provider, result])
        .inc();
}

/// Record a failed peer target resolution
pub fn record_peer_resolution_failure(provider: &str) {
    PEER_RESOLUTION_FAILURES_TOTAL
        .with_label_values(&[provider])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
