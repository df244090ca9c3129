//! # Metrics
//!
//! Prometheus metrics for the provider.
//!
//! ## Metrics Exposed
//!
//! - `secrets_manager_operations_total` - Successful facade operations by kind and operation
//! - `secrets_manager_operation_errors_total` - Failed facade operations by kind and operation
//! - `secrets_manager_operation_duration_seconds` - Duration of facade operations
//! - `secrets_manager_convergence_polls_total` - Convergence reads by outcome

use anyhow::Result;
use prometheus::{Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secrets_manager_operations_total",
            "Total number of secrets-manager operations",
        ),
        &["kind", "operation"],
    )
    .expect("Failed to create OPERATIONS_TOTAL metric - this should never happen")
});

static OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secrets_manager_operation_errors_total",
            "Total number of failed secrets-manager operations",
        ),
        &["kind", "operation"],
    )
    .expect("Failed to create OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "secrets_manager_operation_duration_seconds",
            "Duration of secrets-manager operations in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 120.0, 600.0]),
        &["kind", "operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

static CONVERGENCE_POLLS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secrets_manager_convergence_polls_total",
            "Total number of convergence reads by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create CONVERGENCE_POLLS_TOTAL metric - this should never happen")
});

/// Register all metrics with the crate registry
///
/// # Errors
/// Fails when called twice, since prometheus rejects duplicate collectors
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(CONVERGENCE_POLLS_TOTAL.clone()))?;
    Ok(())
}

/// Record one successful operation and its duration
pub fn record_operation(kind: &str, operation: &str, duration: f64) {
    OPERATIONS_TOTAL
        .with_label_values(&[kind, operation])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[kind, operation])
        .observe(duration);
}

pub fn increment_operation_errors(kind: &str, operation: &str) {
    OPERATION_ERRORS_TOTAL
        .with_label_values(&[kind, operation])
        .inc();
}

pub fn record_poll(outcome: &str) {
    CONVERGENCE_POLLS_TOTAL.with_label_values(&[outcome]).inc();
}

#[cfg(test)]
pub(crate) fn poll_count(outcome: &str) -> u64 {
    CONVERGENCE_POLLS_TOTAL.with_label_values(&[outcome]).get()
}

/// Render the registry in the Prometheus text exposition format
///
/// # Errors
/// Returns an error if encoding fails
pub fn gather_text() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_labelled() {
        let before = OPERATIONS_TOTAL
            .with_label_values(&["kv", "create"])
            .get();
        record_operation("kv", "create", 0.25);
        assert_eq!(
            OPERATIONS_TOTAL.with_label_values(&["kv", "create"]).get(),
            before + 1
        );

        let polls = CONVERGENCE_POLLS_TOTAL.with_label_values(&["timeout"]).get();
        record_poll("timeout");
        assert_eq!(
            CONVERGENCE_POLLS_TOTAL.with_label_values(&["timeout"]).get(),
            polls + 1
        );
    }
}
