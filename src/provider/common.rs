//! # Common Provider Utilities
//!
//! Operation bookkeeping shared by the secret and configuration paths of the
//! resource store: every remote-facing operation records its outcome on its
//! tracing span and in the operation metrics the same way.

use crate::observability::metrics;
use std::time::{Duration, Instant};
use tracing::Span;

/// Outcome label for an update that needed no remote call
pub const NO_CHANGE: &str = "no_change";

/// Records operation metrics and span attributes for a successful operation
pub fn record_success_metrics(
    span: &Span,
    kind: &str,
    operation_type: &str,
    duration: Duration,
) {
    span.record("operation.type", operation_type);
    span.record(
        "operation.duration_ms",
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
    );
    span.record("operation.success", true);
    metrics::record_operation(kind, operation_type, duration.as_secs_f64());
}

/// Records operation metrics and span attributes for a failed operation
pub fn record_error_metrics(
    span: &Span,
    kind: &str,
    operation_type: &str,
    error_message: &str,
    duration: Duration,
) {
    span.record("operation.success", false);
    span.record("operation.type", operation_type);
    span.record("error.message", error_message);
    span.record(
        "operation.duration_ms",
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
    );
    metrics::increment_operation_errors(kind, operation_type);
}

/// Helper struct for tracking operation state
#[derive(Debug)]
pub struct OperationTracker {
    start: Instant,
    span: Span,
    kind: &'static str,
}

impl OperationTracker {
    /// Start tracking an operation on a resource of `kind`
    pub fn new(span: Span, kind: &'static str) -> Self {
        Self {
            start: Instant::now(),
            span,
            kind,
        }
    }

    pub fn record_success(&self, operation_type: &str) {
        record_success_metrics(&self.span, self.kind, operation_type, self.start.elapsed());
    }

    pub fn record_no_change(&self) {
        record_success_metrics(&self.span, self.kind, NO_CHANGE, self.start.elapsed());
    }

    pub fn record_error(&self, operation_type: &str, error_message: &str) {
        record_error_metrics(
            &self.span,
            self.kind,
            operation_type,
            error_message,
            self.start.elapsed(),
        );
    }

    /// Record the outcome of `result` and pass it through
    pub fn finish<T, E: std::fmt::Display>(
        &self,
        operation_type: &str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        match &result {
            Ok(_) => self.record_success(operation_type),
            Err(e) => self.record_error(operation_type, &e.to_string()),
        }
        result
    }
}
