//! # Convergence Poller
//!
//! Waits for a freshly created resource to leave its transient state.
//!
//! ## Semantics
//!
//! - The first read happens after `initial_delay` (zero by default)
//! - `Ready` stops the wait successfully, `Failed` stops it with an error
//! - `Transient` schedules the next read `interval` later
//! - When the next read would fall on or past `timeout`, the wait gives up
//!   with [`WaitError::Timeout`] carrying the last observed state
//! - A not-found read is an error: the resource vanished mid-wait
//!
//! The loop runs on tokio's clock, so tests drive it with a paused runtime.

use crate::constants::{
    DEFAULT_CREATE_TIMEOUT_SECS, DEFAULT_POLL_INITIAL_DELAY_SECS, DEFAULT_POLL_INTERVAL_SECS,
};
use crate::error::Error;
use crate::model::{LifecycleState, Readiness, SecretAttributes};
use crate::observability::metrics;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Timing of a convergence wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(DEFAULT_POLL_INITIAL_DELAY_SECS),
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_CREATE_TIMEOUT_SECS),
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }
}

/// Anything that reports a lifecycle state
pub trait Observed {
    fn lifecycle_state(&self) -> Option<LifecycleState>;
}

impl Observed for SecretAttributes {
    fn lifecycle_state(&self) -> Option<LifecycleState> {
        SecretAttributes::lifecycle_state(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WaitError<T: fmt::Debug> {
    #[error("{id} still not ready after {elapsed:?} ({reads} reads)")]
    Timeout {
        id: String,
        elapsed: Duration,
        reads: u32,
        last: Option<Box<T>>,
    },

    #[error("{id} entered failed state '{state}'")]
    Failed {
        id: String,
        state: LifecycleState,
        last: Box<T>,
    },

    #[error("{id} disappeared while waiting for it to become ready")]
    NotFoundDuringWait { id: String },

    #[error("reading {id} failed while waiting: {source}")]
    Read {
        id: String,
        #[source]
        source: Box<Error>,
    },
}

impl<T: fmt::Debug> WaitError<T> {
    /// Last observed state, when the wait got that far
    #[must_use]
    pub fn last_observed(&self) -> Option<&T> {
        match self {
            WaitError::Timeout { last, .. } => last.as_deref(),
            WaitError::Failed { last, .. } => Some(last.as_ref()),
            WaitError::NotFoundDuringWait { .. } | WaitError::Read { .. } => None,
        }
    }
}

/// Drives a read closure until the resource settles
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvergencePoller {
    policy: PollPolicy,
}

impl ConvergencePoller {
    #[must_use]
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Poll `read` until the observed state is ready, failed, or the timeout expires
    pub async fn await_ready<T, F, Fut>(&self, id: &str, mut read: F) -> Result<T, WaitError<T>>
    where
        T: Observed + fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::error::Result<T>>,
    {
        let start = Instant::now();
        let deadline = start + self.policy.timeout;

        if !self.policy.initial_delay.is_zero() {
            tokio::time::sleep(self.policy.initial_delay).await;
        }

        let mut reads: u32 = 0;
        loop {
            reads += 1;
            let observed = match read().await {
                Ok(observed) => observed,
                Err(e) if e.is_not_found() => {
                    warn!(id, reads, "Resource vanished during convergence wait");
                    metrics::record_poll("not_found");
                    return Err(WaitError::NotFoundDuringWait { id: id.to_string() });
                }
                Err(e) => {
                    metrics::record_poll("error");
                    return Err(WaitError::Read {
                        id: id.to_string(),
                        source: Box::new(e),
                    });
                }
            };

            let Some(state) = observed.lifecycle_state() else {
                metrics::record_poll("error");
                return Err(WaitError::Read {
                    id: id.to_string(),
                    source: Box::new(Error::codec(
                        "secret",
                        "state",
                        "response carries no lifecycle state",
                    )),
                });
            };

            match state.classify() {
                Readiness::Ready => {
                    debug!(id, reads, state = %state, "Resource is ready");
                    metrics::record_poll("ready");
                    return Ok(observed);
                }
                Readiness::Failed => {
                    warn!(id, reads, state = %state, "Resource entered a failed state");
                    metrics::record_poll("failed");
                    return Err(WaitError::Failed {
                        id: id.to_string(),
                        state,
                        last: Box::new(observed),
                    });
                }
                Readiness::Transient => {
                    debug!(id, reads, state = %state, "Resource not ready yet");
                    metrics::record_poll("transient");
                }
            }

            let next = Instant::now() + self.policy.interval;
            if next >= deadline {
                tokio::time::sleep_until(deadline).await;
                warn!(
                    id,
                    reads,
                    timeout_secs = self.policy.timeout.as_secs(),
                    "Timed out waiting for resource to become ready"
                );
                metrics::record_poll("timeout");
                return Err(WaitError::Timeout {
                    id: id.to_string(),
                    elapsed: start.elapsed(),
                    reads,
                    last: Some(Box::new(observed)),
                });
            }
            tokio::time::sleep_until(next).await;
        }
    }
}
