//! Point-in-time snapshots of breaker and health state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ErrorKind;

/// Circuit breaker gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    /// Normal operation; failures are counted.
    Closed,
    /// Calls are rejected until the cooldown elapses.
    Open,
    /// One probe call is admitted to test recovery.
    HalfOpen,
}

impl CircuitState {
    /// Stable identifier for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        }
    }
}

/// Snapshot of a single provider's circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerMetrics {
    /// Current gate state.
    pub state: CircuitState,
    /// Consecutive failures observed in `Closed`.
    pub consecutive_failures: u32,
    /// Cumulative successes since creation or last reset.
    pub total_successes: u64,
    /// Cumulative failures since creation or last reset.
    pub total_failures: u64,
    /// When the breaker last opened.
    pub last_opened_at: Option<DateTime<Utc>>,
    /// When the breaker last admitted a half-open probe.
    pub last_half_open_at: Option<DateTime<Utc>>,
    /// When the state last changed.
    pub last_transition_at: Option<DateTime<Utc>>,
}

/// Snapshot of a single provider's rolling health window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealthSnapshot {
    /// Advisory healthy flag consulted by the router before dispatch.
    pub is_healthy: bool,
    /// Consecutive failures at the tail of the window.
    pub consecutive_failures: u32,
    /// Failures divided by total outcomes over the surviving window.
    pub error_rate: f64,
    /// Mean latency of successful calls in the window, in milliseconds.
    pub average_latency_ms: Option<f64>,
    /// Outcomes surviving the retention horizon and cap.
    pub sample_count: usize,
    /// When the provider last succeeded.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Failure counts per error kind since creation.
    pub error_counts: HashMap<ErrorKind, u64>,
}
