//! Per-provider circuit breaker.
//!
//! One breaker instance guards one provider. Transitions are serialized
//! under the instance mutex; breakers for different providers are fully
//! independent. In `HalfOpen` at most one probe is in flight; a probe
//! future dropped by caller cancellation releases the slot through the
//! permit's `Drop` without recording a failure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, warn};

use marketgate_core::GatewayError;
use marketgate_types::{BreakerConfig, BreakerMetrics, CircuitState, DataType, ProviderId};

struct BreakerCore {
    state: CircuitState,
    consecutive_failures: u32,
    total_successes: u64,
    total_failures: u64,
    /// Monotonic stamp of the last open, for cooldown math.
    opened_at: Option<Instant>,
    last_opened_at: Option<DateTime<Utc>>,
    last_half_open_at: Option<DateTime<Utc>>,
    last_transition_at: Option<DateTime<Utc>>,
    half_open_in_flight: bool,
}

impl BreakerCore {
    const fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            total_successes: 0,
            total_failures: 0,
            opened_at: None,
            last_opened_at: None,
            last_half_open_at: None,
            last_transition_at: None,
            half_open_in_flight: false,
        }
    }

    fn transition(&mut self, to: CircuitState) {
        self.state = to;
        self.last_transition_at = Some(Utc::now());
    }
}

/// Three-state gate protecting calls to a single provider.
pub struct CircuitBreaker {
    provider_id: ProviderId,
    config: BreakerConfig,
    inner: Mutex<BreakerCore>,
}

impl CircuitBreaker {
    /// Create a breaker for `provider_id` in the `Closed` state.
    #[must_use]
    pub fn new(provider_id: ProviderId, config: BreakerConfig) -> Self {
        Self {
            provider_id,
            config,
            inner: Mutex::new(BreakerCore::new()),
        }
    }

    /// Execute `operation` through the gate.
    ///
    /// When the breaker is disabled by configuration this is a passthrough.
    /// Otherwise the call is admitted per the state machine, bounded by the
    /// configured per-call timeout, and its outcome is recorded. A caller
    /// cancellation (the future resolving to `Cancelled`, or being dropped
    /// mid-flight) is propagated without counting as a failure.
    ///
    /// # Errors
    /// `CircuitOpen` when the gate rejects the call; `ProviderTimeout` when
    /// the per-call deadline elapses; otherwise the operation's own error.
    pub async fn execute<T, Fut>(
        &self,
        operation: DataType,
        fut: Fut,
    ) -> Result<T, GatewayError>
    where
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        if !self.config.enabled {
            return fut.await;
        }

        let permit = self.try_acquire()?;

        let result = match self.config.call_timeout() {
            Some(deadline) => match tokio::time::timeout(deadline, fut).await {
                Ok(r) => r,
                Err(_) => Err(GatewayError::ProviderTimeout {
                    provider: self.provider_id.clone(),
                    operation,
                }),
            },
            None => fut.await,
        };

        match &result {
            Ok(_) => permit.success(),
            Err(e) if e.is_cancelled() => permit.release(),
            Err(_) => permit.failure(),
        }
        result
    }

    /// Admit a call, transitioning `Open` → `HalfOpen` once the cooldown has
    /// elapsed.
    ///
    /// # Errors
    /// `CircuitOpen` while the cooldown is running or while another
    /// half-open probe is in flight.
    pub fn try_acquire(&self) -> Result<CallPermit<'_>, GatewayError> {
        let mut core = self.inner.lock().expect("mutex poisoned");
        match core.state {
            CircuitState::Closed => Ok(CallPermit::new(self, false)),
            CircuitState::Open => {
                let cooled = core
                    .opened_at
                    .is_some_and(|at| at.elapsed() >= self.config.half_open_after());
                if !cooled {
                    return Err(GatewayError::CircuitOpen {
                        provider: self.provider_id.clone(),
                    });
                }
                core.transition(CircuitState::HalfOpen);
                core.half_open_in_flight = true;
                core.last_half_open_at = Some(Utc::now());
                debug!(provider = %self.provider_id, "circuit breaker half-open, admitting probe");
                Ok(CallPermit::new(self, true))
            }
            CircuitState::HalfOpen => {
                if core.half_open_in_flight {
                    return Err(GatewayError::CircuitOpen {
                        provider: self.provider_id.clone(),
                    });
                }
                core.half_open_in_flight = true;
                core.last_half_open_at = Some(Utc::now());
                Ok(CallPermit::new(self, true))
            }
        }
    }

    fn record_success(&self, probe: bool) {
        let mut core = self.inner.lock().expect("mutex poisoned");
        core.total_successes += 1;
        core.consecutive_failures = 0;
        if probe {
            core.half_open_in_flight = false;
        }
        if core.state != CircuitState::Closed {
            core.transition(CircuitState::Closed);
            debug!(provider = %self.provider_id, "circuit breaker closed after successful probe");
        }
    }

    fn record_failure(&self, probe: bool) {
        let mut core = self.inner.lock().expect("mutex poisoned");
        core.total_failures += 1;
        core.consecutive_failures += 1;
        if probe {
            core.half_open_in_flight = false;
            core.opened_at = Some(Instant::now());
            core.last_opened_at = Some(Utc::now());
            core.transition(CircuitState::Open);
            warn!(provider = %self.provider_id, "probe failed, circuit breaker re-opened");
            return;
        }
        if core.state == CircuitState::Closed
            && core.consecutive_failures >= self.config.failure_threshold
        {
            core.opened_at = Some(Instant::now());
            core.last_opened_at = Some(Utc::now());
            core.transition(CircuitState::Open);
            warn!(
                provider = %self.provider_id,
                failures = core.consecutive_failures,
                "failure threshold reached, circuit breaker opened"
            );
        }
    }

    fn release_probe(&self) {
        let mut core = self.inner.lock().expect("mutex poisoned");
        core.half_open_in_flight = false;
    }

    /// Force the breaker back to `Closed` and zero the consecutive counter.
    /// Cumulative totals are preserved.
    pub fn reset(&self) {
        let mut core = self.inner.lock().expect("mutex poisoned");
        core.consecutive_failures = 0;
        core.half_open_in_flight = false;
        core.opened_at = None;
        if core.state != CircuitState::Closed {
            core.transition(CircuitState::Closed);
        }
    }

    /// Current state, counters, and transition timestamps.
    #[must_use]
    pub fn metrics(&self) -> BreakerMetrics {
        let core = self.inner.lock().expect("mutex poisoned");
        BreakerMetrics {
            state: core.state,
            consecutive_failures: core.consecutive_failures,
            total_successes: core.total_successes,
            total_failures: core.total_failures,
            last_opened_at: core.last_opened_at,
            last_half_open_at: core.last_half_open_at,
            last_transition_at: core.last_transition_at,
        }
    }

    /// Provider this breaker guards.
    #[must_use]
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }
}

/// Admission token for one call.
///
/// Exactly one of [`success`](Self::success), [`failure`](Self::failure),
/// or [`release`](Self::release) consumes the permit. Dropping it without
/// an outcome (the probe future was cancelled mid-flight) releases the
/// half-open slot without recording anything.
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl std::fmt::Debug for CallPermit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallPermit")
            .field("probe", &self.probe)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

impl<'a> CallPermit<'a> {
    const fn new(breaker: &'a CircuitBreaker, probe: bool) -> Self {
        Self {
            breaker,
            probe,
            settled: false,
        }
    }

    /// Record a successful call.
    pub fn success(mut self) {
        self.settled = true;
        self.breaker.record_success(self.probe);
    }

    /// Record a failed call.
    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure(self.probe);
    }

    /// Release without recording an outcome (caller cancellation).
    pub fn release(mut self) {
        self.settled = true;
        if self.probe {
            self.breaker.release_probe();
        }
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.probe {
            self.breaker.release_probe();
        }
    }
}

/// Lazily-populated map of breakers, one per observed provider.
///
/// All breakers share the same configuration; records live for the process
/// lifetime.
pub struct CircuitBreakerRegistry {
    config: BreakerConfig,
    breakers: RwLock<HashMap<ProviderId, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the breaker for `provider_id`, creating it on first use.
    #[must_use]
    pub fn breaker_for(&self, provider_id: &ProviderId) -> Arc<CircuitBreaker> {
        if let Some(b) = self
            .breakers
            .read()
            .expect("lock poisoned")
            .get(provider_id)
        {
            return Arc::clone(b);
        }
        let mut map = self.breakers.write().expect("lock poisoned");
        Arc::clone(map.entry(provider_id.clone()).or_insert_with(|| {
            Arc::new(CircuitBreaker::new(
                provider_id.clone(),
                self.config.clone(),
            ))
        }))
    }

    /// Snapshot metrics for every breaker created so far.
    #[must_use]
    pub fn metrics(&self) -> HashMap<ProviderId, BreakerMetrics> {
        self.breakers
            .read()
            .expect("lock poisoned")
            .iter()
            .map(|(id, b)| (id.clone(), b.metrics()))
            .collect()
    }
}
