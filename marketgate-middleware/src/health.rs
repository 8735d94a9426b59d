//! Rolling-window health tracking per provider.
//!
//! The monitor is advisory: the router uses `is_healthy` to skip providers,
//! but a healthy verdict never bypasses the circuit breaker.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use marketgate_core::connector::ProviderConnector;
use marketgate_types::{ErrorKind, ProviderHealthSnapshot, ProviderId};

/// Maximum outcomes retained per provider.
const WINDOW_CAP: usize = 100;
/// Outcomes older than this are pruned on read.
const RETENTION: Duration = Duration::from_secs(5 * 60);
/// Consecutive failures after which a provider is marked unhealthy.
const UNHEALTHY_THRESHOLD: u32 = 3;

struct Outcome {
    success: bool,
    latency: Duration,
    at: Instant,
}

struct HealthRecord {
    window: VecDeque<Outcome>,
    consecutive_failures: u32,
    is_healthy: bool,
    last_success_at: Option<DateTime<Utc>>,
    error_counts: HashMap<ErrorKind, u64>,
}

impl HealthRecord {
    fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_CAP),
            consecutive_failures: 0,
            is_healthy: true,
            last_success_at: None,
            error_counts: HashMap::new(),
        }
    }

    fn push(&mut self, outcome: Outcome) {
        if self.window.len() == WINDOW_CAP {
            self.window.pop_front();
        }
        self.window.push_back(outcome);
    }

    fn prune(&mut self) {
        while let Some(front) = self.window.front() {
            if front.at.elapsed() > RETENTION {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Rolling window of recent outcomes for every observed provider.
///
/// Records are created lazily on first observation and live for the process
/// lifetime. Updates for a single provider are serialized under its record
/// mutex; providers are independent.
pub struct HealthMonitor {
    records: RwLock<HashMap<ProviderId, Arc<Mutex<HealthRecord>>>>,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMonitor {
    /// Create an empty monitor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn record_for(&self, provider_id: &ProviderId) -> Arc<Mutex<HealthRecord>> {
        if let Some(r) = self
            .records
            .read()
            .expect("lock poisoned")
            .get(provider_id)
        {
            return Arc::clone(r);
        }
        let mut map = self.records.write().expect("lock poisoned");
        Arc::clone(
            map.entry(provider_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(HealthRecord::new()))),
        )
    }

    /// Record a successful call and its latency.
    pub fn record_success(&self, provider_id: &ProviderId, elapsed: Duration) {
        let record = self.record_for(provider_id);
        let mut r = record.lock().expect("mutex poisoned");
        r.push(Outcome {
            success: true,
            latency: elapsed,
            at: Instant::now(),
        });
        r.consecutive_failures = 0;
        r.last_success_at = Some(Utc::now());
        if !r.is_healthy {
            r.is_healthy = true;
            info!(provider = %provider_id, "provider recovered, marking healthy");
        }
    }

    /// Record a failed call of the given kind.
    pub fn record_failure(&self, provider_id: &ProviderId, kind: ErrorKind) {
        let record = self.record_for(provider_id);
        let mut r = record.lock().expect("mutex poisoned");
        r.push(Outcome {
            success: false,
            latency: Duration::ZERO,
            at: Instant::now(),
        });
        r.consecutive_failures += 1;
        *r.error_counts.entry(kind).or_insert(0) += 1;
        if r.consecutive_failures >= UNHEALTHY_THRESHOLD && r.is_healthy {
            r.is_healthy = false;
            warn!(
                provider = %provider_id,
                failures = r.consecutive_failures,
                kind = %kind,
                "consecutive failures, marking provider unhealthy"
            );
        }
    }

    /// Advisory healthy flag; providers never observed are healthy.
    #[must_use]
    pub fn is_healthy(&self, provider_id: &ProviderId) -> bool {
        let Some(record) = self
            .records
            .read()
            .expect("lock poisoned")
            .get(provider_id)
            .cloned()
        else {
            return true;
        };
        record.lock().expect("mutex poisoned").is_healthy
    }

    /// Mark a provider healthy without touching the rolling window (used by
    /// a passing background probe).
    pub fn mark_healthy(&self, provider_id: &ProviderId) {
        let record = self.record_for(provider_id);
        let mut r = record.lock().expect("mutex poisoned");
        if !r.is_healthy {
            r.is_healthy = true;
            r.consecutive_failures = 0;
            info!(provider = %provider_id, "health probe passed, marking healthy");
        }
    }

    /// Prune the window and compute a point-in-time snapshot.
    #[must_use]
    pub fn status(&self, provider_id: &ProviderId) -> ProviderHealthSnapshot {
        let record = self.record_for(provider_id);
        let mut r = record.lock().expect("mutex poisoned");
        r.prune();

        let total = r.window.len();
        let failures = r.window.iter().filter(|o| !o.success).count();
        let successes: Vec<&Outcome> = r.window.iter().filter(|o| o.success).collect();
        #[allow(clippy::cast_precision_loss)]
        let error_rate = if total == 0 {
            0.0
        } else {
            failures as f64 / total as f64
        };
        #[allow(clippy::cast_precision_loss)]
        let average_latency_ms = if successes.is_empty() {
            None
        } else {
            let sum_ms: f64 = successes
                .iter()
                .map(|o| o.latency.as_secs_f64() * 1000.0)
                .sum();
            Some(sum_ms / successes.len() as f64)
        };

        ProviderHealthSnapshot {
            is_healthy: r.is_healthy,
            consecutive_failures: r.consecutive_failures,
            error_rate,
            average_latency_ms,
            sample_count: total,
            last_success_at: r.last_success_at,
            error_counts: r.error_counts.clone(),
        }
    }

    /// Snapshot every provider observed so far.
    #[must_use]
    pub fn snapshot_all(&self) -> HashMap<ProviderId, ProviderHealthSnapshot> {
        let ids: Vec<ProviderId> = self
            .records
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        ids.into_iter().map(|id| (id.clone(), self.status(&id))).collect()
    }

    /// Spawn the optional background probe task.
    ///
    /// Every `interval`, each connector advertising a health probe is
    /// probed: a pass marks the provider healthy without touching the
    /// rolling window; a failure records a `ServiceError` outcome. The
    /// returned handle should be aborted on shutdown.
    #[must_use]
    pub fn spawn_probe_task(
        self: Arc<Self>,
        interval: Duration,
        connectors: Vec<Arc<dyn ProviderConnector>>,
    ) -> tokio::task::JoinHandle<()> {
        let monitor = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so probing starts
            // one interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                for connector in &connectors {
                    let Some(probe) = connector.as_health_probe() else {
                        continue;
                    };
                    let id = connector.id().clone();
                    match probe.probe().await {
                        Ok(()) => monitor.mark_healthy(&id),
                        Err(e) => {
                            debug!(provider = %id, error = %e, "health probe failed");
                            monitor.record_failure(&id, ErrorKind::ServiceError);
                        }
                    }
                }
            }
        })
    }
}
