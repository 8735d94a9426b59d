use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use marketgate_core::error::{ProviderFailure, collapse_errors};
use marketgate_core::{GatewayError, ProviderConnector, deduplicate};
use marketgate_middleware::{CircuitBreakerRegistry, HealthMonitor};
use marketgate_types::{
    BreakerMetrics, DataType, GatewayConfig, ProviderHealthSnapshot, ProviderId,
};

/// Orchestrator that routes requests across registered providers.
pub struct Gateway {
    pub(crate) connectors: Vec<Arc<dyn ProviderConnector>>,
    pub(crate) registry: HashMap<ProviderId, Arc<dyn ProviderConnector>>,
    pub(crate) cfg: GatewayConfig,
    pub(crate) breakers: CircuitBreakerRegistry,
    pub(crate) health: Arc<HealthMonitor>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("connectors", &self.connectors.len())
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a `Gateway` with validated wiring.
pub struct GatewayBuilder {
    connectors: Vec<Arc<dyn ProviderConnector>>,
    cfg: GatewayConfig,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayBuilder {
    /// Create a new builder with the default configuration snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: GatewayConfig::default(),
        }
    }

    /// Register a provider connector.
    ///
    /// Registration order is only a tiebreak; routing order comes from the
    /// configuration (explicit chains, else ascending provider priority).
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn ProviderConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Install the validated configuration snapshot.
    #[must_use]
    pub fn config(mut self, cfg: GatewayConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the `Gateway`.
    ///
    /// # Errors
    /// - `Config` if no connectors have been registered, or two connectors
    ///   share a provider id.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        if self.connectors.is_empty() {
            return Err(GatewayError::Config(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }

        let mut registry: HashMap<ProviderId, Arc<dyn ProviderConnector>> = HashMap::new();
        for c in &self.connectors {
            if registry.insert(c.id().clone(), Arc::clone(c)).is_some() {
                return Err(GatewayError::Config(format!(
                    "duplicate connector registered for provider id {}",
                    c.id()
                )));
            }
        }

        let breakers = CircuitBreakerRegistry::new(self.cfg.circuit_breaker.clone());
        Ok(Gateway {
            connectors: self.connectors,
            registry,
            cfg: self.cfg,
            breakers,
            health: Arc::new(HealthMonitor::new()),
        })
    }
}

impl Gateway {
    /// Start building a new `Gateway` instance.
    #[must_use]
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// The immutable configuration snapshot this gateway routes with.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.cfg
    }

    /// Registered connectors, in registration order.
    #[must_use]
    pub fn connectors(&self) -> &[Arc<dyn ProviderConnector>] {
        &self.connectors
    }

    /// Read-only health snapshots for every provider observed so far.
    #[must_use]
    pub fn provider_health(&self) -> HashMap<ProviderId, ProviderHealthSnapshot> {
        self.health.snapshot_all()
    }

    /// Read-only breaker metrics for every provider called so far.
    #[must_use]
    pub fn breaker_metrics(&self) -> HashMap<ProviderId, BreakerMetrics> {
        self.breakers.metrics()
    }

    /// The shared health monitor (for wiring the background probe task).
    #[must_use]
    pub fn health_monitor(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    /// Resolve the provider chain for a data type.
    ///
    /// An explicit routing entry yields `[primary] + fallbacks`; otherwise
    /// all enabled providers ordered by ascending priority (declaration
    /// order breaks ties). Ids absent from the registry are silently
    /// skipped and duplicates keep their first occurrence.
    pub(crate) fn chain_for(&self, data_type: DataType) -> Vec<Arc<dyn ProviderConnector>> {
        let ids: Vec<ProviderId> = match self.cfg.routing.data_type_routing.get(&data_type) {
            Some(route) => std::iter::once(route.primary_provider_id.clone())
                .chain(route.fallback_provider_ids.iter().cloned())
                .collect(),
            None => {
                let mut enabled: Vec<(u32, usize, ProviderId)> = self
                    .cfg
                    .providers
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.enabled)
                    .map(|(i, p)| (p.priority, i, p.id.clone()))
                    .collect();
                enabled.sort_by_key(|(priority, index, _)| (*priority, *index));
                enabled.into_iter().map(|(_, _, id)| id).collect()
            }
        };

        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| seen.insert(id.clone()))
            .filter_map(|id| self.registry.get(&id).cloned())
            .collect()
    }

    /// Whether the data type executes in aggregation mode.
    ///
    /// Explicit routing entries win; without one, news data types aggregate
    /// by default and everything else fails over.
    pub(crate) fn aggregate_enabled(&self, data_type: DataType) -> bool {
        self.cfg
            .routing
            .data_type_routing
            .get(&data_type)
            .map_or_else(|| data_type.is_news(), |route| route.aggregate_results)
    }

    /// Chain-level deadline for a data type, if one is configured.
    pub(crate) fn chain_timeout(&self, data_type: DataType) -> Option<Duration> {
        let seconds = self
            .cfg
            .routing
            .data_type_routing
            .get(&data_type)
            .and_then(|route| route.timeout_seconds)
            .unwrap_or(self.cfg.performance.default_timeout_seconds);
        (seconds > 0).then(|| Duration::from_secs(seconds))
    }

    /// Execute an operation over its resolved chain, honoring the chain
    /// deadline and the configured execution mode.
    pub(crate) async fn execute_operation<F, Fut>(
        &self,
        data_type: DataType,
        not_found_label: String,
        call: F,
    ) -> Result<String, GatewayError>
    where
        F: Fn(Arc<dyn ProviderConnector>) -> Option<Fut> + Send + Sync,
        Fut: Future<Output = Result<String, GatewayError>> + Send,
    {
        let inner = async {
            if self.aggregate_enabled(data_type) {
                self.execute_aggregate(data_type, not_found_label, &call)
                    .await
            } else {
                self.execute_failover(data_type, not_found_label, &call)
                    .await
            }
        };

        match self.chain_timeout(data_type) {
            Some(deadline) => (tokio::time::timeout(deadline, inner).await).unwrap_or(Err(
                GatewayError::RequestTimeout {
                    operation: data_type,
                },
            )),
            None => inner.await,
        }
    }

    /// Sequential failover: try the chain in order, return the first
    /// success. `NotFound` is terminal; anything else advances the chain.
    async fn execute_failover<F, Fut>(
        &self,
        data_type: DataType,
        not_found_label: String,
        call: &F,
    ) -> Result<String, GatewayError>
    where
        F: Fn(Arc<dyn ProviderConnector>) -> Option<Fut> + Send + Sync,
        Fut: Future<Output = Result<String, GatewayError>> + Send,
    {
        let mut any_capable = false;
        let mut attempted: Vec<ProviderId> = Vec::new();
        let mut errors: Vec<ProviderFailure> = Vec::new();

        for connector in self.chain_for(data_type) {
            let provider_id = connector.id().clone();
            let Some(fut) = call(Arc::clone(&connector)) else {
                continue;
            };
            any_capable = true;
            attempted.push(provider_id.clone());

            if !self.health.is_healthy(&provider_id) {
                debug!(provider = %provider_id, data_type = %data_type, "skipping unhealthy provider");
                errors.push(ProviderFailure {
                    provider_id,
                    kind: marketgate_types::ErrorKind::ServiceError,
                    message: "skipped: provider marked unhealthy".to_string(),
                });
                continue;
            }
            let breaker = self.breakers.breaker_for(&provider_id);
            let started = Instant::now();
            match breaker.execute(data_type, fut).await {
                Ok(payload) => {
                    self.health.record_success(&provider_id, started.elapsed());
                    debug!(
                        provider = %provider_id,
                        data_type = %data_type,
                        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "provider succeeded"
                    );
                    return Ok(payload);
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    let kind = e.kind();
                    self.health.record_failure(&provider_id, kind);
                    warn!(
                        provider = %provider_id,
                        data_type = %data_type,
                        kind = %kind,
                        error = %e,
                        "provider failed, advancing chain"
                    );
                    let terminal = kind == marketgate_types::ErrorKind::NotFound;
                    errors.push(ProviderFailure {
                        provider_id,
                        kind,
                        message: e.to_string(),
                    });
                    if terminal {
                        break;
                    }
                }
            }
        }

        if !any_capable {
            return Err(GatewayError::unsupported(data_type));
        }
        Err(collapse_errors(
            data_type,
            attempted,
            errors,
            Some(not_found_label),
        ))
    }

    /// Parallel aggregation: fan out to every eligible provider, await all
    /// settlements, and combine successes preserving chain order. News data
    /// types are deduplicated when enabled; dedup errors degrade to a raw
    /// merge.
    async fn execute_aggregate<F, Fut>(
        &self,
        data_type: DataType,
        not_found_label: String,
        call: &F,
    ) -> Result<String, GatewayError>
    where
        F: Fn(Arc<dyn ProviderConnector>) -> Option<Fut> + Send + Sync,
        Fut: Future<Output = Result<String, GatewayError>> + Send,
    {
        let mut any_capable = false;
        let mut attempted: Vec<ProviderId> = Vec::new();
        let mut skipped: Vec<ProviderFailure> = Vec::new();
        let mut tasks = Vec::new();

        for connector in self.chain_for(data_type) {
            let provider_id = connector.id().clone();
            let Some(fut) = call(Arc::clone(&connector)) else {
                continue;
            };
            any_capable = true;
            attempted.push(provider_id.clone());

            if !self.health.is_healthy(&provider_id) {
                debug!(provider = %provider_id, data_type = %data_type, "skipping unhealthy provider");
                skipped.push(ProviderFailure {
                    provider_id,
                    kind: marketgate_types::ErrorKind::ServiceError,
                    message: "skipped: provider marked unhealthy".to_string(),
                });
                continue;
            }

            let breaker = self.breakers.breaker_for(&provider_id);
            let health = Arc::clone(&self.health);
            tasks.push(async move {
                let started = Instant::now();
                let result = breaker.execute(data_type, fut).await;
                match &result {
                    Ok(_) => health.record_success(&provider_id, started.elapsed()),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => health.record_failure(&provider_id, e.kind()),
                }
                (provider_id, result)
            });
        }

        if !any_capable {
            return Err(GatewayError::unsupported(data_type));
        }

        // Barrier: all tasks settle before the result is assembled, so the
        // output depends only on the success set, not arrival order.
        let settled = futures::future::join_all(tasks).await;

        let mut successes: Vec<(ProviderId, String)> = Vec::new();
        let mut errors = skipped;
        for (provider_id, result) in settled {
            match result {
                Ok(payload) => successes.push((provider_id, payload)),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    let kind = e.kind();
                    errors.push(ProviderFailure {
                        provider_id,
                        kind,
                        message: e.to_string(),
                    });
                }
            }
        }

        if successes.is_empty() {
            return Err(collapse_errors(
                data_type,
                attempted,
                errors,
                Some(not_found_label),
            ));
        }

        debug!(
            data_type = %data_type,
            successes = successes.len(),
            failures = errors.len(),
            "aggregation settled"
        );
        Ok(self.combine_results(data_type, successes))
    }

    /// Reduce aggregated successes into one payload.
    fn combine_results(&self, data_type: DataType, successes: Vec<(ProviderId, String)>) -> String {
        if data_type.is_news() && self.cfg.news_deduplication.enabled {
            match deduplicate(data_type, &successes, &self.cfg.news_deduplication) {
                Ok(payload) => return payload,
                Err(e) => {
                    warn!(
                        data_type = %data_type,
                        error = %e,
                        "news deduplication failed, falling back to raw merge"
                    );
                }
            }
        }
        raw_merge(&successes)
    }
}

/// Concatenate successful payloads in chain order, separated by blank lines.
fn raw_merge(successes: &[(ProviderId, String)]) -> String {
    successes
        .iter()
        .map(|(_, payload)| payload.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n")
}
