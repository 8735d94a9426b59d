//! Configuration schema for the gateway.
//!
//! Deserialized from the JSON configuration file at startup; after
//! validation the snapshot is immutable. Defaults here are the built-in
//! configuration used when no file is present.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DataType, ProviderId};

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    /// Configuration schema version string.
    pub version: String,
    /// Declared upstream providers. Validation requires at least one.
    pub providers: Vec<ProviderConfig>,
    /// Per-data-type routing chains.
    pub routing: RoutingConfig,
    /// News deduplication tuning.
    pub news_deduplication: NewsDedupConfig,
    /// Circuit breaker tuning, shared by all per-provider breakers.
    pub circuit_breaker: BreakerConfig,
    /// Timeouts and background health probing.
    pub performance: PerformanceConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            providers: vec![ProviderConfig {
                id: ProviderId::new("yahoo-primary"),
                provider_type: "mock".to_string(),
                name: "Yahoo Finance".to_string(),
                version: "1.0".to_string(),
                enabled: true,
                priority: 1,
                api_key: None,
            }],
            routing: RoutingConfig::default(),
            news_deduplication: NewsDedupConfig::default(),
            circuit_breaker: BreakerConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }
}

/// A single declared provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Opaque stable id referenced by routing chains. Must be unique.
    pub id: ProviderId,
    /// Adapter type to instantiate (e.g. "mock").
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Adapter version label.
    #[serde(default = "default_provider_version")]
    pub version: String,
    /// Disabled providers are never routed to.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ascending priority used when no explicit routing entry exists.
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Optional upstream credential. Supports `${NAME}` env expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_provider_version() -> String {
    "1.0".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_priority() -> u32 {
    100
}

/// Routing table: explicit chains per data type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    /// Explicit chain descriptors. Data types without an entry route to all
    /// enabled providers by ascending priority.
    pub data_type_routing: HashMap<DataType, RouteConfig>,
}

/// Chain descriptor for one data type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// First provider tried (failover) or always included (aggregation).
    pub primary_provider_id: ProviderId,
    /// Ordered fallbacks after the primary.
    #[serde(default)]
    pub fallback_provider_ids: Vec<ProviderId>,
    /// Fan out to every chain member in parallel and combine the results
    /// instead of sequential failover.
    #[serde(default)]
    pub aggregate_results: bool,
    /// Bound on the whole chain pass, in seconds. Falls back to
    /// [`PerformanceConfig::default_timeout_seconds`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// News deduplication tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsDedupConfig {
    /// Disabling yields the raw blank-line merge of provider payloads.
    pub enabled: bool,
    /// Titles at or above this similarity merge. Valid range [0.50, 0.99].
    pub similarity_threshold: f64,
    /// Window for treating timestamps as contemporaneous. Valid range [1, 168].
    pub timestamp_window_hours: u32,
    /// Upper bound on parsed articles entering the quadratic pass.
    /// Valid range [10, 1000]; clamped to [1, 200] at use.
    pub max_articles_for_comparison: usize,
    /// Reserved. Comparison is title-only regardless of this flag.
    pub compare_content: bool,
}

impl Default for NewsDedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            similarity_threshold: 0.85,
            timestamp_window_hours: 24,
            max_articles_for_comparison: 100,
            compare_content: false,
        }
    }
}

/// Circuit breaker tuning applied to every per-provider breaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakerConfig {
    /// Disabling makes `execute` a passthrough.
    pub enabled: bool,
    /// Consecutive failures in `Closed` that open the breaker.
    pub failure_threshold: u32,
    /// Cooldown before an open breaker admits a half-open probe.
    pub half_open_after_seconds: u64,
    /// Per-call deadline attached by the breaker; zero disables it.
    pub timeout_seconds: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 5,
            half_open_after_seconds: 60,
            timeout_seconds: 30,
        }
    }
}

impl BreakerConfig {
    /// Cooldown as a `Duration`.
    #[must_use]
    pub const fn half_open_after(&self) -> Duration {
        Duration::from_secs(self.half_open_after_seconds)
    }

    /// Per-call deadline, if one is configured.
    #[must_use]
    pub const fn call_timeout(&self) -> Option<Duration> {
        if self.timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_seconds))
        }
    }
}

/// Timeouts and background health probing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceConfig {
    /// Chain-level deadline for data types without an explicit
    /// `timeout_seconds` in their routing entry.
    pub default_timeout_seconds: u64,
    /// Interval for the optional background health probe task; zero
    /// disables probing.
    pub health_probe_interval_seconds: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: 30,
            health_probe_interval_seconds: 0,
        }
    }
}

impl PerformanceConfig {
    /// Default chain deadline as a `Duration`.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_seconds)
    }
}
