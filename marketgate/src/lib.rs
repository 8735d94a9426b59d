//! marketgate orchestrates requests across multiple market data providers.
//!
//! Overview
//! - Routes each operation to a per-data-type provider chain resolved from
//!   configuration, or to all enabled providers by ascending priority.
//! - Executes chains in one of two modes: sequential failover (first success
//!   wins, `NotFound` is terminal) or parallel aggregation (fan out, keep
//!   every success in chain order).
//! - Guards every provider call with a per-provider circuit breaker and
//!   records outcomes in a rolling health window; unhealthy providers are
//!   skipped ahead of the breaker.
//! - News payloads in aggregation mode pass through title-similarity
//!   deduplication with publisher attribution, falling back to a raw merge
//!   if the deduplicator errors or times out.
//! - Collapses exhausted chains into a single aggregate failure shaped for
//!   the protocol edge (all not-found → not-found, all rate-limited →
//!   rate-limited, otherwise service error with per-provider diagnostics).
#![warn(missing_docs)]

pub(crate) mod core;
mod router;

pub use crate::core::{Gateway, GatewayBuilder};

// Re-export contract and shared types for convenience.
pub use marketgate_core::{
    AggregateFailure, GatewayError, ProviderConnector, ProviderFailure, collapse_errors,
};
pub use marketgate_types::{
    BreakerConfig, BreakerMetrics, CircuitState, DataType, ErrorKind, FinancialStatementKind,
    GatewayConfig, HolderKind, NewsDedupConfig, OptionType, ProviderHealthSnapshot, ProviderId,
    RecommendationKind, RouteConfig,
};
