//! Resilience middleware for marketgate connectors.
//!
//! - `breaker`: per-provider three-state circuit breakers with a registry
//!   keyed by `ProviderId`.
//! - `health`: rolling-window success/failure tracking used by the router to
//!   skip evidently bad providers ahead of the breaker.

pub mod breaker;
pub mod health;

pub use breaker::{CircuitBreaker, CircuitBreakerRegistry};
pub use health::HealthMonitor;
