use core::fmt;

use thiserror::Error;

use marketgate_types::{DataType, ErrorKind, ProviderId};

/// Unified error type for the marketgate workspace.
///
/// This wraps capability mismatches, argument validation errors,
/// provider-tagged failures, not-found conditions, circuit rejections, and
/// an aggregate for multi-provider attempts.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The requested operation is not implemented by the target connector.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// The operation that was requested.
        operation: DataType,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the returned data (parse failures, missing fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Transport-level failure reaching the upstream.
    #[error("network failure: {0}")]
    Network(String),

    /// An individual provider call exceeded its deadline.
    #[error("provider timed out: {operation} via {provider}")]
    ProviderTimeout {
        /// Provider that timed out.
        provider: ProviderId,
        /// Operation for which the call timed out.
        operation: DataType,
    },

    /// The overall chain pass exceeded its deadline.
    #[error("request timed out: {operation}")]
    RequestTimeout {
        /// Operation for which the request timed out.
        operation: DataType,
    },

    /// The upstream throttled the request.
    #[error("rate limit exceeded by {provider}")]
    RateLimited {
        /// Provider that reported throttling.
        provider: ProviderId,
    },

    /// Upstream credentials were rejected.
    #[error("authentication rejected for {provider}")]
    Authentication {
        /// Provider that rejected the credentials.
        provider: ProviderId,
    },

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "stock info for AAPL".
        what: String,
    },

    /// An individual provider returned an error.
    #[error("{provider} failed: {msg}")]
    Provider {
        /// Provider that failed.
        provider: ProviderId,
        /// Human-readable error message.
        msg: String,
    },

    /// The provider's circuit breaker is open; the call was not attempted.
    #[error("circuit open for {provider}")]
    CircuitOpen {
        /// Provider whose breaker rejected the call.
        provider: ProviderId,
    },

    /// The caller cancelled the request. Never counted as a provider failure.
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// Every eligible provider failed; contains the individual failures.
    #[error(transparent)]
    AllProvidersFailed(#[from] AggregateFailure),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Provider` error with the provider id and message.
    pub fn provider(provider: impl Into<ProviderId>, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build an `Unsupported` error for an operation.
    #[must_use]
    pub const fn unsupported(operation: DataType) -> Self {
        Self::Unsupported { operation }
    }

    /// Whether this error is caller cancellation rather than a provider failure.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Classify this error into the closed kind taxonomy.
    ///
    /// Free-text provider messages are classified heuristically; structured
    /// variants map directly. Cancellation classifies as `Unknown` but is
    /// never recorded by the router, which checks
    /// [`is_cancelled`](Self::is_cancelled) first.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkError,
            Self::ProviderTimeout { .. } | Self::RequestTimeout { .. } => ErrorKind::Timeout,
            Self::RateLimited { .. } => ErrorKind::RateLimitExceeded,
            Self::Authentication { .. } => ErrorKind::AuthenticationError,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Data(_) | Self::InvalidArg(_) => ErrorKind::DataError,
            // A rejected call never reached the provider, but counts against
            // its availability the same way an upstream 5xx would.
            Self::CircuitOpen { .. } => ErrorKind::ServiceError,
            Self::Provider { msg, .. } => classify_message(msg),
            Self::AllProvidersFailed(agg) => agg.surfaced_kind(),
            Self::Unsupported { .. } | Self::Cancelled | Self::Config(_) | Self::Other(_) => {
                ErrorKind::Unknown
            }
        }
    }
}

/// Classify a free-text provider error message into the kind taxonomy.
///
/// Recognizes the throttling, authentication, not-found, transport, server,
/// and parse markers that upstream adapters commonly emit. Unrecognized
/// messages classify as `Unknown`.
#[must_use]
pub fn classify_message(msg: &str) -> ErrorKind {
    let lower = msg.to_lowercase();

    if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
        || lower.contains("throttled")
    {
        return ErrorKind::RateLimitExceeded;
    }

    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("invalid api key")
        || lower.contains("authentication")
    {
        return ErrorKind::AuthenticationError;
    }

    if lower.contains("not found")
        || lower.contains("no data found")
        || lower.contains("unknown symbol")
        || lower.contains("404")
    {
        return ErrorKind::NotFound;
    }

    if lower.contains("timed out") || lower.contains("timeout") || lower.contains("deadline") {
        return ErrorKind::Timeout;
    }

    if lower.contains("connect")
        || lower.contains("connection")
        || lower.contains("dns")
        || lower.contains("unreachable")
    {
        return ErrorKind::NetworkError;
    }

    if lower.contains("500")
        || lower.contains("502")
        || lower.contains("503")
        || lower.contains("504")
        || lower.contains("internal server error")
        || lower.contains("bad gateway")
        || lower.contains("service unavailable")
        || lower.contains("server error")
    {
        return ErrorKind::ServiceError;
    }

    if lower.contains("parse") || lower.contains("malformed") || lower.contains("invalid json") {
        return ErrorKind::DataError;
    }

    ErrorKind::Unknown
}

/// One provider's contribution to an aggregate failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Provider that failed.
    pub provider_id: ProviderId,
    /// Classified kind of the failure.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

/// Every eligible provider failed for a data type.
///
/// Carries the attempted chain in order and the per-provider diagnostics;
/// [`surfaced_kind`](Self::surfaced_kind) applies the protocol-edge shaping
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFailure {
    /// Operation that exhausted its chain.
    pub data_type: DataType,
    /// Providers attempted, in chain order.
    pub attempted: Vec<ProviderId>,
    /// Per-provider failure diagnostics.
    pub errors: Vec<ProviderFailure>,
}

impl AggregateFailure {
    /// Collapse the per-provider kind distribution into a single surfaced kind.
    ///
    /// All `NotFound` surfaces as `NotFound`; all `RateLimitExceeded`
    /// surfaces as `RateLimitExceeded`; any mix surfaces as `ServiceError`.
    #[must_use]
    pub fn surfaced_kind(&self) -> ErrorKind {
        if !self.errors.is_empty() && self.errors.iter().all(|e| e.kind == ErrorKind::NotFound) {
            return ErrorKind::NotFound;
        }
        if !self.errors.is_empty()
            && self
                .errors
                .iter()
                .all(|e| e.kind == ErrorKind::RateLimitExceeded)
        {
            return ErrorKind::RateLimitExceeded;
        }
        ErrorKind::ServiceError
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all providers failed for {}: ", self.data_type)?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} ({}): {}", e.provider_id, e.kind, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateFailure {}

/// Collapse a set of per-provider failures into a uniform `GatewayError`.
///
/// Rules:
/// - If `attempted` is empty → `Unsupported(data_type)`.
/// - If `not_found_what` is `Some` and all errors are `NotFound` → `NotFound(what)`.
/// - Else → `AllProvidersFailed` carrying the diagnostics.
#[must_use]
pub fn collapse_errors(
    data_type: DataType,
    attempted: Vec<ProviderId>,
    errors: Vec<ProviderFailure>,
    not_found_what: Option<String>,
) -> GatewayError {
    if attempted.is_empty() {
        return GatewayError::unsupported(data_type);
    }
    if let Some(what) = not_found_what
        && !errors.is_empty()
        && errors.iter().all(|e| e.kind == ErrorKind::NotFound)
    {
        return GatewayError::not_found(what);
    }
    GatewayError::AllProvidersFailed(AggregateFailure {
        data_type,
        attempted,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_variants_classify_directly() {
        assert_eq!(
            GatewayError::Network("refused".into()).kind(),
            ErrorKind::NetworkError
        );
        assert_eq!(
            GatewayError::not_found("stock info for AAPL").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            GatewayError::CircuitOpen {
                provider: "p1".into()
            }
            .kind(),
            ErrorKind::ServiceError
        );
    }

    #[test]
    fn message_heuristics_cover_the_taxonomy() {
        assert_eq!(
            classify_message("HTTP 429 Too Many Requests"),
            ErrorKind::RateLimitExceeded
        );
        assert_eq!(
            classify_message("401 Unauthorized"),
            ErrorKind::AuthenticationError
        );
        assert_eq!(
            classify_message("no data found for symbol ZZZZ"),
            ErrorKind::NotFound
        );
        assert_eq!(
            classify_message("503 Service Unavailable"),
            ErrorKind::ServiceError
        );
        assert_eq!(
            classify_message("connection refused"),
            ErrorKind::NetworkError
        );
        assert_eq!(
            classify_message("failed to parse response body"),
            ErrorKind::DataError
        );
        assert_eq!(classify_message("something odd"), ErrorKind::Unknown);
    }

    #[test]
    fn shaping_table_matches_distribution() {
        let fail = |kind| ProviderFailure {
            provider_id: "p".into(),
            kind,
            message: String::new(),
        };
        let agg = |kinds: &[ErrorKind]| AggregateFailure {
            data_type: DataType::StockInfo,
            attempted: vec!["p".into()],
            errors: kinds.iter().copied().map(fail).collect(),
        };

        assert_eq!(
            agg(&[ErrorKind::NotFound, ErrorKind::NotFound]).surfaced_kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            agg(&[ErrorKind::RateLimitExceeded]).surfaced_kind(),
            ErrorKind::RateLimitExceeded
        );
        assert_eq!(
            agg(&[ErrorKind::NotFound, ErrorKind::Timeout]).surfaced_kind(),
            ErrorKind::ServiceError
        );
        assert_eq!(agg(&[]).surfaced_kind(), ErrorKind::ServiceError);
    }
}
