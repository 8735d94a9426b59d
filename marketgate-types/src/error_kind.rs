//! The closed error taxonomy shared by the classifier, health monitor, and router.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Category of a provider failure.
///
/// Every provider error the router observes collapses into exactly one of
/// these kinds; the health monitor histograms by kind and the router's final
/// error shaping inspects the distribution of kinds across a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Transport or connect failure.
    NetworkError,
    /// A derived deadline elapsed.
    Timeout,
    /// The upstream returned a server-side error.
    ServiceError,
    /// The upstream throttled the request (HTTP 429 or equivalent).
    RateLimitExceeded,
    /// The response was malformed or failed to parse.
    DataError,
    /// Credentials were rejected (HTTP 401/403).
    AuthenticationError,
    /// The target entity does not exist upstream.
    NotFound,
    /// Anything that fits no other category.
    Unknown,
}

impl ErrorKind {
    /// Stable identifier for logs and histograms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "network-error",
            Self::Timeout => "timeout",
            Self::ServiceError => "service-error",
            Self::RateLimitExceeded => "rate-limit-exceeded",
            Self::DataError => "data-error",
            Self::AuthenticationError => "authentication-error",
            Self::NotFound => "not-found",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
