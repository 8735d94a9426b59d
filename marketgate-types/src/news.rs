//! Typed news article model used inside the deduplication pipeline.
//!
//! Articles exist only for the duration of a single news request; the
//! gateway holds no cross-request article state.

use chrono::{DateTime, Utc};

use crate::ProviderId;

/// Attribution of one provider's copy of an article.
///
/// Collected during parsing and carried through cluster merging so the
/// serialized output can credit publishers without ever exposing provider
/// ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsSource {
    /// Provider that supplied this copy.
    pub provider_id: ProviderId,
    /// Original article URL as reported by that provider (may be empty).
    pub url: String,
    /// Publisher label as reported by that provider (may be empty).
    pub publisher: String,
}

/// A parsed, sanitized news article.
///
/// Invariants:
/// - All string fields are sanitized (control characters and `<`/`>`
///   stripped, whitespace collapsed, at most 512 characters).
/// - `url` is either empty or an absolute http(s) URL.
/// - `related_tickers` is deduplicated case-insensitively.
/// - `sources` is deduplicated by the `(provider_id, url, publisher)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsArticle {
    /// Article headline.
    pub title: String,
    /// Canonical article URL (empty when the provider reported none valid).
    pub url: String,
    /// Publisher label.
    pub publisher: String,
    /// Provider the primary copy came from. Never serialized into output.
    pub provider_id: ProviderId,
    /// Publication timestamp, when parseable.
    pub published_at: Option<DateTime<Utc>>,
    /// Tickers the article relates to, deduplicated and sorted.
    pub related_tickers: Vec<String>,
    /// All provider copies folded into this article.
    pub sources: Vec<NewsSource>,
    /// Whether this article is the result of merging a multi-member cluster.
    pub is_merged: bool,
    /// Number of duplicates folded in (cluster size minus one).
    pub merged_count: usize,
}

impl NewsArticle {
    /// Construct an unmerged article with a single source attribution.
    #[must_use]
    pub fn single(
        title: String,
        url: String,
        publisher: String,
        provider_id: ProviderId,
        published_at: Option<DateTime<Utc>>,
        related_tickers: Vec<String>,
    ) -> Self {
        let source = NewsSource {
            provider_id: provider_id.clone(),
            url: url.clone(),
            publisher: publisher.clone(),
        };
        Self {
            title,
            url,
            publisher,
            provider_id,
            published_at,
            related_tickers,
            sources: vec![source],
            is_merged: false,
            merged_count: 0,
        }
    }
}
