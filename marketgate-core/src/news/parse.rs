//! Stateless parser for provider news blocks.
//!
//! A provider payload is a concatenation of article records separated by
//! blank lines; each record is a set of `Key: value` lines. Unrecognized
//! keys are ignored and malformed records are dropped, never propagated as
//! errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::sanitize::{normalize_url, sanitize_field};
use marketgate_types::{NewsArticle, ProviderId};

/// Parse one provider's payload into sanitized articles.
///
/// Records lacking both a title and a URL are discarded. Every surviving
/// article carries exactly one source attribution for `provider_id`.
#[must_use]
pub fn parse_news_block(provider_id: &ProviderId, payload: &str) -> Vec<NewsArticle> {
    payload
        .split("\n\n")
        .filter_map(|record| parse_record(provider_id, record))
        .collect()
}

fn parse_record(provider_id: &ProviderId, record: &str) -> Option<NewsArticle> {
    let mut title = String::new();
    let mut publisher = String::new();
    let mut url = String::new();
    let mut published_at = None;
    let mut related_tickers: Vec<String> = Vec::new();

    for line in record.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "title" => title = sanitize_field(value),
            "publisher" => publisher = sanitize_field(value),
            "url" => url = normalize_url(&sanitize_field(value)),
            "published" => published_at = parse_timestamp(value),
            "related tickers" => related_tickers = parse_tickers(value),
            _ => {}
        }
    }

    if title.is_empty() && url.is_empty() {
        return None;
    }

    Some(NewsArticle::single(
        title,
        url,
        publisher,
        provider_id.clone(),
        published_at,
        related_tickers,
    ))
}

/// Best-effort timestamp parsing for the `Published` field.
///
/// Accepts the canonical `yyyy-MM-dd HH:mm:ss` form, RFC 3339, a `T`-joined
/// variant, and a bare date. Anything else (including the literal
/// `Unknown`) yields `None`.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("unknown") {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

/// Split a `Related Tickers` value on commas, sanitize each entry, and
/// deduplicate case-insensitively, keeping the first spelling and sorting
/// the result for stable output.
fn parse_tickers(value: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for raw in value.split(',') {
        let t = sanitize_field(raw);
        if t.is_empty() {
            continue;
        }
        if seen.insert(t.to_uppercase()) {
            out.push(t);
        }
    }
    out.sort_by_key(|t| t.to_uppercase());
    out
}
