//! Clustering, merging, and serialization of news articles across providers.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::GatewayError;
use crate::news::parse::parse_news_block;
use crate::news::similarity::{normalize_title, normalized_similarity};
use marketgate_types::{DataType, NewsArticle, NewsDedupConfig, NewsSource, ProviderId};

/// Hard wall-clock budget for one deduplication pass.
pub const DEDUP_BUDGET: Duration = Duration::from_millis(500);

/// Bounds applied to `max_articles_for_comparison` at use.
const MAX_ARTICLES_FLOOR: usize = 1;
const MAX_ARTICLES_CEIL: usize = 200;

/// Deduplicate news payloads from multiple providers into one serialized
/// text block.
///
/// `responses` must be in chain order; output is then deterministic for a
/// given success set. The function is pure apart from the wall-clock budget
/// check: the same `(responses, config)` always yields the same articles.
///
/// # Errors
/// Returns `RequestTimeout` if the pass exceeds [`DEDUP_BUDGET`]; callers
/// fall back to a raw merge of the payloads.
pub fn deduplicate(
    data_type: DataType,
    responses: &[(ProviderId, String)],
    config: &NewsDedupConfig,
) -> Result<String, GatewayError> {
    let started = Instant::now();

    let cap = config
        .max_articles_for_comparison
        .clamp(MAX_ARTICLES_FLOOR, MAX_ARTICLES_CEIL);
    let threshold = config.similarity_threshold.clamp(0.0, 1.0);

    let mut articles: Vec<NewsArticle> = Vec::new();
    'providers: for (provider_id, payload) in responses {
        for article in parse_news_block(provider_id, payload) {
            if articles.len() >= cap {
                break 'providers;
            }
            articles.push(article);
        }
    }
    debug!(
        data_type = %data_type,
        providers = responses.len(),
        articles = articles.len(),
        threshold,
        "deduplicating news articles"
    );

    let merged = cluster_and_merge(data_type, articles, threshold, started)?;
    Ok(serialize_articles(&merged))
}

/// Cluster articles by exact URL or title similarity, merge each cluster,
/// and order the result.
///
/// # Errors
/// Returns `RequestTimeout` when the wall-clock budget is exhausted.
pub fn cluster_and_merge(
    data_type: DataType,
    articles: Vec<NewsArticle>,
    threshold: f64,
    started: Instant,
) -> Result<Vec<NewsArticle>, GatewayError> {
    // Normalize each title once; the quadratic pass compares normalized forms.
    let normalized: Vec<String> = articles.iter().map(|a| normalize_title(&a.title)).collect();

    let mut consumed = vec![false; articles.len()];
    let mut merged: Vec<NewsArticle> = Vec::new();

    for i in 0..articles.len() {
        if consumed[i] {
            continue;
        }
        if started.elapsed() > DEDUP_BUDGET {
            return Err(GatewayError::RequestTimeout {
                operation: data_type,
            });
        }
        consumed[i] = true;

        let mut cluster: Vec<&NewsArticle> = vec![&articles[i]];
        for j in (i + 1)..articles.len() {
            if consumed[j] {
                continue;
            }
            if is_duplicate(
                (&articles[i], &normalized[i]),
                (&articles[j], &normalized[j]),
                threshold,
            ) {
                consumed[j] = true;
                cluster.push(&articles[j]);
            }
        }
        merged.push(merge_cluster(&cluster));
    }

    sort_articles(&mut merged);
    Ok(merged)
}

/// Whether two articles belong to the same cluster: a non-empty,
/// case-insensitively equal URL forces a merge regardless of the titles;
/// otherwise the similarity threshold decides.
fn is_duplicate(
    (a, a_norm): (&NewsArticle, &str),
    (b, b_norm): (&NewsArticle, &str),
    threshold: f64,
) -> bool {
    if !a.url.is_empty() && !b.url.is_empty() && a.url.eq_ignore_ascii_case(&b.url) {
        return true;
    }
    normalized_similarity(a_norm, b_norm) >= threshold
}

/// Merge one cluster into a single article.
///
/// The primary (first) member supplies the title, URL, publisher, and
/// provider id; the merged timestamp is the earliest non-null in the
/// cluster; tickers are the case-insensitive union sorted alphabetically;
/// sources are the union deduplicated by `(provider_id, url, publisher)`
/// and sorted by provider id.
fn merge_cluster(cluster: &[&NewsArticle]) -> NewsArticle {
    let primary = cluster[0];
    if cluster.len() == 1 {
        let mut article = primary.clone();
        article.is_merged = false;
        article.merged_count = 0;
        return article;
    }

    let published_at = cluster.iter().filter_map(|a| a.published_at).min();

    let mut seen_tickers = HashSet::new();
    let mut related_tickers: Vec<String> = Vec::new();
    for t in cluster.iter().flat_map(|a| a.related_tickers.iter()) {
        if seen_tickers.insert(t.to_uppercase()) {
            related_tickers.push(t.clone());
        }
    }
    related_tickers.sort_by_key(|t| t.to_uppercase());

    let mut seen_sources = HashSet::new();
    let mut sources: Vec<NewsSource> = Vec::new();
    for s in cluster.iter().flat_map(|a| a.sources.iter()) {
        let key = (
            s.provider_id.clone(),
            s.url.to_lowercase(),
            s.publisher.to_lowercase(),
        );
        if seen_sources.insert(key) {
            sources.push(s.clone());
        }
    }
    sources.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));

    NewsArticle {
        title: primary.title.clone(),
        url: primary.url.clone(),
        publisher: primary.publisher.clone(),
        provider_id: primary.provider_id.clone(),
        published_at,
        related_tickers,
        sources,
        is_merged: true,
        merged_count: cluster.len() - 1,
    }
}

/// Total output order: published descending with nulls last, ties broken by
/// case-insensitive title ascending.
fn sort_articles(articles: &mut [NewsArticle]) {
    articles.sort_by(|a, b| {
        match (b.published_at, a.published_at) {
            (Some(tb), Some(ta)) => tb.cmp(&ta),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
}

/// Serialize articles back into the wire block format.
///
/// Merged articles carry a `Sources` line listing publisher labels — never
/// provider ids — deduplicated case-insensitively and sorted; when no label
/// is available the generic `Source 1, Source 2, …` form is used.
#[must_use]
pub fn serialize_articles(articles: &[NewsArticle]) -> String {
    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = write!(out, "Title: {}", article.title);
        let _ = write!(out, "\nPublisher: {}", article.publisher);
        match article.published_at {
            Some(ts) => {
                let _ = write!(out, "\nPublished: {}", ts.format("%Y-%m-%d %H:%M:%S"));
            }
            None => out.push_str("\nPublished: Unknown"),
        }
        if !article.related_tickers.is_empty() {
            let _ = write!(
                out,
                "\nRelated Tickers: {}",
                article.related_tickers.join(", ")
            );
        }
        if article.is_merged {
            let _ = write!(out, "\nSources: {}", source_labels(&article.sources));
        }
        let _ = write!(out, "\nURL: {}", article.url);
        if article.is_merged {
            let _ = write!(out, "\nMerged Count: {}", article.merged_count);
        }
    }
    out
}

fn source_labels(sources: &[NewsSource]) -> String {
    let mut seen = HashSet::new();
    let mut labels: Vec<&str> = Vec::new();
    for s in sources {
        if s.publisher.is_empty() {
            continue;
        }
        if seen.insert(s.publisher.to_lowercase()) {
            labels.push(&s.publisher);
        }
    }
    if labels.is_empty() {
        return (1..=sources.len())
            .map(|n| format!("Source {n}"))
            .collect::<Vec<_>>()
            .join(", ");
    }
    labels.sort_by_key(|l| l.to_lowercase());
    labels.join(", ")
}
