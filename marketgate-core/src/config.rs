//! Configuration loading and validation.
//!
//! The configuration file is JSON. A missing file adopts the built-in
//! defaults; a file that is present but unreadable, fails to parse,
//! references an unset environment variable, or fails semantic validation
//! aborts startup. The returned snapshot is immutable for the process
//! lifetime.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::error::GatewayError;
use crate::sanitize::redact_secrets;
use marketgate_types::GatewayConfig;

/// Valid range for `newsDeduplication.similarityThreshold`.
pub const SIMILARITY_THRESHOLD_RANGE: (f64, f64) = (0.50, 0.99);
/// Valid range for `newsDeduplication.timestampWindowHours`.
pub const TIMESTAMP_WINDOW_RANGE: (u32, u32) = (1, 168);
/// Valid range for `newsDeduplication.maxArticlesForComparison`.
pub const MAX_ARTICLES_RANGE: (usize, usize) = (10, 1000);

/// Load and validate the gateway configuration.
///
/// `path = None`, or a path that does not exist, yields the validated
/// built-in defaults.
///
/// # Errors
/// Returns `Config` when the file cannot be read, an `${NAME}` token names
/// an unset environment variable, the JSON fails to deserialize, or a
/// semantic check fails. Messages are secret-redacted.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, GatewayError> {
    let Some(path) = path else {
        debug!("no configuration path given, using built-in defaults");
        return defaults();
    };
    if !path.exists() {
        info!(path = %path.display(), "configuration file absent, using built-in defaults");
        return defaults();
    }

    let raw = std::fs::read_to_string(path).map_err(|e| {
        config_error(format!("failed to read {}: {e}", path.display()))
    })?;
    let cfg = parse(&raw)?;
    info!(path = %path.display(), providers = cfg.providers.len(), "configuration loaded");
    Ok(cfg)
}

fn defaults() -> Result<GatewayConfig, GatewayError> {
    let cfg = GatewayConfig::default();
    validate(&cfg)?;
    Ok(cfg)
}

/// Parse and validate a raw configuration document.
///
/// # Errors
/// Returns `Config` on env-expansion, deserialization, or semantic failure.
pub fn parse(raw: &str) -> Result<GatewayConfig, GatewayError> {
    let expanded = expand_env(raw, |name| std::env::var(name).ok())?;
    let cfg: GatewayConfig = serde_json::from_str(&expanded)
        .map_err(|e| config_error(format!("invalid configuration JSON: {e}")))?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Replace `${NAME}` tokens with environment values from `lookup`.
///
/// The separate lookup signature keeps this testable without mutating the
/// process environment.
///
/// # Errors
/// Returns `Config` when a named variable is unset or a `${` is never
/// closed.
pub fn expand_env(
    input: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, GatewayError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // consume '{'
        let mut var_name = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            var_name.push(c);
        }
        if !closed || var_name.is_empty() {
            return Err(config_error(format!(
                "malformed environment reference: ${{{var_name}"
            )));
        }
        match lookup(&var_name) {
            Some(val) => result.push_str(&val),
            None => {
                return Err(config_error(format!(
                    "environment variable {var_name} referenced by the configuration is not set"
                )));
            }
        }
    }

    Ok(result)
}

/// Apply the semantic checks that gate startup.
///
/// # Errors
/// Returns `Config` naming the first offending field.
pub fn validate(cfg: &GatewayConfig) -> Result<(), GatewayError> {
    if cfg.providers.is_empty() {
        return Err(config_error("at least one provider must be declared"));
    }

    let mut ids = HashSet::new();
    for p in &cfg.providers {
        if p.id.is_empty() {
            return Err(config_error("provider id must be non-empty"));
        }
        if p.provider_type.is_empty() {
            return Err(config_error(format!(
                "provider {} must declare a type",
                p.id
            )));
        }
        if !ids.insert(p.id.clone()) {
            return Err(config_error(format!("duplicate provider id: {}", p.id)));
        }
    }

    for (data_type, route) in &cfg.routing.data_type_routing {
        if !ids.contains(&route.primary_provider_id) {
            return Err(config_error(format!(
                "routing for {data_type} references unknown primary provider {}",
                route.primary_provider_id
            )));
        }
        for fallback in &route.fallback_provider_ids {
            if !ids.contains(fallback) {
                return Err(config_error(format!(
                    "routing for {data_type} references unknown fallback provider {fallback}"
                )));
            }
        }
    }

    let dedup = &cfg.news_deduplication;
    check_range(
        "newsDeduplication.similarityThreshold",
        dedup.similarity_threshold,
        SIMILARITY_THRESHOLD_RANGE,
    )?;
    check_range(
        "newsDeduplication.timestampWindowHours",
        dedup.timestamp_window_hours,
        TIMESTAMP_WINDOW_RANGE,
    )?;
    check_range(
        "newsDeduplication.maxArticlesForComparison",
        dedup.max_articles_for_comparison,
        MAX_ARTICLES_RANGE,
    )?;

    Ok(())
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    (lo, hi): (T, T),
) -> Result<(), GatewayError> {
    if value < lo || value > hi {
        return Err(config_error(format!(
            "{field} must be within [{lo}, {hi}], got {value}"
        )));
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> GatewayError {
    GatewayError::Config(redact_secrets(&msg.into()))
}
