use std::time::Duration;

use crate::helpers::{config, gateway, with_route};
use marketgate::{DataType, ErrorKind, GatewayError};
use marketgate_mock::MockConnector;

fn news_block(title: &str, publisher: &str, slug: &str) -> String {
    format!(
        "Title: {title}\nPublisher: {publisher}\nPublished: 2026-02-27 10:00:00\nURL: https://example.com/{slug}"
    )
}

#[tokio::test]
async fn aggregation_tolerates_a_failing_peer() {
    let ok_block = news_block("Apple Earnings Beat Expectations", "Reuters", "apple");
    let p_a = MockConnector::builder("prov-a")
        .with_news_fn(move |_| Ok(ok_block.clone()))
        .build();
    let p_b = MockConnector::builder("prov-b")
        .with_news_fn(|_| Err(GatewayError::Network("connection reset by peer".to_string())))
        .build();

    let cfg = with_route(
        config(&[("prov-a", 1), ("prov-b", 2)]),
        DataType::News,
        "prov-a",
        &["prov-b"],
        true,
    );
    let gw = gateway(cfg, vec![p_a, p_b]);

    let out = gw.news("AAPL").await.unwrap();
    assert_eq!(out.matches("Title:").count(), 1);
    assert!(out.contains("Apple Earnings Beat Expectations"));
    // A single surviving source never gets an attribution line.
    assert!(!out.contains("Sources:"), "{out}");
}

#[tokio::test]
async fn aggregation_output_is_independent_of_arrival_order() {
    let run = |delay_a: u64, delay_b: u64| async move {
        let p_a = MockConnector::builder("prov-a")
            .delay(Duration::from_millis(delay_a))
            .with_news_fn(|_| Ok(news_block("Fed Holds Rates Steady", "Reuters", "fed")))
            .build();
        let p_b = MockConnector::builder("prov-b")
            .delay(Duration::from_millis(delay_b))
            .with_news_fn(|_| Ok(news_block("Oil Slides On Demand Worries", "Bloomberg", "oil")))
            .build();

        let cfg = with_route(
            config(&[("prov-a", 1), ("prov-b", 2)]),
            DataType::News,
            "prov-a",
            &["prov-b"],
            true,
        );
        gateway(cfg, vec![p_a, p_b]).news("AAPL").await.unwrap()
    };

    // Same success set, opposite arrival orders.
    let fast_primary = run(5, 60).await;
    let slow_primary = run(60, 5).await;
    assert_eq!(fast_primary, slow_primary);
}

#[tokio::test]
async fn zero_successes_raises_a_shaped_aggregate_failure() {
    let p_a = MockConnector::builder("prov-a")
        .with_news_fn(|t| Err(GatewayError::not_found(format!("news for {t}"))))
        .build();
    let p_b = MockConnector::builder("prov-b")
        .with_news_fn(|t| Err(GatewayError::not_found(format!("news for {t}"))))
        .build();

    let cfg = with_route(
        config(&[("prov-a", 1), ("prov-b", 2)]),
        DataType::News,
        "prov-a",
        &["prov-b"],
        true,
    );
    let gw = gateway(cfg, vec![p_a, p_b]);

    // All peers reporting not-found collapses to a plain NotFound.
    let err = gw.news("ZZZZ").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }), "{err}");
}

#[tokio::test]
async fn mixed_failures_surface_as_service_error() {
    let p_a = MockConnector::builder("prov-a")
        .with_news_fn(|_| Err(GatewayError::provider("prov-a", "429 too many requests")))
        .build();
    let p_b = MockConnector::builder("prov-b")
        .with_news_fn(|_| Err(GatewayError::Network("dns failure".to_string())))
        .build();

    let cfg = with_route(
        config(&[("prov-a", 1), ("prov-b", 2)]),
        DataType::News,
        "prov-a",
        &["prov-b"],
        true,
    );
    let gw = gateway(cfg, vec![p_a, p_b]);

    let err = gw.news("AAPL").await.unwrap_err();
    let GatewayError::AllProvidersFailed(agg) = err else {
        panic!("expected aggregate failure");
    };
    assert_eq!(agg.surfaced_kind(), ErrorKind::ServiceError);
    assert_eq!(agg.errors.len(), 2);
}

#[tokio::test]
async fn raw_merge_when_deduplication_is_disabled() {
    let p_a = MockConnector::builder("prov-a")
        .with_news_fn(|_| Ok(news_block("Story One", "Reuters", "one")))
        .build();
    let p_b = MockConnector::builder("prov-b")
        .with_news_fn(|_| Ok(news_block("Story Two", "Bloomberg", "two")))
        .build();

    let mut cfg = with_route(
        config(&[("prov-a", 1), ("prov-b", 2)]),
        DataType::News,
        "prov-a",
        &["prov-b"],
        true,
    );
    cfg.news_deduplication.enabled = false;
    let gw = gateway(cfg, vec![p_a, p_b]);

    let out = gw.news("AAPL").await.unwrap();
    // Chain order, blank-line separated, payloads untouched.
    let one = out.find("Story One").unwrap();
    let two = out.find("Story Two").unwrap();
    assert!(one < two);
    assert!(out.contains("\n\n"));
}

#[tokio::test]
async fn non_news_aggregation_merges_payloads_in_chain_order() {
    let p_a = MockConnector::builder("prov-a")
        .with_stock_info_fn(|_| Ok("summary from a".to_string()))
        .build();
    let p_b = MockConnector::builder("prov-b")
        .with_stock_info_fn(|_| Ok("summary from b".to_string()))
        .build();

    let cfg = with_route(
        config(&[("prov-a", 1), ("prov-b", 2)]),
        DataType::StockInfo,
        "prov-a",
        &["prov-b"],
        true,
    );
    let gw = gateway(cfg, vec![p_a, p_b]);

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "summary from a\n\nsummary from b");
}

#[tokio::test]
async fn news_aggregates_by_default_without_an_explicit_route() {
    let p_a = MockConnector::builder("prov-a")
        .with_news_fn(|_| Ok(news_block("Apple Earnings Beat Expectations", "Reuters", "a")))
        .build();
    let p_b = MockConnector::builder("prov-b")
        .with_news_fn(|_| {
            Ok(news_block(
                "Apple Earnings Beat Expectations",
                "Bloomberg",
                "b",
            ))
        })
        .build();

    // No routing entry for News: both providers run and duplicates merge.
    let gw = gateway(config(&[("prov-a", 1), ("prov-b", 2)]), vec![p_a, p_b]);
    let out = gw.news("AAPL").await.unwrap();
    assert_eq!(out.matches("Title:").count(), 1);
    assert!(out.contains("Sources: Bloomberg, Reuters"), "{out}");
    assert!(out.contains("Merged Count: 1"));
}
