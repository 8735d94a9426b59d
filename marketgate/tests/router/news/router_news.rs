use crate::helpers::{config, gateway, with_route};
use marketgate::DataType;
use marketgate_mock::MockConnector;

#[tokio::test]
async fn merged_articles_attribute_publishers_never_provider_ids() {
    let p_a = MockConnector::builder("prov-alpha")
        .with_news_fn(|_| {
            Ok("Title: Apple Earnings Beat Expectations\n\
                Publisher: Reuters\n\
                Published: 2026-02-27 10:00:00\n\
                URL: https://reuters.example.com/apple"
                .to_string())
        })
        .build();
    let p_b = MockConnector::builder("prov-beta")
        .with_news_fn(|_| {
            Ok("Title: Apple Earnings Beat Expectations\n\
                Publisher: Bloomberg\n\
                Published: 2026-02-27 09:30:00\n\
                URL: https://bloomberg.example.com/apple"
                .to_string())
        })
        .build();

    let cfg = with_route(
        config(&[("prov-alpha", 1), ("prov-beta", 2)]),
        DataType::News,
        "prov-alpha",
        &["prov-beta"],
        true,
    );
    let gw = gateway(cfg, vec![p_a, p_b]);

    let out = gw.news("AAPL").await.unwrap();
    assert_eq!(out.matches("Title:").count(), 1);
    assert!(out.contains("Published: 2026-02-27 09:30:00"));
    assert!(out.contains("Sources: Bloomberg, Reuters"));
    assert!(out.contains("Merged Count: 1"));
    assert!(!out.contains("prov-alpha"));
    assert!(!out.contains("prov-beta"));
}

#[tokio::test]
async fn market_news_aggregates_without_a_ticker() {
    let p_a = MockConnector::builder("prov-alpha")
        .with_market_news_fn(|| {
            Ok("Title: Stocks Climb On Rate Cut Hopes\n\
                Publisher: Reuters\n\
                Published: 2026-02-27 09:00:00\n\
                URL: https://reuters.example.com/markets"
                .to_string())
        })
        .build();
    let p_b = MockConnector::builder("prov-beta")
        .with_market_news_fn(|| {
            Ok("Title: Oil Slides On Demand Worries\n\
                Publisher: Bloomberg\n\
                Published: 2026-02-27 07:45:00\n\
                URL: https://bloomberg.example.com/oil"
                .to_string())
        })
        .build();

    // No explicit route: market news aggregates by default.
    let gw = gateway(
        config(&[("prov-alpha", 1), ("prov-beta", 2)]),
        vec![p_a, p_b],
    );

    let out = gw.market_news().await.unwrap();
    assert_eq!(out.matches("Title:").count(), 2);
    // Newest first.
    let first = out.find("Stocks Climb On Rate Cut Hopes").unwrap();
    let second = out.find("Oil Slides On Demand Worries").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn explicit_failover_route_overrides_the_news_default() {
    let p_a = MockConnector::builder("prov-alpha")
        .with_news_fn(|_| {
            Ok("Title: Only Primary Runs\nURL: https://example.com/a".to_string())
        })
        .build();
    let p_b = MockConnector::builder("prov-beta")
        .with_news_fn(|_| {
            Ok("Title: Fallback Should Not Run\nURL: https://example.com/b".to_string())
        })
        .build();

    let cfg = with_route(
        config(&[("prov-alpha", 1), ("prov-beta", 2)]),
        DataType::News,
        "prov-alpha",
        &["prov-beta"],
        false, // aggregation explicitly off
    );
    let gw = gateway(cfg, vec![p_a, p_b]);

    let out = gw.news("AAPL").await.unwrap();
    assert!(out.contains("Only Primary Runs"));
    assert!(!out.contains("Fallback Should Not Run"));
}
