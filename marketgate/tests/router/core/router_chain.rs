use std::sync::Arc;

use crate::helpers::{call_log, config, entries, gateway, record, with_route};
use marketgate::DataType;
use marketgate_mock::MockConnector;

#[tokio::test]
async fn default_chain_orders_enabled_providers_by_ascending_priority() {
    let log = call_log();

    let l1 = Arc::clone(&log);
    let low_priority = MockConnector::builder("backup")
        .with_stock_info_fn(move |_| {
            record(&l1, "backup");
            Ok("from backup".to_string())
        })
        .build();
    let l2 = Arc::clone(&log);
    let high_priority = MockConnector::builder("primary")
        .with_stock_info_fn(move |_| {
            record(&l2, "primary");
            Ok("from primary".to_string())
        })
        .build();

    // Declared backup-first, but priority 1 beats priority 9.
    let cfg = config(&[("backup", 9), ("primary", 1)]);
    let gw = gateway(cfg, vec![low_priority, high_priority]);

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "from primary");
    assert_eq!(entries(&log), vec!["primary"]);
}

#[tokio::test]
async fn disabled_providers_never_enter_the_default_chain() {
    let log = call_log();

    let l1 = Arc::clone(&log);
    let off = MockConnector::builder("off")
        .with_stock_info_fn(move |_| {
            record(&l1, "off");
            Ok("from off".to_string())
        })
        .build();
    let l2 = Arc::clone(&log);
    let on = MockConnector::builder("on")
        .with_stock_info_fn(move |_| {
            record(&l2, "on");
            Ok("from on".to_string())
        })
        .build();

    let mut cfg = config(&[("off", 1), ("on", 2)]);
    cfg.providers[0].enabled = false;
    let gw = gateway(cfg, vec![off, on]);

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "from on");
    assert_eq!(entries(&log), vec!["on"]);
}

#[tokio::test]
async fn unknown_ids_in_an_explicit_chain_are_silently_skipped() {
    let p1 = MockConnector::builder("real")
        .with_stock_info_fn(|_| Ok("from real".to_string()))
        .build();

    // "ghost" is declared in config but no connector was registered for it.
    let cfg = with_route(
        config(&[("real", 1), ("ghost", 2)]),
        DataType::StockInfo,
        "ghost",
        &["real"],
        false,
    );
    let gw = gateway(cfg, vec![p1]);

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "from real");
}

#[tokio::test]
async fn duplicate_ids_in_a_chain_keep_first_occurrence() {
    let log = call_log();
    let l1 = Arc::clone(&log);
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(move |_| {
            record(&l1, "p1");
            Err(marketgate::GatewayError::provider("p1", "500 server error"))
        })
        .build();

    let cfg = with_route(
        config(&[("p1", 1)]),
        DataType::StockInfo,
        "p1",
        &["p1", "p1"],
        false,
    );
    let gw = gateway(cfg, vec![p1]);

    let _ = gw.stock_info("AAPL").await;
    assert_eq!(entries(&log), vec!["p1"], "deduplicated to one attempt");
}

#[tokio::test]
async fn builder_rejects_duplicate_connectors_and_empty_registries() {
    let err = marketgate::Gateway::builder().build().unwrap_err();
    assert!(err.to_string().contains("no connectors"));

    let a = MockConnector::builder("same").fixtures().build();
    let b = MockConnector::builder("same").fixtures().build();
    let err = marketgate::Gateway::builder()
        .with_connector(a)
        .with_connector(b)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("duplicate connector"));
}
