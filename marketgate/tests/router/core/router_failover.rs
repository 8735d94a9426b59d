use std::sync::Arc;

use crate::helpers::{call_log, config, entries, gateway, pid, record, with_route};
use marketgate::{DataType, ErrorKind, GatewayError};
use marketgate_mock::MockConnector;

#[tokio::test]
async fn failover_visits_chain_in_order_and_stops_on_first_success() {
    let log = call_log();

    let l1 = Arc::clone(&log);
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(move |_| {
            record(&l1, "p1");
            Err(GatewayError::provider("p1", "503 service unavailable"))
        })
        .build();
    let l2 = Arc::clone(&log);
    let p2 = MockConnector::builder("p2")
        .with_stock_info_fn(move |t| {
            record(&l2, "p2");
            Ok(format!("info for {t} from p2"))
        })
        .build();
    let l3 = Arc::clone(&log);
    let p3 = MockConnector::builder("p3")
        .with_stock_info_fn(move |_| {
            record(&l3, "p3");
            Ok("never reached".to_string())
        })
        .build();

    let cfg = with_route(
        config(&[("p1", 1), ("p2", 2), ("p3", 3)]),
        DataType::StockInfo,
        "p1",
        &["p2", "p3"],
        false,
    );
    let gw = gateway(cfg, vec![p1, p2, p3]);

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "info for AAPL from p2");
    assert_eq!(entries(&log), vec!["p1", "p2"]);
}

#[tokio::test]
async fn not_found_is_terminal_in_failover() {
    let log = call_log();

    let l1 = Arc::clone(&log);
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(move |t| {
            record(&l1, "p1");
            Err(GatewayError::not_found(format!("stock info for {t}")))
        })
        .build();
    let l2 = Arc::clone(&log);
    let p2 = MockConnector::builder("p2")
        .with_stock_info_fn(move |_| {
            record(&l2, "p2");
            Ok("should not be called".to_string())
        })
        .build();
    let l3 = Arc::clone(&log);
    let p3 = MockConnector::builder("p3")
        .with_stock_info_fn(move |_| {
            record(&l3, "p3");
            Ok("should not be called".to_string())
        })
        .build();

    let cfg = with_route(
        config(&[("p1", 1), ("p2", 2), ("p3", 3)]),
        DataType::StockInfo,
        "p1",
        &["p2", "p3"],
        false,
    );
    let gw = gateway(cfg, vec![p1, p2, p3]);

    let err = gw.stock_info("ZZZZ").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(entries(&log), vec!["p1"], "p2 and p3 must not be called");
}

#[tokio::test]
async fn exhausted_chain_collapses_into_aggregate_failure() {
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(|_| Err(GatewayError::provider("p1", "connection refused")))
        .build();
    let p2 = MockConnector::builder("p2")
        .with_stock_info_fn(|_| Err(GatewayError::provider("p2", "503 service unavailable")))
        .build();

    let cfg = with_route(
        config(&[("p1", 1), ("p2", 2)]),
        DataType::StockInfo,
        "p1",
        &["p2"],
        false,
    );
    let gw = gateway(cfg, vec![p1, p2]);

    let err = gw.stock_info("AAPL").await.unwrap_err();
    let GatewayError::AllProvidersFailed(agg) = err else {
        panic!("expected aggregate failure, got {err}");
    };
    assert_eq!(agg.data_type, DataType::StockInfo);
    assert_eq!(
        agg.attempted,
        vec![pid("p1"), pid("p2")],
        "attempted providers preserved in chain order"
    );
    assert_eq!(agg.errors.len(), 2);
    assert_eq!(agg.errors[0].kind, ErrorKind::NetworkError);
    assert_eq!(agg.errors[1].kind, ErrorKind::ServiceError);
    assert_eq!(agg.surfaced_kind(), ErrorKind::ServiceError);
}

#[tokio::test]
async fn all_rate_limited_surfaces_rate_limit() {
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(|_| {
            Err(GatewayError::RateLimited {
                provider: "p1".into(),
            })
        })
        .build();
    let p2 = MockConnector::builder("p2")
        .with_stock_info_fn(|_| Err(GatewayError::provider("p2", "429 too many requests")))
        .build();

    let cfg = with_route(
        config(&[("p1", 1), ("p2", 2)]),
        DataType::StockInfo,
        "p1",
        &["p2"],
        false,
    );
    let gw = gateway(cfg, vec![p1, p2]);

    let err = gw.stock_info("AAPL").await.unwrap_err();
    let GatewayError::AllProvidersFailed(agg) = err else {
        panic!("expected aggregate failure");
    };
    assert_eq!(agg.surfaced_kind(), ErrorKind::RateLimitExceeded);
}

#[tokio::test]
async fn unhealthy_providers_are_skipped_before_the_breaker() {
    let log = call_log();

    let l1 = Arc::clone(&log);
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(move |_| {
            record(&l1, "p1");
            Ok("from p1".to_string())
        })
        .build();
    let l2 = Arc::clone(&log);
    let p2 = MockConnector::builder("p2")
        .with_stock_info_fn(move |_| {
            record(&l2, "p2");
            Ok("from p2".to_string())
        })
        .build();

    let cfg = with_route(
        config(&[("p1", 1), ("p2", 2)]),
        DataType::StockInfo,
        "p1",
        &["p2"],
        false,
    );
    let gw = gateway(cfg, vec![p1, p2]);

    // Three consecutive failures mark p1 unhealthy.
    for _ in 0..3 {
        gw.health_monitor()
            .record_failure(&pid("p1"), ErrorKind::NetworkError);
    }

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "from p2");
    assert_eq!(entries(&log), vec!["p2"], "p1 skipped while unhealthy");
}

#[tokio::test]
async fn caller_cancellation_stops_the_chain_without_recording() {
    let log = call_log();

    let l1 = Arc::clone(&log);
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(move |_| {
            record(&l1, "p1");
            Err(GatewayError::Cancelled)
        })
        .build();
    let l2 = Arc::clone(&log);
    let p2 = MockConnector::builder("p2")
        .with_stock_info_fn(move |_| {
            record(&l2, "p2");
            Ok("unreachable".to_string())
        })
        .build();

    let cfg = with_route(
        config(&[("p1", 1), ("p2", 2)]),
        DataType::StockInfo,
        "p1",
        &["p2"],
        false,
    );
    let gw = gateway(cfg, vec![p1, p2]);

    let err = gw.stock_info("AAPL").await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(entries(&log), vec!["p1"]);
    // Cancellation is never a provider failure.
    let health = gw.provider_health();
    assert!(
        health
            .get(&pid("p1"))
            .is_none_or(|s| s.error_counts.is_empty()),
        "no failure recorded for cancellation"
    );
}

#[tokio::test]
async fn invalid_ticker_is_rejected_before_any_provider_call() {
    let log = call_log();
    let l1 = Arc::clone(&log);
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(move |_| {
            record(&l1, "p1");
            Ok("x".to_string())
        })
        .build();

    let gw = gateway(config(&[("p1", 1)]), vec![p1]);
    let err = gw.stock_info("NOT A TICKER!!").await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArg(_)));
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn unsupported_when_no_provider_advertises_the_operation() {
    // p1 only supports news, but the request is for stock info.
    let p1 = MockConnector::builder("p1")
        .with_news_fn(|_| Ok(String::new()))
        .build();

    let gw = gateway(config(&[("p1", 1)]), vec![p1]);
    let err = gw.stock_info("AAPL").await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Unsupported {
            operation: DataType::StockInfo
        }
    ));
}
