use std::time::Duration;

use crate::helpers::{config, gateway, pid, with_route};
use marketgate::{DataType, ErrorKind, GatewayError};
use marketgate_mock::MockConnector;

#[tokio::test(start_paused = true)]
async fn chain_deadline_bounds_the_whole_pass() {
    let slow = MockConnector::builder("slow")
        .delay(Duration::from_secs(30))
        .with_stock_info_fn(|_| Ok("too late".to_string()))
        .build();

    let mut cfg = with_route(
        config(&[("slow", 1)]),
        DataType::StockInfo,
        "slow",
        &[],
        false,
    );
    cfg.routing
        .data_type_routing
        .get_mut(&DataType::StockInfo)
        .unwrap()
        .timeout_seconds = Some(1);
    // Keep the per-call breaker timeout out of the way.
    cfg.circuit_breaker.timeout_seconds = 3600;
    let gw = gateway(cfg, vec![slow]);

    let err = gw.stock_info("AAPL").await.unwrap_err();
    assert!(
        matches!(
            err,
            GatewayError::RequestTimeout {
                operation: DataType::StockInfo
            }
        ),
        "{err}"
    );
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test(start_paused = true)]
async fn per_call_breaker_timeout_advances_the_chain() {
    let slow = MockConnector::builder("slow")
        .delay(Duration::from_secs(10))
        .with_stock_info_fn(|_| Ok("too late".to_string()))
        .build();
    let fast = MockConnector::builder("fast")
        .with_stock_info_fn(|_| Ok("in time".to_string()))
        .build();

    let mut cfg = with_route(
        config(&[("slow", 1), ("fast", 2)]),
        DataType::StockInfo,
        "slow",
        &["fast"],
        false,
    );
    cfg.circuit_breaker.timeout_seconds = 1;
    cfg.performance.default_timeout_seconds = 0; // no chain deadline
    let gw = gateway(cfg, vec![slow, fast]);

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "in time");

    let health = gw.provider_health();
    assert_eq!(health[&pid("slow")].error_counts[&ErrorKind::Timeout], 1);
}
