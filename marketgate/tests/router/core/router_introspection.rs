use crate::helpers::{config, gateway, pid, with_route};
use marketgate::{CircuitState, DataType, GatewayError};
use marketgate_mock::MockConnector;

#[tokio::test]
async fn health_and_breaker_snapshots_reflect_traffic() {
    let good = MockConnector::builder("good")
        .with_stock_info_fn(|_| Ok("payload".to_string()))
        .build();
    let bad = MockConnector::builder("bad")
        .with_stock_info_fn(|_| Err(GatewayError::provider("bad", "503 service unavailable")))
        .build();

    let cfg = with_route(
        config(&[("bad", 1), ("good", 2)]),
        DataType::StockInfo,
        "bad",
        &["good"],
        false,
    );
    let gw = gateway(cfg, vec![good, bad]);

    for _ in 0..2 {
        assert!(gw.stock_info("AAPL").await.is_ok());
    }

    let health = gw.provider_health();
    let bad_health = &health[&pid("bad")];
    assert!(bad_health.error_rate > 0.99);
    assert_eq!(bad_health.consecutive_failures, 2);
    assert!(bad_health.is_healthy, "below the unhealthy threshold of 3");

    let good_health = &health[&pid("good")];
    assert!(good_health.is_healthy);
    assert_eq!(good_health.error_rate, 0.0);
    assert!(good_health.average_latency_ms.is_some());
    assert!(good_health.last_success_at.is_some());

    let breakers = gw.breaker_metrics();
    assert_eq!(breakers[&pid("bad")].total_failures, 2);
    assert_eq!(breakers[&pid("bad")].state, CircuitState::Closed);
    assert_eq!(breakers[&pid("good")].total_successes, 2);
}
