use std::sync::Arc;

use crate::helpers::{call_log, config, entries, gateway, pid, record, with_route};
use marketgate::{CircuitState, DataType, ErrorKind, GatewayError};
use marketgate_mock::MockConnector;

#[tokio::test]
async fn open_breaker_stops_reaching_the_adapter_and_records_service_error() {
    let log = call_log();

    let l1 = Arc::clone(&log);
    let flaky = MockConnector::builder("flaky")
        .with_stock_info_fn(move |_| {
            record(&l1, "flaky");
            Err(GatewayError::provider("flaky", "500 internal server error"))
        })
        .build();
    let l2 = Arc::clone(&log);
    let steady = MockConnector::builder("steady")
        .with_stock_info_fn(move |_| {
            record(&l2, "steady");
            Ok("from steady".to_string())
        })
        .build();

    let mut cfg = with_route(
        config(&[("flaky", 1), ("steady", 2)]),
        DataType::StockInfo,
        "flaky",
        &["steady"],
        false,
    );
    cfg.circuit_breaker.failure_threshold = 2;
    cfg.circuit_breaker.half_open_after_seconds = 3600;
    let gw = gateway(cfg, vec![flaky, steady]);

    // Two failures open the breaker; each request still succeeds via the
    // fallback.
    for _ in 0..2 {
        assert_eq!(gw.stock_info("AAPL").await.unwrap(), "from steady");
    }
    let metrics = gw.breaker_metrics();
    assert_eq!(metrics[&pid("flaky")].state, CircuitState::Open);

    // Third request: the adapter is not invoked, the rejection is recorded
    // against flaky's health as a service error, and the fallback serves.
    assert_eq!(gw.stock_info("AAPL").await.unwrap(), "from steady");
    assert_eq!(
        entries(&log)
            .iter()
            .filter(|e| e.as_str() == "flaky")
            .count(),
        2,
        "open breaker short-circuits the adapter call"
    );

    let health = gw.provider_health();
    let flaky_health = &health[&pid("flaky")];
    assert!(flaky_health.error_counts[&ErrorKind::ServiceError] >= 1);
}

#[tokio::test(start_paused = true)]
async fn breaker_recovers_through_a_successful_probe() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let healthy_again = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&healthy_again);
    let p1 = MockConnector::builder("p1")
        .with_stock_info_fn(move |_| {
            if flag.load(Ordering::SeqCst) {
                Ok("recovered".to_string())
            } else {
                Err(GatewayError::provider("p1", "503 service unavailable"))
            }
        })
        .build();

    let mut cfg = config(&[("p1", 1)]);
    cfg.circuit_breaker.failure_threshold = 2;
    cfg.circuit_breaker.half_open_after_seconds = 2;
    let gw = gateway(cfg, vec![p1]);

    for _ in 0..2 {
        let _ = gw.stock_info("AAPL").await;
    }
    assert_eq!(
        gw.breaker_metrics()[&pid("p1")].state,
        CircuitState::Open
    );

    // Upstream recovers; after the cooldown the probe closes the breaker.
    healthy_again.store(true, Ordering::SeqCst);
    tokio::time::advance(std::time::Duration::from_secs(2)).await;

    let out = gw.stock_info("AAPL").await.unwrap();
    assert_eq!(out, "recovered");
    assert_eq!(
        gw.breaker_metrics()[&pid("p1")].state,
        CircuitState::Closed
    );
}
