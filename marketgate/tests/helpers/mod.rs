#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use marketgate::{Gateway, GatewayConfig, ProviderConnector, RouteConfig};
use marketgate_types::{DataType, ProviderConfig, ProviderId};

/// Shorthand for a typed provider id.
pub fn pid(s: &str) -> ProviderId {
    ProviderId::new(s)
}

/// Build a provider declaration for test configs.
pub fn provider(id: &str, priority: u32) -> ProviderConfig {
    ProviderConfig {
        id: ProviderId::new(id),
        provider_type: "mock".to_string(),
        name: format!("{id} display"),
        version: "1.0".to_string(),
        enabled: true,
        priority,
        api_key: None,
    }
}

/// Config declaring the given providers (ascending priority as listed) and
/// no explicit routes.
pub fn config(providers: &[(&str, u32)]) -> GatewayConfig {
    GatewayConfig {
        providers: providers.iter().map(|(id, p)| provider(id, *p)).collect(),
        ..GatewayConfig::default()
    }
}

/// Add an explicit chain for one data type.
pub fn with_route(
    mut cfg: GatewayConfig,
    data_type: DataType,
    primary: &str,
    fallbacks: &[&str],
    aggregate: bool,
) -> GatewayConfig {
    cfg.routing.data_type_routing.insert(
        data_type,
        RouteConfig {
            primary_provider_id: ProviderId::new(primary),
            fallback_provider_ids: fallbacks.iter().map(|f| ProviderId::new(*f)).collect(),
            aggregate_results: aggregate,
            timeout_seconds: None,
        },
    );
    cfg
}

/// Build a gateway over the given connectors and config.
pub fn gateway(cfg: GatewayConfig, connectors: Vec<Arc<dyn ProviderConnector>>) -> Gateway {
    let mut builder = Gateway::builder().config(cfg);
    for c in connectors {
        builder = builder.with_connector(c);
    }
    builder.build().expect("gateway builds")
}

/// Shared call-order recorder for asserting chain traversal.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn record(log: &CallLog, entry: &str) {
    log.lock().unwrap().push(entry.to_string());
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
