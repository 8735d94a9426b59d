//! Startup wiring: adapter instantiation from configuration and gateway
//! construction.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;

use marketgate::{Gateway, ProviderConnector};
use marketgate_mock::MockConnector;
use marketgate_types::GatewayConfig;

/// Instantiate one connector per enabled provider declaration.
///
/// # Errors
/// Fails startup on a provider type this build has no adapter for.
pub fn build_connectors(cfg: &GatewayConfig) -> anyhow::Result<Vec<Arc<dyn ProviderConnector>>> {
    let mut connectors: Vec<Arc<dyn ProviderConnector>> = Vec::new();
    for p in cfg.providers.iter().filter(|p| p.enabled) {
        let connector: Arc<dyn ProviderConnector> = match p.provider_type.as_str() {
            "mock" => {
                let name = if p.name.is_empty() {
                    p.id.to_string()
                } else {
                    p.name.clone()
                };
                Arc::new(MockConnector::with_fixtures(p.id.clone(), name))
            }
            other => bail!("provider {} declares unsupported type {other:?}", p.id),
        };
        info!(provider = %p.id, kind = %p.provider_type, "registered provider");
        connectors.push(connector);
    }
    Ok(connectors)
}

/// Build the gateway from a validated configuration snapshot.
///
/// # Errors
/// Propagates adapter instantiation and builder validation failures.
pub fn build_gateway(cfg: GatewayConfig) -> anyhow::Result<Gateway> {
    let connectors = build_connectors(&cfg)?;
    let mut builder = Gateway::builder().config(cfg);
    for c in connectors {
        builder = builder.with_connector(c);
    }
    builder.build().context("failed to assemble gateway")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_wires_a_working_gateway() {
        let gw = build_gateway(GatewayConfig::default()).unwrap();
        assert_eq!(gw.connectors().len(), 1);
    }

    #[test]
    fn unknown_provider_type_fails_startup() {
        let mut cfg = GatewayConfig::default();
        cfg.providers[0].provider_type = "carrier-pigeon".to_string();
        let err = build_gateway(cfg).unwrap_err();
        assert!(err.to_string().contains("unsupported type"));
    }

    #[test]
    fn disabled_providers_are_not_instantiated() {
        let mut cfg = GatewayConfig::default();
        cfg.providers[0].enabled = false;
        // All providers disabled leaves nothing to register.
        let err = build_gateway(cfg).unwrap_err();
        assert!(err.to_string().contains("assemble gateway"));
    }
}
