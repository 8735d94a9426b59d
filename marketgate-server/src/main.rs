use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use marketgate_server::{server, wiring};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = marketgate_core::config::load(config_path.as_deref())
        .context("invalid configuration")?;

    let gateway = Arc::new(wiring::build_gateway(cfg)?);

    let probe_interval = gateway
        .config()
        .performance
        .health_probe_interval_seconds;
    let _probe_task = (probe_interval > 0).then(|| {
        info!(interval_s = probe_interval, "starting background health probes");
        Arc::clone(gateway.health_monitor()).spawn_probe_task(
            Duration::from_secs(probe_interval),
            gateway.connectors().to_vec(),
        )
    });

    info!(
        providers = gateway.connectors().len(),
        "marketgate-server listening on stdio"
    );
    server::run(gateway, tokio::io::stdin(), tokio::io::stdout()).await
}
