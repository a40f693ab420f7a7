use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use billing_service::{
    config::AppConfig,
    metrics_server, observability,
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let api = cfg.api_client()?;
    let upload_url = cfg.upload_url(&api);

    let addr: SocketAddr = cfg
        .server
        .http_bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.http_bind_addr: {e}"))?;

    tracing::info!(
        remote = %api.base_url(),
        share_policy = ?cfg.allocation.share_policy,
        negative_pool = ?cfg.allocation.negative_pool,
        "starting billing service"
    );

    let state = AppState {
        api: Arc::new(api),
        allocation: cfg.allocation,
        upload_url,
    };
    server::serve(addr, state).await?;

    Ok(())
}
