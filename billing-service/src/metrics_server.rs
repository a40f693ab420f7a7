use std::net::SocketAddr;

use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the Prometheus recorder and serves `/metrics` on `bind_addr`.
pub fn init(bind_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics.bind_addr: {e}"))?;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus metrics recorder: {e}"))?;

    // Only the first call installs; later handles would be detached from the recorder.
    let _ = PROM_HANDLE.set(handle);
    describe();

    tokio::spawn(async move {
        let app = Router::new().route("/metrics", get(metrics_handler));

        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                    tracing::error!(error = %e, "metrics server error");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to bind metrics listener");
            }
        }
    });

    Ok(())
}

fn describe() {
    metrics::describe_counter!("allocation_requests_total", "Cost splits computed");
    metrics::describe_counter!("allocation_rejected_total", "Cost splits rejected as invalid input");
    metrics::describe_counter!("http_requests_total", "Requests served by the billing API, by route");
    metrics::describe_counter!("upstream_errors_total", "Failed calls to the remote household API");
    metrics::describe_counter!("readings_imported_total", "Reading submissions delivered by the import pipeline");
    metrics::describe_counter!("reading_import_errors_total", "Import batches that failed after all retries");
    metrics::describe_counter!(
        "validation_reading_submission_rejected_total",
        "Reading submissions rejected by validation"
    );
    metrics::describe_histogram!(
        "reading_import_latency_seconds",
        "Time from reading a submission to delivering it upstream"
    );
}

async fn metrics_handler() -> String {
    PROM_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}
