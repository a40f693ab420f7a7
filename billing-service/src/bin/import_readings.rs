use anyhow::{bail, Result};
use billing_client::domain::ReadingSubmission;
use billing_service::{
    config::AppConfig, observability, pipeline::Pipeline, sinks::RemoteReadingSink,
    sources::ReadingCsvFileSource, transform,
};
use std::{env, sync::Arc, time::Duration};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: import_readings <csv_file_path>");
    }
    let file_path = &args[1];

    let cfg = AppConfig::load()?;
    let api = Arc::new(cfg.api_client()?);

    let import_cfg = &cfg.import;
    let sink = RemoteReadingSink::new(
        api,
        import_cfg.batch_size,
        import_cfg.max_retries,
        Duration::from_millis(import_cfg.retry_backoff_ms),
    );

    let pipeline: Pipeline<_, ReadingSubmission, _> = Pipeline {
        source: ReadingCsvFileSource::new(file_path),
        transforms: vec![Arc::new(transform::ReadingSubmissionValidation)],
        sink,
    };

    let summary = pipeline.run().await?;
    tracing::info!(
        delivered = summary.delivered,
        skipped = summary.skipped,
        batches = summary.batches,
        "reading import finished"
    );

    if summary.skipped > 0 {
        bail!("{} row(s) were skipped, see log for details", summary.skipped);
    }

    Ok(())
}
