use std::{sync::Arc, time::Duration};

use billing_client::{domain::ReadingSubmission, ApiError, BillingApi};
use futures::StreamExt;

use crate::pipeline::{Envelope, PipelineError, RunSummary, Sink};

/// Posts reading submissions to the remote API in batches.
pub struct RemoteReadingSink {
    api: Arc<dyn BillingApi>,
    batch_size: usize,
    max_retries: u32,
    retry_backoff: Duration,
}

impl RemoteReadingSink {
    pub fn new(
        api: Arc<dyn BillingApi>,
        batch_size: usize,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            api,
            batch_size: batch_size.max(1),
            max_retries,
            retry_backoff,
        }
    }

    async fn flush_batch(&self, batch: &[Envelope<ReadingSubmission>]) -> Result<(), PipelineError> {
        if batch.is_empty() {
            return Ok(());
        }

        let submissions: Vec<ReadingSubmission> = batch.iter().map(|e| e.payload.clone()).collect();

        let mut attempt: u32 = 0;
        loop {
            match self.api.save_readings(&submissions).await {
                Ok(()) => {
                    metrics::counter!("readings_imported_total").increment(batch.len() as u64);

                    if let Some(min_received) = batch.iter().map(|e| e.received_at).min() {
                        if let Ok(dur) = std::time::SystemTime::now().duration_since(min_received) {
                            metrics::histogram!("reading_import_latency_seconds").record(dur.as_secs_f64());
                        }
                    }

                    return Ok(());
                }
                Err(e) if attempt < self.max_retries && retryable(&e) => {
                    attempt += 1;
                    let sleep_for = self.retry_backoff * attempt;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        "reading import batch failed, retrying with backoff"
                    );
                    tokio::time::sleep(sleep_for).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, records = batch.len(), "reading import batch failed, giving up");
                    metrics::counter!("reading_import_errors_total").increment(1);
                    return Err(PipelineError::Sink(e.to_string()));
                }
            }
        }
    }
}

/// Client errors (4xx) will not improve on retry.
fn retryable(e: &ApiError) -> bool {
    match e {
        ApiError::Status { status, .. } => *status >= 500 || *status == 429,
        ApiError::Network(_) => true,
        ApiError::Decode(_) | ApiError::InvalidUrl(_) => false,
    }
}

#[async_trait::async_trait]
impl Sink<ReadingSubmission> for RemoteReadingSink {
    async fn run<S>(&self, mut input: S) -> Result<RunSummary, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<ReadingSubmission>, PipelineError>>
            + Send
            + Unpin
            + 'static,
    {
        let mut summary = RunSummary::default();
        let mut buffer: Vec<Envelope<ReadingSubmission>> = Vec::with_capacity(self.batch_size);

        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "skipping reading submission");
                    summary.skipped += 1;
                    continue;
                }
            };

            buffer.push(env);
            if buffer.len() >= self.batch_size {
                self.flush_batch(&buffer).await?;
                summary.delivered += buffer.len();
                summary.batches += 1;
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            self.flush_batch(&buffer).await?;
            summary.delivered += buffer.len();
            summary.batches += 1;
        }

        Ok(summary)
    }
}
