use std::{fs::File, path::PathBuf};

use billing_client::domain::ReadingSubmission;
use csv::StringRecord;

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// CSV import of new end-readings.
///
/// Expected header columns (by name, any order, extra columns ignored):
/// - room_id
/// - electric
///
/// A malformed row becomes an error item; the rows after it are still read.
pub struct ReadingCsvFileSource {
    path: PathBuf,
}

impl ReadingCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn record_to_submission(
    record: &StringRecord,
    headers: &StringRecord,
) -> Result<ReadingSubmission, PipelineError> {
    let get = |name: &str| -> Result<&str, PipelineError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in CSV record")))
    };

    let room_id_str = get("room_id")?;
    let room_id = room_id_str
        .parse()
        .map_err(|e| PipelineError::Source(format!("invalid room_id '{room_id_str}': {e}")))?;

    let electric_str = get("electric")?;
    let electric = electric_str
        .parse()
        .map_err(|e| PipelineError::Source(format!("invalid electric '{electric_str}': {e}")))?;

    Ok(ReadingSubmission { room_id, electric })
}

fn at_line(e: PipelineError, line: u64) -> PipelineError {
    match e {
        PipelineError::Source(msg) => PipelineError::Source(format!("line {line}: {msg}")),
        other => other,
    }
}

#[async_trait::async_trait]
impl Source<ReadingSubmission> for ReadingCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<ReadingSubmission> {
        // Household-sized files; the blocking reader stays on the runtime thread.
        let path = self.path.clone();
        let s = async_stream::stream! {
            let file = match File::open(&path) {
                Ok(f) => f,
                Err(e) => {
                    yield Err(PipelineError::Source(format!(
                        "failed to open CSV file {}: {e}",
                        path.display()
                    )));
                    return;
                }
            };

            let mut rdr = csv::Reader::from_reader(file);
            let headers = match rdr.headers() {
                Ok(h) => h.clone(),
                Err(e) => {
                    yield Err(PipelineError::Source(format!("failed to read CSV headers: {e}")));
                    return;
                }
            };

            for result in rdr.records() {
                let record = match result {
                    Ok(r) => r,
                    Err(e) => {
                        yield Err(PipelineError::Source(format!("failed to read CSV record: {e}")));
                        continue;
                    }
                };
                let line = record.position().map(|p| p.line()).unwrap_or_default();

                match record_to_submission(&record, &headers) {
                    Ok(submission) => {
                        yield Ok(Envelope::new(submission).at_line(line));
                    }
                    Err(e) => {
                        metrics::counter!("reading_csv_parse_errors_total").increment(1);
                        yield Err(at_line(e, line));
                    }
                }
            }
        };

        Box::pin(s)
    }
}
