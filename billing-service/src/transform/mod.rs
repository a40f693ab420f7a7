use billing_client::domain::ReadingSubmission;

use crate::pipeline::{Envelope, PipelineError, Transform};

/// Pure validation of one reading submission.
///
/// Rules:
/// - room id must be positive.
/// - the reading must be a finite, non-negative number.
pub fn validate_submission(s: &ReadingSubmission) -> Result<(), String> {
    if s.room_id <= 0 {
        return Err(format!("room id must be positive, got {}", s.room_id));
    }
    if !s.electric.is_finite() {
        return Err(format!("room {}: reading must be a finite number", s.room_id));
    }
    if s.electric < 0.0 {
        return Err(format!("room {}: reading must be non-negative", s.room_id));
    }
    Ok(())
}

pub fn validate_reading_submission(
    env: Envelope<ReadingSubmission>,
) -> Result<Envelope<ReadingSubmission>, PipelineError> {
    match validate_submission(&env.payload) {
        Ok(()) => Ok(env),
        Err(reason) => Err(PipelineError::Transform(match env.line {
            Some(line) => format!("line {line}: {reason}"),
            None => reason,
        })),
    }
}

#[derive(Clone, Default)]
pub struct ReadingSubmissionValidation;

#[async_trait::async_trait]
impl Transform<ReadingSubmission> for ReadingSubmissionValidation {
    async fn apply(
        &self,
        input: Envelope<ReadingSubmission>,
    ) -> Result<Envelope<ReadingSubmission>, PipelineError> {
        match validate_reading_submission(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_reading_submission_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
