use billing_client::ApiError;

use crate::allocation::AllocationError;

#[derive(thiserror::Error, Debug)]
pub enum BillingError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error("invalid reading: {0}")]
    InvalidReading(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("remote API failure: {0}")]
    Upstream(#[from] ApiError),
}
