pub mod allocation;
pub mod config;
pub mod error;
pub mod laundry;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod readings;
pub mod server;
pub mod service;
pub mod sinks;
pub mod sources;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use allocation::{AllocationEngine, AllocationError};
pub use error::BillingError;
pub use pipeline::{Envelope, Pipeline};
