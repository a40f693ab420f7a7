mod client;

pub use client::ApiClient;

use crate::domain::{
    AllocationRequest, AllocationResult, BillingMonth, LaundryStats, MeterReading,
    ReadingSubmission, Room, RoomId,
};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("remote API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid API base URL '{0}'")]
    InvalidUrl(String),
}

/// The household API that owns rooms, reading history and the laundry log.
#[async_trait::async_trait]
pub trait BillingApi: Send + Sync {
    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError>;

    async fn list_readings(&self) -> Result<Vec<MeterReading>, ApiError>;

    async fn save_readings(&self, submissions: &[ReadingSubmission]) -> Result<(), ApiError>;

    /// Server-side cost split, for comparison with the local allocation engine.
    async fn calculate(&self, request: &AllocationRequest) -> Result<AllocationResult, ApiError>;

    async fn laundry_stats(&self, month: BillingMonth) -> Result<Vec<LaundryStats>, ApiError>;

    async fn record_laundry(&self, room_id: RoomId) -> Result<(), ApiError>;

    /// Where a browser starts the Drive upload flow. Never fetched by the client.
    fn drive_upload_url(&self) -> String;
}
