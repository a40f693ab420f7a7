use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{timestamp, BillingMonth, RoomId};

/// One billing-period measurement for one room.
///
/// Readings are never mutated in place; a new period's reading supersedes the
/// previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub id: i64,
    pub room_id: RoomId,
    pub start_electric: f64,
    pub end_electric: f64,
    pub month: BillingMonth,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub deleted: bool,
}

impl MeterReading {
    /// kWh consumed during the period (`end - start`).
    pub fn consumption(&self) -> f64 {
        self.end_electric - self.start_electric
    }
}

/// A newly entered end-reading for a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSubmission {
    pub room_id: RoomId,
    pub electric: f64,
}
