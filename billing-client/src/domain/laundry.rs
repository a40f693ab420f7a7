use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{timestamp, RoomId};

/// One use of the shared laundry machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundryRecord {
    pub id: i64,
    pub room_id: RoomId,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
}

/// Laundry usage of one room over one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundryStats {
    pub room_id: RoomId,
    pub room_name: String,
    pub count: u32,
    pub detail_time: Vec<LaundryRecord>,
}
