//! Pure views over a room's reading history.
//!
//! Deleted records never count. "Latest" always means the newest `created_at`;
//! on ties the record that comes first in the history wins.

mod drafts;

use std::collections::HashMap;

use billing_client::domain::{MeterReading, ReadingSubmission, Room, RoomId, RoomReading};
use serde::Serialize;

pub use drafts::{DraftError, ReadingDraft, ReadingDrafts};

pub fn latest_per_room(history: &[MeterReading]) -> HashMap<RoomId, &MeterReading> {
    let mut latest: HashMap<RoomId, &MeterReading> = HashMap::new();
    for reading in history.iter().filter(|r| !r.deleted) {
        match latest.get(&reading.room_id) {
            Some(current) if current.created_at >= reading.created_at => {}
            _ => {
                latest.insert(reading.room_id, reading);
            }
        }
    }
    latest
}

/// Start/end values to pre-fill a cost split with, one entry per room in directory order.
pub fn calculation_inputs(rooms: &[Room], history: &[MeterReading]) -> Vec<RoomReading> {
    let latest = latest_per_room(history);
    rooms
        .iter()
        .map(|room| match latest.get(&room.id) {
            Some(r) => RoomReading {
                room_id: room.id,
                start_electric: r.start_electric,
                end_electric: r.end_electric,
            },
            None => RoomReading {
                room_id: room.id,
                start_electric: 0.0,
                end_electric: 0.0,
            },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub room_name: String,
    pub latest: Option<MeterReading>,
    pub consumption: f64,
    pub reading_count: usize,
}

pub fn room_summaries(rooms: &[Room], history: &[MeterReading]) -> Vec<RoomSummary> {
    let latest = latest_per_room(history);
    rooms
        .iter()
        .map(|room| {
            let latest = latest.get(&room.id).map(|r| (*r).clone());
            RoomSummary {
                room_id: room.id,
                room_name: room.room_name.clone(),
                consumption: latest.as_ref().map(MeterReading::consumption).unwrap_or(0.0),
                reading_count: history
                    .iter()
                    .filter(|r| !r.deleted && r.room_id == room.id)
                    .count(),
                latest,
            }
        })
        .collect()
}

/// Submissions whose value differs from the room's latest stored end-reading (0 without history).
pub fn changed_submissions<I>(submissions: I, history: &[MeterReading]) -> Vec<ReadingSubmission>
where
    I: IntoIterator<Item = ReadingSubmission>,
{
    let latest = latest_per_room(history);
    submissions
        .into_iter()
        .filter(|s| {
            let stored = latest.get(&s.room_id).map(|r| r.end_electric).unwrap_or(0.0);
            s.electric != stored
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use billing_client::domain::{MeterReading, Room, RoomId};
    use time::{Duration, OffsetDateTime};

    pub fn rooms() -> Vec<Room> {
        vec![
            Room { id: 1, room_name: "Phòng 1".to_string() },
            Room { id: 2, room_name: "Phòng 2".to_string() },
            Room { id: 3, room_name: "Phòng 3".to_string() },
        ]
    }

    pub fn reading(id: i64, room_id: RoomId, start: f64, end: f64, day: i64) -> MeterReading {
        let created_at = OffsetDateTime::UNIX_EPOCH + Duration::days(20_000 + day);
        MeterReading {
            id,
            room_id,
            start_electric: start,
            end_electric: end,
            month: billing_client::domain::BillingMonth::of(created_at),
            created_at,
            updated_at: created_at,
            deleted: false,
        }
    }
}
