//! Monthly laundry-machine usage per room.

use std::collections::HashMap;

use billing_client::domain::{BillingMonth, LaundryRecord, LaundryStats, Room, RoomId};

fn stats_for(room: &Room, mut detail: Vec<LaundryRecord>) -> LaundryStats {
    detail.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    LaundryStats {
        room_id: room.id,
        room_name: room.room_name.clone(),
        count: u32::try_from(detail.len()).unwrap_or(u32::MAX),
        detail_time: detail,
    }
}

/// One entry per room, in directory order, holding that room's events of `month` oldest first.
///
/// Events of rooms missing from the directory are dropped.
pub fn aggregate(rooms: &[Room], records: &[LaundryRecord], month: BillingMonth) -> Vec<LaundryStats> {
    rooms
        .iter()
        .map(|room| {
            let detail = records
                .iter()
                .filter(|r| r.room_id == room.id && month.contains(r.created_at))
                .cloned()
                .collect();
            stats_for(room, detail)
        })
        .collect()
}

/// Re-aggregates a remote stats response so every room appears, with ordered, counted events.
pub fn normalize(rooms: &[Room], stats: Vec<LaundryStats>, month: BillingMonth) -> Vec<LaundryStats> {
    let records: Vec<LaundryRecord> = stats.into_iter().flat_map(|s| s.detail_time).collect();
    aggregate(rooms, &records, month)
}

pub fn total_count(stats: &[LaundryStats]) -> u32 {
    stats.iter().map(|s| s.count).sum()
}

pub fn usage_counts(stats: &[LaundryStats]) -> HashMap<RoomId, u32> {
    stats.iter().map(|s| (s.room_id, s.count)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn rooms() -> Vec<Room> {
        vec![
            Room { id: 1, room_name: "Phòng 1".to_string() },
            Room { id: 2, room_name: "Phòng 2".to_string() },
        ]
    }

    fn record(id: i64, room_id: RoomId, created_at: time::OffsetDateTime) -> LaundryRecord {
        LaundryRecord { id, room_id, created_at }
    }

    fn july() -> BillingMonth {
        "2025-07".parse().unwrap()
    }

    #[test]
    fn aggregate_counts_month_events_per_room_in_order() {
        let records = vec![
            record(3, 1, datetime!(2025-07-20 09:00:00 UTC)),
            record(1, 1, datetime!(2025-07-02 18:30:00 UTC)),
            record(2, 2, datetime!(2025-06-30 23:00:00 UTC)),
            record(4, 1, datetime!(2025-08-01 07:00:00 UTC)),
            record(5, 9, datetime!(2025-07-05 07:00:00 UTC)),
        ];

        let stats = aggregate(&rooms(), &records, july());

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].count, 2);
        let ids: Vec<i64> = stats[0].detail_time.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(stats[1].room_name, "Phòng 2");
        assert_eq!(stats[1].count, 0);
        assert_eq!(total_count(&stats), 2);
    }

    #[test]
    fn normalize_fills_missing_rooms_and_recounts() {
        let remote = vec![LaundryStats {
            room_id: 2,
            room_name: "stale name".to_string(),
            count: 7,
            detail_time: vec![
                record(11, 2, datetime!(2025-07-09 10:00:00 UTC)),
                record(10, 2, datetime!(2025-07-01 10:00:00 UTC)),
            ],
        }];

        let stats = normalize(&rooms(), remote, july());

        assert_eq!(stats[0].room_id, 1);
        assert_eq!(stats[0].count, 0);
        assert_eq!(stats[1].room_name, "Phòng 2");
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].detail_time[0].id, 10);

        let counts = usage_counts(&stats);
        assert_eq!(counts[&1], 0);
        assert_eq!(counts[&2], 2);
    }
}
