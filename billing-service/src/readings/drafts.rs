use billing_client::domain::{MeterReading, ReadingSubmission, Room, RoomId};
use time::OffsetDateTime;

use super::{changed_submissions, latest_per_room};

/// A reading being entered for one room: start is fixed, end is edited.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingDraft {
    pub room_id: RoomId,
    pub start_electric: f64,
    pub end_electric: f64,
    /// When the room's latest stored reading was last updated.
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("there are no rooms to add")]
    NoRooms,
    #[error("every room already has a draft")]
    AllRoomsAdded,
    #[error("add at least one reading before saving")]
    Empty,
    #[error("no reading changed since the last save")]
    NoChanges,
}

/// The reading-entry form as an immutable list.
///
/// Every update consumes the current list and returns the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingDrafts {
    drafts: Vec<ReadingDraft>,
}

fn draft_for(room_id: RoomId, history: &[MeterReading]) -> ReadingDraft {
    match latest_per_room(history).get(&room_id) {
        Some(latest) => ReadingDraft {
            room_id,
            start_electric: latest.end_electric,
            end_electric: latest.end_electric,
            updated_at: Some(latest.updated_at),
        },
        None => ReadingDraft {
            room_id,
            start_electric: 0.0,
            end_electric: 0.0,
            updated_at: None,
        },
    }
}

impl ReadingDrafts {
    /// One draft per room that already has a reading, continuing from its last end-reading.
    pub fn seed(rooms: &[Room], history: &[MeterReading]) -> Self {
        let latest = latest_per_room(history);
        let drafts = rooms
            .iter()
            .filter(|room| latest.contains_key(&room.id))
            .map(|room| draft_for(room.id, history))
            .collect();
        Self { drafts }
    }

    pub fn drafts(&self) -> &[ReadingDraft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Appends a draft for the first room, in directory order, that has none yet.
    pub fn add_next_room(self, rooms: &[Room], history: &[MeterReading]) -> Result<Self, DraftError> {
        if rooms.is_empty() {
            return Err(DraftError::NoRooms);
        }

        let next = rooms
            .iter()
            .find(|room| !self.drafts.iter().any(|d| d.room_id == room.id))
            .ok_or(DraftError::AllRoomsAdded)?;

        let mut drafts = self.drafts;
        drafts.push(draft_for(next.id, history));
        Ok(Self { drafts })
    }

    pub fn remove(self, room_id: RoomId) -> Self {
        Self {
            drafts: self
                .drafts
                .into_iter()
                .filter(|d| d.room_id != room_id)
                .collect(),
        }
    }

    pub fn set_end(self, room_id: RoomId, end_electric: f64) -> Self {
        Self {
            drafts: self
                .drafts
                .into_iter()
                .map(|d| {
                    if d.room_id == room_id {
                        ReadingDraft { end_electric, ..d }
                    } else {
                        d
                    }
                })
                .collect(),
        }
    }

    /// The drafts worth sending: those whose end-reading moved since the last save.
    pub fn submissions(&self, history: &[MeterReading]) -> Result<Vec<ReadingSubmission>, DraftError> {
        if self.drafts.is_empty() {
            return Err(DraftError::Empty);
        }

        let all = self.drafts.iter().map(|d| ReadingSubmission {
            room_id: d.room_id,
            electric: d.end_electric,
        });
        let changed = changed_submissions(all, history);
        if changed.is_empty() {
            return Err(DraftError::NoChanges);
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{reading, rooms};
    use super::*;

    #[test]
    fn seed_continues_from_last_end_reading() {
        let history = vec![reading(1, 2, 50.0, 120.0, 3)];
        let drafts = ReadingDrafts::seed(&rooms(), &history);

        assert_eq!(drafts.len(), 1);
        let d = &drafts.drafts()[0];
        assert_eq!((d.room_id, d.start_electric, d.end_electric), (2, 120.0, 120.0));
        assert_eq!(d.updated_at, Some(history[0].updated_at));
    }

    #[test]
    fn add_next_room_fills_rooms_in_order_then_stops() {
        let history = vec![reading(1, 2, 50.0, 120.0, 3)];
        let drafts = ReadingDrafts::seed(&rooms(), &history)
            .add_next_room(&rooms(), &history)
            .unwrap();
        let ids: Vec<RoomId> = drafts.drafts().iter().map(|d| d.room_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(drafts.drafts()[1].start_electric, 0.0);

        let drafts = drafts.add_next_room(&rooms(), &history).unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(
            drafts.add_next_room(&rooms(), &history),
            Err(DraftError::AllRoomsAdded)
        );
    }

    #[test]
    fn add_next_room_without_rooms_fails() {
        let res = ReadingDrafts::default().add_next_room(&[], &[]);
        assert_eq!(res, Err(DraftError::NoRooms));
    }

    #[test]
    fn updates_return_new_lists() {
        let history = vec![reading(1, 1, 0.0, 100.0, 0), reading(2, 2, 0.0, 40.0, 0)];
        let seeded = ReadingDrafts::seed(&rooms(), &history);

        let edited = seeded.clone().set_end(1, 130.0);
        assert_eq!(seeded.drafts()[0].end_electric, 100.0);
        assert_eq!(edited.drafts()[0].end_electric, 130.0);
        assert_eq!(edited.drafts()[1].end_electric, 40.0);

        let removed = edited.remove(2);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.drafts()[0].room_id, 1);
    }

    #[test]
    fn submissions_only_include_changed_ends() {
        let history = vec![reading(1, 1, 0.0, 100.0, 0), reading(2, 2, 0.0, 40.0, 0)];
        let drafts = ReadingDrafts::seed(&rooms(), &history);

        assert_eq!(drafts.submissions(&history), Err(DraftError::NoChanges));
        assert_eq!(ReadingDrafts::default().submissions(&history), Err(DraftError::Empty));

        let changed = drafts.set_end(2, 55.0).submissions(&history).unwrap();
        assert_eq!(changed, vec![ReadingSubmission { room_id: 2, electric: 55.0 }]);
    }
}
