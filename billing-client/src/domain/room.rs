use serde::{Deserialize, Serialize};

pub type RoomId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub room_name: String,
}

/// Display name for `id`, falling back to `Room <id>` for rooms missing from the directory.
pub fn room_name(rooms: &[Room], id: RoomId) -> String {
    rooms
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.room_name.clone())
        .unwrap_or_else(|| format!("Room {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_name_falls_back_for_unknown_id() {
        let rooms = vec![Room { id: 1, room_name: "Phòng 101".to_string() }];

        assert_eq!(room_name(&rooms, 1), "Phòng 101");
        assert_eq!(room_name(&rooms, 7), "Room 7");
    }

    #[test]
    fn room_uses_camel_case_wire_names() {
        let room: Room = serde_json::from_str(r#"{"id": 3, "roomName": "Attic"}"#).unwrap();
        assert_eq!(room, Room { id: 3, room_name: "Attic".to_string() });
    }
}
