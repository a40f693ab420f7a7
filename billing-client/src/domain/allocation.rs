use serde::{Deserialize, Serialize};

use super::{BillingMonth, RoomId};

/// Start/end meter values of one room for the billed period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomReading {
    pub room_id: RoomId,
    pub start_electric: f64,
    pub end_electric: f64,
}

impl RoomReading {
    pub fn consumption(&self) -> f64 {
        self.end_electric - self.start_electric
    }
}

/// Input of a monthly cost split.
///
/// `total_electric` covers every room plus the shared pool, so the rooms'
/// own consumption must not add up to more than it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub total_money: f64,
    pub total_electric: f64,
    pub month: BillingMonth,
    pub electrics: Vec<RoomReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAllocation {
    pub room_id: RoomId,
    pub room_name: String,
    /// This room's part of the shared pool. The wire name keeps the remote API's spelling.
    #[serde(rename = "elctricityUsedInLaundry")]
    pub electricity_used_in_laundry: f64,
    pub total_electric_used: f64,
    pub total_money: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub price_per_unit: f64,
    pub share_electric: f64,
    pub share_money: f64,
    pub electric_details: Vec<RoomAllocation>,
}

impl AllocationResult {
    /// Money attributed to rooms; equals the billed total unless part of the pool went unattributed.
    pub fn allocated_money(&self) -> f64 {
        self.electric_details.iter().map(|d| d.total_money).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_allocation_keeps_remote_spelling() {
        let detail = RoomAllocation {
            room_id: 1,
            room_name: "A".to_string(),
            electricity_used_in_laundry: 190.0,
            total_electric_used: 290.0,
            total_money: 10.0,
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["elctricityUsedInLaundry"], 190.0);
        assert_eq!(value["totalElectricUsed"], 290.0);
        assert!(value.get("electricityUsedInLaundry").is_none());
    }

    #[test]
    fn request_decodes_from_front_end_shape() {
        let json = r#"{
            "totalMoney": 1600000,
            "totalElectric": 550,
            "month": "2025-07",
            "electrics": [{"roomId": 1, "startElectric": 100, "endElectric": 200}]
        }"#;

        let req: AllocationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.total_money, 1_600_000.0);
        assert_eq!(req.electrics[0].consumption(), 100.0);
    }
}
