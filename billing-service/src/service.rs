//! Operations that combine remote data with the local billing logic.

use billing_client::{
    domain::{
        AllocationRequest, AllocationResult, BillingMonth, LaundryStats, ReadingSubmission,
        RoomId, RoomReading,
    },
    BillingApi,
};

use crate::{
    allocation::{
        self, AllocationEngine, EqualSplit, LaundryUsage, ProportionalToUsage, SharePolicy,
    },
    config::{AllocationConfig, SharePolicyKind},
    error::BillingError,
    laundry,
    readings::{self, RoomSummary},
    transform,
};

/// Builds the engine for `config`; laundry weighting needs the month's usage from the remote API.
pub async fn engine_for(
    api: &dyn BillingApi,
    config: &AllocationConfig,
    month: BillingMonth,
) -> Result<AllocationEngine, BillingError> {
    let policy: Box<dyn SharePolicy> = match config.share_policy {
        SharePolicyKind::Equal => Box::new(EqualSplit),
        SharePolicyKind::Proportional => Box::new(ProportionalToUsage),
        SharePolicyKind::LaundryUsage => {
            let stats = api.laundry_stats(month).await?;
            Box::new(LaundryUsage::new(laundry::usage_counts(&stats)))
        }
    };
    Ok(AllocationEngine::new(policy).with_negative_pool(config.negative_pool))
}

/// Runs the cost split locally, with room names from the remote directory.
///
/// The request is checked before anything is fetched.
pub async fn allocate(
    api: &dyn BillingApi,
    config: &AllocationConfig,
    request: &AllocationRequest,
) -> Result<AllocationResult, BillingError> {
    allocation::precheck(request)?;

    let rooms = api.list_rooms().await?;
    let engine = engine_for(api, config, request.month).await?;
    Ok(engine.allocate(request, &rooms)?)
}

pub async fn room_summaries(api: &dyn BillingApi) -> Result<Vec<RoomSummary>, BillingError> {
    let (rooms, history) = futures::try_join!(api.list_rooms(), api.list_readings())?;
    Ok(readings::room_summaries(&rooms, &history))
}

pub async fn calculation_defaults(api: &dyn BillingApi) -> Result<Vec<RoomReading>, BillingError> {
    let (rooms, history) = futures::try_join!(api.list_rooms(), api.list_readings())?;
    Ok(readings::calculation_inputs(&rooms, &history))
}

/// Validates the submissions and forwards the ones that changed. Returns how many were sent.
pub async fn save_readings(
    api: &dyn BillingApi,
    submissions: Vec<ReadingSubmission>,
) -> Result<usize, BillingError> {
    for s in &submissions {
        transform::validate_submission(s).map_err(BillingError::InvalidReading)?;
    }

    let history = api.list_readings().await?;
    let changed = readings::changed_submissions(submissions, &history);
    if changed.is_empty() {
        tracing::info!("no reading changed, nothing to save");
        return Ok(0);
    }

    api.save_readings(&changed).await?;
    tracing::info!(saved = changed.len(), "readings saved");
    Ok(changed.len())
}

pub async fn laundry_stats(
    api: &dyn BillingApi,
    month: BillingMonth,
) -> Result<Vec<LaundryStats>, BillingError> {
    let (rooms, stats) = futures::try_join!(api.list_rooms(), api.laundry_stats(month))?;
    Ok(laundry::normalize(&rooms, stats, month))
}

pub async fn record_laundry(api: &dyn BillingApi, room_id: RoomId) -> Result<(), BillingError> {
    if room_id <= 0 {
        return Err(BillingError::InvalidReading(format!(
            "room id must be positive, got {room_id}"
        )));
    }
    api.record_laundry(room_id).await?;
    tracing::info!(room_id, "laundry use recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{allocation::NegativePoolPolicy, readings::fixtures, testing::FakeApi};
    use billing_client::domain::{LaundryRecord, Room};
    use time::macros::datetime;

    fn two_room_api() -> FakeApi {
        FakeApi::default().with_rooms(vec![
            Room { id: 1, room_name: "Room A".to_string() },
            Room { id: 2, room_name: "Room B".to_string() },
        ])
    }

    fn bill() -> AllocationRequest {
        AllocationRequest {
            total_money: 1_600_000.0,
            total_electric: 550.0,
            month: "2025-07".parse().unwrap(),
            electrics: vec![
                RoomReading { room_id: 1, start_electric: 100.0, end_electric: 200.0 },
                RoomReading { room_id: 2, start_electric: 50.0, end_electric: 120.0 },
            ],
        }
    }

    fn laundry_entry(room_id: RoomId, count: usize) -> LaundryStats {
        LaundryStats {
            room_id,
            room_name: String::new(),
            count: count as u32,
            detail_time: (0..count)
                .map(|i| LaundryRecord {
                    id: room_id * 100 + i as i64,
                    room_id,
                    created_at: datetime!(2025-07-10 08:00:00 UTC),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn allocate_names_rooms_from_directory() {
        let api = two_room_api();
        let result = allocate(&api, &AllocationConfig::default(), &bill()).await.unwrap();

        assert_eq!(result.electric_details[0].room_name, "Room A");
        assert!((result.electric_details[1].electricity_used_in_laundry - 190.0).abs() < 1e-9);
        assert!(api.laundry_months().is_empty());
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_remote_calls() {
        let api = two_room_api();
        api.set_unavailable();
        let mut request = bill();
        request.total_electric = 0.0;

        let err = allocate(&api, &AllocationConfig::default(), &request).await.unwrap_err();
        assert!(matches!(err, BillingError::Allocation(_)));
    }

    #[tokio::test]
    async fn laundry_policy_weights_pool_by_monthly_usage() {
        let api = two_room_api().with_laundry(vec![laundry_entry(1, 3), laundry_entry(2, 1)]);
        let config = AllocationConfig {
            share_policy: SharePolicyKind::LaundryUsage,
            negative_pool: NegativePoolPolicy::Reject,
        };

        let result = allocate(&api, &config, &bill()).await.unwrap();

        assert!((result.electric_details[0].electricity_used_in_laundry - 285.0).abs() < 1e-9);
        assert!((result.electric_details[1].electricity_used_in_laundry - 95.0).abs() < 1e-9);
        assert_eq!(api.laundry_months(), vec![bill().month]);
    }

    #[tokio::test]
    async fn save_readings_forwards_only_changes() {
        let api = FakeApi::default().with_readings(vec![fixtures::reading(1, 1, 0.0, 100.0, 0)]);

        let sent = save_readings(
            &api,
            vec![
                ReadingSubmission { room_id: 1, electric: 100.0 },
                ReadingSubmission { room_id: 2, electric: 55.0 },
            ],
        )
        .await
        .unwrap();

        assert_eq!(sent, 1);
        assert_eq!(
            api.saved_batches(),
            vec![vec![ReadingSubmission { room_id: 2, electric: 55.0 }]]
        );

        let unchanged = save_readings(&api, vec![ReadingSubmission { room_id: 1, electric: 100.0 }])
            .await
            .unwrap();
        assert_eq!(unchanged, 0);
        assert_eq!(api.save_attempts(), 1);
    }

    #[tokio::test]
    async fn save_readings_rejects_negative_values() {
        let api = FakeApi::default();
        let err = save_readings(&api, vec![ReadingSubmission { room_id: 1, electric: -1.0 }])
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidReading(_)));
        assert_eq!(api.save_attempts(), 0);
    }

    #[tokio::test]
    async fn upstream_failures_surface_as_upstream_errors() {
        let api = two_room_api();
        api.set_unavailable();
        assert!(matches!(room_summaries(&api).await, Err(BillingError::Upstream(_))));
        assert!(matches!(record_laundry(&api, 1).await, Err(BillingError::Upstream(_))));
    }

    #[tokio::test]
    async fn defaults_and_laundry_stats_cover_every_room() {
        let api = two_room_api()
            .with_readings(vec![fixtures::reading(1, 2, 5.0, 25.0, 0)])
            .with_laundry(vec![laundry_entry(2, 2)]);

        let defaults = calculation_defaults(&api).await.unwrap();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults[1].end_electric, 25.0);

        let stats = laundry_stats(&api, "2025-07".parse().unwrap()).await.unwrap();
        assert_eq!(stats.iter().map(|s| s.count).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(stats[1].room_name, "Room B");
    }
}
