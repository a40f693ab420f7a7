use axum::{extract::State, response::Redirect, Json};
use billing_client::domain::{
    AllocationRequest, AllocationResult, BillingMonth, LaundryStats, MeterReading,
    ReadingSubmission, Room, RoomId, RoomReading,
};
use serde::{Deserialize, Serialize};

use super::{
    extract::{JsonBody, QueryParams},
    AppState,
};
use crate::{error::BillingError, readings::RoomSummary, service};

fn count(route: &'static str) {
    metrics::counter!("http_requests_total", "route" => route).increment(1);
}

pub(super) async fn health() -> &'static str {
    "ok"
}

pub(super) async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, BillingError> {
    count("room_list");
    Ok(Json(state.api.list_rooms().await?))
}

pub(super) async fn room_summaries(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomSummary>>, BillingError> {
    count("room_summary");
    Ok(Json(service::room_summaries(state.api.as_ref()).await?))
}

pub(super) async fn list_readings(
    State(state): State<AppState>,
) -> Result<Json<Vec<MeterReading>>, BillingError> {
    count("electric_list");
    Ok(Json(state.api.list_readings().await?))
}

pub(super) async fn calculation_defaults(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomReading>>, BillingError> {
    count("electric_defaults");
    Ok(Json(service::calculation_defaults(state.api.as_ref()).await?))
}

#[derive(Serialize)]
pub(super) struct SaveResponse {
    saved: usize,
}

pub(super) async fn save_readings(
    State(state): State<AppState>,
    JsonBody(submissions): JsonBody<Vec<ReadingSubmission>>,
) -> Result<Json<SaveResponse>, BillingError> {
    count("electric_save");
    let saved = service::save_readings(state.api.as_ref(), submissions).await?;
    Ok(Json(SaveResponse { saved }))
}

pub(super) async fn calculate(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AllocationRequest>,
) -> Result<Json<AllocationResult>, BillingError> {
    count("electric_calculate");
    let result = service::allocate(state.api.as_ref(), &state.allocation, &request).await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
pub(super) struct MonthQuery {
    month: Option<BillingMonth>,
}

pub(super) async fn laundry_stats(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<MonthQuery>,
) -> Result<Json<Vec<LaundryStats>>, BillingError> {
    count("laundry_stats");
    let month = query.month.unwrap_or_else(BillingMonth::current);
    Ok(Json(service::laundry_stats(state.api.as_ref(), month).await?))
}

#[derive(Deserialize)]
pub(super) struct RoomQuery {
    #[serde(rename = "roomId")]
    room_id: RoomId,
}

pub(super) async fn record_laundry(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RoomQuery>,
) -> Result<&'static str, BillingError> {
    count("laundry_save");
    service::record_laundry(state.api.as_ref(), query.room_id).await?;
    Ok("ok")
}

pub(super) async fn upload(State(state): State<AppState>) -> Redirect {
    count("upload");
    Redirect::temporary(&state.upload_url)
}
