//! HTTP front for the household billing API.

mod extract;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use billing_client::{ApiError, BillingApi};
use serde_json::json;

use crate::{allocation::AllocationError, config::AllocationConfig, error::BillingError};

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn BillingApi>,
    pub allocation: AllocationConfig,
    pub upload_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/room/list", get(handlers::list_rooms))
        .route("/api/room/summary", get(handlers::room_summaries))
        .route("/api/electric/list", get(handlers::list_readings))
        .route("/api/electric/defaults", get(handlers::calculation_defaults))
        .route("/api/electric/save", post(handlers::save_readings))
        .route("/api/electric/calculate", post(handlers::calculate))
        .route("/api/laundry/stats", get(handlers::laundry_stats))
        .route(
            "/api/laundry/save",
            get(handlers::record_laundry).post(handlers::record_laundry),
        )
        .route("/auth/google", get(handlers::upload))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "billing API listening");
    axum::serve(listener, router(state).into_make_service()).await
}

impl IntoResponse for BillingError {
    fn into_response(self) -> Response {
        let status = match &self {
            BillingError::Allocation(AllocationError::InvalidInput(_))
            | BillingError::InvalidReading(_)
            | BillingError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BillingError::Allocation(AllocationError::ShareMismatch { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BillingError::Upstream(ApiError::Status { status: 404, .. }) => StatusCode::NOT_FOUND,
            BillingError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        if matches!(self, BillingError::Upstream(_)) {
            metrics::counter!("upstream_errors_total").increment(1);
        }
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
