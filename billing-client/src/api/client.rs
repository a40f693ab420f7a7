use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{ApiError, BillingApi};
use crate::domain::{
    AllocationRequest, AllocationResult, BillingMonth, LaundryStats, MeterReading,
    ReadingSubmission, Room, RoomId,
};

/// reqwest-backed client for the remote household API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        self.http
            .get(self.url(endpoint))
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "remote API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl BillingApi for ApiClient {
    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.fetch(self.get("/api/room/list")).await
    }

    async fn list_readings(&self) -> Result<Vec<MeterReading>, ApiError> {
        self.fetch(self.get("/api/electric/list")).await
    }

    async fn save_readings(&self, submissions: &[ReadingSubmission]) -> Result<(), ApiError> {
        // The remote answers with a bare "ok"; only the status matters.
        let request = self.http.post(self.url("/api/electric/save")).json(submissions);
        self.send(request).await.map(|_| ())
    }

    async fn calculate(&self, request: &AllocationRequest) -> Result<AllocationResult, ApiError> {
        let request = self.http.post(self.url("/api/electric/calculate")).json(request);
        self.fetch(request).await
    }

    async fn laundry_stats(&self, month: BillingMonth) -> Result<Vec<LaundryStats>, ApiError> {
        let request = self
            .get("/api/laundry/stats")
            .query(&[("month", month.to_string())]);
        self.fetch(request).await
    }

    async fn record_laundry(&self, room_id: RoomId) -> Result<(), ApiError> {
        let request = self.get("/api/laundry/save").query(&[("roomId", room_id)]);
        self.send(request).await.map(|_| ())
    }

    fn drive_upload_url(&self) -> String {
        self.url("/auth/google")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_base_url_without_scheme() {
        let res = ApiClient::new("localhost:8080", Duration::from_secs(1));
        assert!(matches!(res, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = ApiClient::new("http://billing.local/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://billing.local");
        assert_eq!(client.drive_upload_url(), "http://billing.local/auth/google");
    }
}
