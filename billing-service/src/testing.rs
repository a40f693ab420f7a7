//! In-memory stand-in for the remote household API.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use billing_client::{
    domain::{
        AllocationRequest, AllocationResult, BillingMonth, LaundryStats, MeterReading,
        ReadingSubmission, Room, RoomId,
    },
    ApiError, BillingApi,
};

#[derive(Default)]
pub struct FakeApi {
    rooms: Vec<Room>,
    readings: Vec<MeterReading>,
    laundry: Vec<LaundryStats>,
    unavailable: AtomicBool,
    saved: Mutex<Vec<Vec<ReadingSubmission>>>,
    save_attempts: Mutex<usize>,
    save_failures: Mutex<(u32, u16)>,
    laundry_saves: Mutex<Vec<RoomId>>,
    laundry_months: Mutex<Vec<BillingMonth>>,
}

impl FakeApi {
    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_readings(mut self, readings: Vec<MeterReading>) -> Self {
        self.readings = readings;
        self
    }

    pub fn with_laundry(mut self, laundry: Vec<LaundryStats>) -> Self {
        self.laundry = laundry;
        self
    }

    pub fn set_unavailable(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_saves(&self, times: u32, status: u16) {
        *self.save_failures.lock().unwrap() = (times, status);
    }

    pub fn saved_batches(&self) -> Vec<Vec<ReadingSubmission>> {
        self.saved.lock().unwrap().clone()
    }

    pub fn save_attempts(&self) -> usize {
        *self.save_attempts.lock().unwrap()
    }

    pub fn recorded_laundry(&self) -> Vec<RoomId> {
        self.laundry_saves.lock().unwrap().clone()
    }

    pub fn laundry_months(&self) -> Vec<BillingMonth> {
        self.laundry_months.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), ApiError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BillingApi for FakeApi {
    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.check_available()?;
        Ok(self.rooms.clone())
    }

    async fn list_readings(&self) -> Result<Vec<MeterReading>, ApiError> {
        self.check_available()?;
        Ok(self.readings.clone())
    }

    async fn save_readings(&self, submissions: &[ReadingSubmission]) -> Result<(), ApiError> {
        self.check_available()?;
        *self.save_attempts.lock().unwrap() += 1;

        let mut failures = self.save_failures.lock().unwrap();
        if failures.0 > 0 {
            failures.0 -= 1;
            return Err(ApiError::Status {
                status: failures.1,
                body: "rejected".to_string(),
            });
        }

        self.saved.lock().unwrap().push(submissions.to_vec());
        Ok(())
    }

    async fn calculate(&self, request: &AllocationRequest) -> Result<AllocationResult, ApiError> {
        self.check_available()?;
        crate::allocation::allocate(request, &self.rooms).map_err(|e| ApiError::Status {
            status: 400,
            body: e.to_string(),
        })
    }

    async fn laundry_stats(&self, month: BillingMonth) -> Result<Vec<LaundryStats>, ApiError> {
        self.check_available()?;
        self.laundry_months.lock().unwrap().push(month);
        Ok(self.laundry.clone())
    }

    async fn record_laundry(&self, room_id: RoomId) -> Result<(), ApiError> {
        self.check_available()?;
        self.laundry_saves.lock().unwrap().push(room_id);
        Ok(())
    }

    fn drive_upload_url(&self) -> String {
        "http://remote.test/auth/google".to_string()
    }
}
