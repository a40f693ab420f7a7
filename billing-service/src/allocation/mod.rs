//! Monthly electricity cost split.
//!
//! The bill is priced per kWh over the metered total. Whatever the room
//! meters do not account for forms the shared pool (laundry machine, common
//! areas), which a [`SharePolicy`] spreads over the rooms before each room is
//! charged for its own consumption plus its share.

mod policy;

use std::collections::HashSet;

use billing_client::domain::{
    room_name, AllocationRequest, AllocationResult, Room, RoomAllocation,
};

pub use policy::{
    EqualSplit, LaundryUsage, NegativePoolPolicy, ProportionalToUsage, RoomUsage, SharePolicy,
};

/// Relative slack under which a negative pool is rounding noise.
const POOL_EPSILON: f64 = 1e-9;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("share policy returned {got} shares for {expected} rooms")]
    ShareMismatch { expected: usize, got: usize },
}

/// Checks the request and returns each room's own consumption, in request order.
///
/// Rules:
/// - totalMoney and totalElectric must be finite and greater than zero.
/// - at least one room, each room at most once.
/// - per-room consumption (end - start) must be finite and non-negative.
pub fn validate_request(request: &AllocationRequest) -> Result<Vec<RoomUsage>, AllocationError> {
    if !request.total_money.is_finite() || request.total_money <= 0.0 {
        return Err(AllocationError::InvalidInput(
            "totalMoney must be greater than zero".to_string(),
        ));
    }
    if !request.total_electric.is_finite() || request.total_electric <= 0.0 {
        return Err(AllocationError::InvalidInput(
            "totalElectric must be greater than zero".to_string(),
        ));
    }
    if request.electrics.is_empty() {
        return Err(AllocationError::InvalidInput(
            "at least one room reading is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(request.electrics.len());
    let mut usage = Vec::with_capacity(request.electrics.len());
    for reading in &request.electrics {
        if !seen.insert(reading.room_id) {
            return Err(AllocationError::InvalidInput(format!(
                "room {} appears more than once",
                reading.room_id
            )));
        }

        let own = reading.consumption();
        if !own.is_finite() {
            return Err(AllocationError::InvalidInput(format!(
                "room {}: meter readings must be finite numbers",
                reading.room_id
            )));
        }
        if own < 0.0 {
            return Err(AllocationError::InvalidInput(format!(
                "room {}: end reading {} is below start reading {}",
                reading.room_id, reading.end_electric, reading.start_electric
            )));
        }

        usage.push(RoomUsage {
            room_id: reading.room_id,
            own,
        });
    }

    Ok(usage)
}

/// [`validate_request`] for callers that check a request before fetching what the
/// engine needs. A failure is counted and logged the same way [`AllocationEngine::allocate`] does.
pub fn precheck(request: &AllocationRequest) -> Result<(), AllocationError> {
    validate_request(request).map(|_| ()).map_err(|e| {
        record_rejection(request, &e);
        e
    })
}

fn record_rejection(request: &AllocationRequest, e: &AllocationError) {
    metrics::counter!("allocation_rejected_total").increment(1);
    tracing::warn!(error = %e, month = %request.month, "allocation rejected");
}

/// Stateless cost-split calculator; safe to share and call concurrently.
pub struct AllocationEngine {
    policy: Box<dyn SharePolicy>,
    negative_pool: NegativePoolPolicy,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(Box::new(EqualSplit))
    }
}

impl AllocationEngine {
    pub fn new(policy: Box<dyn SharePolicy>) -> Self {
        Self {
            policy,
            negative_pool: NegativePoolPolicy::default(),
        }
    }

    pub fn with_negative_pool(mut self, negative_pool: NegativePoolPolicy) -> Self {
        self.negative_pool = negative_pool;
        self
    }

    /// Splits the bill described by `request`. `rooms` only supplies display names.
    pub fn allocate(
        &self,
        request: &AllocationRequest,
        rooms: &[Room],
    ) -> Result<AllocationResult, AllocationError> {
        match self.compute(request, rooms) {
            Ok(result) => {
                metrics::counter!("allocation_requests_total").increment(1);
                tracing::debug!(
                    month = %request.month,
                    rooms = result.electric_details.len(),
                    price_per_unit = result.price_per_unit,
                    share_electric = result.share_electric,
                    "allocation computed"
                );
                Ok(result)
            }
            Err(e) => {
                record_rejection(request, &e);
                Err(e)
            }
        }
    }

    fn compute(
        &self,
        request: &AllocationRequest,
        rooms: &[Room],
    ) -> Result<AllocationResult, AllocationError> {
        let usage = validate_request(request)?;
        let own_total: f64 = usage.iter().map(|u| u.own).sum();
        let pool = self.shared_pool(request.total_electric, own_total)?;
        let price_per_unit = request.total_money / request.total_electric;

        let shares = self.policy.apportion(pool, &usage);
        if shares.len() != usage.len() {
            return Err(AllocationError::ShareMismatch {
                expected: usage.len(),
                got: shares.len(),
            });
        }

        let electric_details = usage
            .iter()
            .zip(shares)
            .map(|(u, share)| {
                let total_electric_used = u.own + share;
                RoomAllocation {
                    room_id: u.room_id,
                    room_name: room_name(rooms, u.room_id),
                    electricity_used_in_laundry: share,
                    total_electric_used,
                    total_money: total_electric_used * price_per_unit,
                }
            })
            .collect();

        Ok(AllocationResult {
            price_per_unit,
            share_electric: pool,
            share_money: pool * price_per_unit,
            electric_details,
        })
    }

    fn shared_pool(&self, total_electric: f64, own_total: f64) -> Result<f64, AllocationError> {
        let pool = total_electric - own_total;
        if pool >= 0.0 {
            return Ok(pool);
        }
        if -pool <= POOL_EPSILON * total_electric {
            return Ok(0.0);
        }

        match self.negative_pool {
            NegativePoolPolicy::Reject => Err(AllocationError::InvalidInput(format!(
                "rooms consumed {own_total} kWh, more than the billed {total_electric} kWh"
            ))),
            NegativePoolPolicy::Clamp => {
                tracing::warn!(
                    own_total,
                    total_electric,
                    "room consumption exceeds billed total, shared pool clamped to zero"
                );
                Ok(0.0)
            }
        }
    }
}

/// Equal split, rejecting inconsistent totals.
pub fn allocate(
    request: &AllocationRequest,
    rooms: &[Room],
) -> Result<AllocationResult, AllocationError> {
    AllocationEngine::default().allocate(request, rooms)
}
