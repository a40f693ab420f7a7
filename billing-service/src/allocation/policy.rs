use std::collections::HashMap;

use billing_client::domain::RoomId;
use serde::Deserialize;

/// A room's own metered consumption for the period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomUsage {
    pub room_id: RoomId,
    pub own: f64,
}

/// Splits the shared pool across rooms.
///
/// Implementations return exactly one share per entry of `rooms`, in the same
/// order, and the shares add up to `pool`.
pub trait SharePolicy: Send + Sync {
    fn apportion(&self, pool: f64, rooms: &[RoomUsage]) -> Vec<f64>;
}

/// What to do when the rooms' own consumption exceeds the billed total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativePoolPolicy {
    #[default]
    Reject,
    Clamp,
}

fn equal_split(pool: f64, rooms: usize) -> Vec<f64> {
    if rooms == 0 {
        return Vec::new();
    }
    vec![pool / rooms as f64; rooms]
}

/// Pool split by weight; all-zero weights fall back to an equal split.
fn weighted_split(pool: f64, weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return equal_split(pool, weights.len());
    }
    weights.iter().map(|w| pool * w / total).collect()
}

/// Every room carries the same part of the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualSplit;

impl SharePolicy for EqualSplit {
    fn apportion(&self, pool: f64, rooms: &[RoomUsage]) -> Vec<f64> {
        equal_split(pool, rooms.len())
    }
}

/// Rooms carry the pool in proportion to their own consumption.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalToUsage;

impl SharePolicy for ProportionalToUsage {
    fn apportion(&self, pool: f64, rooms: &[RoomUsage]) -> Vec<f64> {
        let weights: Vec<f64> = rooms.iter().map(|r| r.own).collect();
        weighted_split(pool, &weights)
    }
}

/// Rooms carry the pool in proportion to how often they used the laundry machine.
#[derive(Debug, Clone, Default)]
pub struct LaundryUsage {
    counts: HashMap<RoomId, u32>,
}

impl LaundryUsage {
    pub fn new(counts: HashMap<RoomId, u32>) -> Self {
        Self { counts }
    }
}

impl SharePolicy for LaundryUsage {
    fn apportion(&self, pool: f64, rooms: &[RoomUsage]) -> Vec<f64> {
        let weights: Vec<f64> = rooms
            .iter()
            .map(|r| f64::from(self.counts.get(&r.room_id).copied().unwrap_or(0)))
            .collect();
        weighted_split(pool, &weights)
    }
}
