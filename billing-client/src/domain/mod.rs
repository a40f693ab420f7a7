mod allocation;
mod laundry;
mod meter_reading;
mod month;
mod room;
pub mod timestamp;

pub use allocation::{AllocationRequest, AllocationResult, RoomAllocation, RoomReading};
pub use laundry::{LaundryRecord, LaundryStats};
pub use meter_reading::{MeterReading, ReadingSubmission};
pub use month::{BillingMonth, MonthParseError};
pub use room::{room_name, Room, RoomId};
