pub mod availability;
pub mod coordinator;
pub mod holds;

pub use availability::{AvailabilityQuery, HeldSeat, SeatCheck, SeatStatus};
pub use coordinator::BookingCoordinator;
pub use holds::HoldManager;

use chrono::Duration;

/// Booking-layer policy: hold lifetime and the per-holder seat quota.
/// Built from `BusinessRules` in configuration; defaults match it.
#[derive(Debug, Clone)]
pub struct BookingRules {
    pub hold_ttl: Duration,
    pub max_seats_per_user: u32,
}

impl BookingRules {
    pub fn new(seat_hold_seconds: u64, max_seats_per_user: u32) -> Self {
        Self {
            hold_ttl: Duration::seconds(seat_hold_seconds as i64),
            max_seats_per_user,
        }
    }
}

impl Default for BookingRules {
    fn default() -> Self {
        Self::new(300, 4)
    }
}
