use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled departure with a fixed seat capacity and fare.
///
/// Trips are created by schedule management and are read-only to the
/// booking core. Seats are numbered `1..=capacity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub capacity: u32,
    pub departure_time: DateTime<Utc>,
    /// Fare per seat in minor units. Currency/rounding is the fare
    /// model's concern; the core only multiplies by seat count.
    pub fare_amount: i64,
    pub fare_currency: String,
}

impl Trip {
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        now >= self.departure_time
    }

    pub fn seat_in_range(&self, seat_number: u32) -> bool {
        seat_number >= 1 && seat_number <= self.capacity
    }
}
