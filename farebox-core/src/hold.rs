use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A temporary claim on one seat, visible to other users while its
/// owner completes checkout. At most one active hold exists per
/// (trip, seat); expiry is evaluated lazily by whoever looks next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatHold {
    pub trip_id: Uuid,
    pub holder_id: String, // user id or session id
    pub seat_number: u32,
    pub selected_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SeatHold {
    /// A hold lapses exactly at its expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
