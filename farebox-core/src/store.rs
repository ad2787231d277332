use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::hold::SeatHold;
use crate::reservation::Reservation;
use crate::trip::Trip;

pub type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Repository trait for trip, hold, and reservation persistence.
///
/// Implementations only need to make each individual method atomic;
/// cross-method consistency is provided by the callers holding the
/// trip lock for the whole critical section.
#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Registers a trip. Called by schedule management, not by the
    /// booking core itself.
    async fn insert_trip(&self, trip: &Trip) -> StoreResult<()>;

    async fn get_trip(&self, trip_id: Uuid) -> StoreResult<Option<Trip>>;

    /// Seat numbers across all assignments of the trip's reservations.
    async fn booked_seats(&self, trip_id: Uuid) -> StoreResult<HashSet<u32>>;

    /// Total seats this holder has booked on the trip, across all of
    /// their reservations.
    async fn seats_booked_by(&self, trip_id: Uuid, holder_id: &str) -> StoreResult<u32>;

    async fn holds_for_trip(&self, trip_id: Uuid) -> StoreResult<Vec<SeatHold>>;

    async fn get_hold(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<Option<SeatHold>>;

    /// Inserts a hold, or replaces the existing one for the same
    /// (trip, seat) when the holder renews it.
    async fn put_hold(&self, hold: &SeatHold) -> StoreResult<()>;

    /// Removes the hold iff it exists and belongs to `holder_id`.
    /// Returns whether anything was removed.
    async fn remove_hold(&self, trip_id: Uuid, holder_id: &str, seat_number: u32)
        -> StoreResult<bool>;

    /// Discards every hold whose expiry has passed, across all trips.
    /// Returns the number removed. Idempotent.
    async fn remove_expired_holds(&self, now: DateTime<Utc>) -> StoreResult<usize>;

    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<()>;

    async fn get_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Reservation>>;

    /// Returns whether a reservation was actually deleted.
    async fn delete_reservation(&self, reservation_id: Uuid) -> StoreResult<bool>;

    /// Returns whether a reservation was actually updated; `false`
    /// means it vanished between lookup and write.
    async fn set_confirmed(&self, reservation_id: Uuid) -> StoreResult<bool>;

    /// Reservations for a holder, most recent first, optionally
    /// filtered to one trip.
    async fn reservations_for_holder(
        &self,
        holder_id: &str,
        trip_id: Option<Uuid>,
    ) -> StoreResult<Vec<Reservation>>;
}
