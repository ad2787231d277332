use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use farebox_core::{BookingError, BookingResult, Clock, SeatStore, TripLocks};

/// Partition of a trip's seats into booked, held, and available.
/// Sets are ordered so they render in seat-number order.
#[derive(Debug, Clone, Serialize)]
pub struct SeatStatus {
    pub trip_id: Uuid,
    pub total_seats: u32,
    pub booked: BTreeSet<u32>,
    pub held: BTreeMap<u32, HeldSeat>,
    pub available: BTreeSet<u32>,
}

impl SeatStatus {
    pub fn booked_count(&self) -> usize {
        self.booked.len()
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }
}

/// Who is provisionally sitting where, and for how much longer.
#[derive(Debug, Clone, Serialize)]
pub struct HeldSeat {
    pub holder_id: String,
    pub selected_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Advisory pre-booking answer for a specific seat selection.
#[derive(Debug, Clone, Serialize)]
pub struct SeatCheck {
    pub available: Vec<u32>,
    pub unavailable: Vec<u32>,
}

impl SeatCheck {
    pub fn all_available(&self) -> bool {
        self.unavailable.is_empty()
    }
}

/// Read side of the seat inventory.
///
/// `seat_status` is a lock-free snapshot; it can be stale by the time
/// the caller acts on it, and the coordinator revalidates everything
/// anyway. `check_seats` is the defensive variant run under the trip
/// lock right before a commit attempt.
pub struct AvailabilityQuery {
    store: Arc<dyn SeatStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<TripLocks>,
}

impl AvailabilityQuery {
    pub fn new(store: Arc<dyn SeatStore>, clock: Arc<dyn Clock>, locks: Arc<TripLocks>) -> Self {
        Self { store, clock, locks }
    }

    pub async fn seat_status(&self, trip_id: Uuid) -> BookingResult<SeatStatus> {
        self.store
            .remove_expired_holds(self.clock.now())
            .await
            .map_err(BookingError::internal)?;

        self.snapshot(trip_id).await
    }

    pub async fn check_seats(&self, trip_id: Uuid, seat_numbers: &[u32]) -> BookingResult<SeatCheck> {
        let _guard = self.locks.acquire(trip_id).await;

        let status = self.seat_status(trip_id).await?;

        let mut available = Vec::new();
        let mut unavailable = Vec::new();
        for &seat in seat_numbers {
            if status.available.contains(&seat) {
                available.push(seat);
            } else {
                unavailable.push(seat);
            }
        }
        debug!(%trip_id, ?unavailable, "pre-booking seat check");
        Ok(SeatCheck { available, unavailable })
    }

    async fn snapshot(&self, trip_id: Uuid) -> BookingResult<SeatStatus> {
        let trip = self
            .store
            .get_trip(trip_id)
            .await
            .map_err(BookingError::internal)?
            .ok_or_else(|| BookingError::trip_not_found(trip_id))?;

        let booked: BTreeSet<u32> = self
            .store
            .booked_seats(trip_id)
            .await
            .map_err(BookingError::internal)?
            .into_iter()
            .collect();

        let held: BTreeMap<u32, HeldSeat> = self
            .store
            .holds_for_trip(trip_id)
            .await
            .map_err(BookingError::internal)?
            .into_iter()
            .map(|h| {
                (
                    h.seat_number,
                    HeldSeat {
                        holder_id: h.holder_id,
                        selected_at: h.selected_at,
                        expires_at: h.expires_at,
                    },
                )
            })
            .collect();

        let available: BTreeSet<u32> = (1..=trip.capacity)
            .filter(|seat| !booked.contains(seat) && !held.contains_key(seat))
            .collect();

        Ok(SeatStatus {
            trip_id,
            total_seats: trip.capacity,
            booked,
            held,
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::Harness;
    use chrono::Duration;
    use farebox_core::BookingError;
    use uuid::Uuid;

    #[tokio::test]
    async fn unknown_trip_is_not_found() {
        let harness = Harness::with_capacity(40).await;
        let err = harness
            .availability()
            .seat_status(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn status_partitions_booked_held_and_available() {
        let harness = Harness::with_capacity(10).await;
        harness
            .coordinator()
            .commit_booking(
                harness.trip.id,
                Some("user-a"),
                crate::testutil::passenger("Ada"),
                &[1, 2],
            )
            .await
            .unwrap();
        harness
            .holds()
            .create_hold(harness.trip.id, "user-b", 3)
            .await
            .unwrap();

        let status = harness
            .availability()
            .seat_status(harness.trip.id)
            .await
            .unwrap();
        assert_eq!(status.total_seats, 10);
        assert_eq!(status.booked.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(status.held.len(), 1);
        assert_eq!(status.held[&3].holder_id, "user-b");
        assert_eq!(
            status.available.iter().copied().collect::<Vec<_>>(),
            vec![4, 5, 6, 7, 8, 9, 10]
        );
        assert_eq!(status.booked_count(), 2);
        assert_eq!(status.held_count(), 1);
        assert_eq!(status.available_count(), 7);
    }

    #[tokio::test]
    async fn holds_lapse_exactly_at_ttl() {
        let harness = Harness::with_capacity(8).await;
        harness
            .holds()
            .create_hold(harness.trip.id, "user-b", 7)
            .await
            .unwrap();

        // One second before expiry the seat is still held.
        harness
            .clock
            .advance(Duration::minutes(5) - Duration::seconds(1));
        let status = harness
            .availability()
            .seat_status(harness.trip.id)
            .await
            .unwrap();
        assert!(status.held.contains_key(&7));
        assert!(!status.available.contains(&7));

        harness.clock.advance(Duration::seconds(2));
        let status = harness
            .availability()
            .seat_status(harness.trip.id)
            .await
            .unwrap();
        assert!(status.held.is_empty());
        assert!(status.available.contains(&7));
    }

    #[tokio::test]
    async fn check_seats_flags_booked_and_held_seats() {
        let harness = Harness::with_capacity(10).await;
        harness
            .coordinator()
            .commit_booking(
                harness.trip.id,
                Some("user-a"),
                crate::testutil::passenger("Ada"),
                &[5],
            )
            .await
            .unwrap();
        harness
            .holds()
            .create_hold(harness.trip.id, "user-b", 6)
            .await
            .unwrap();

        let check = harness
            .availability()
            .check_seats(harness.trip.id, &[4, 5, 6])
            .await
            .unwrap();
        assert_eq!(check.available, vec![4]);
        assert_eq!(check.unavailable, vec![5, 6]);
        assert!(!check.all_available());
    }
}
