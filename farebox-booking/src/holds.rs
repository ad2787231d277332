use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::BookingRules;
use farebox_core::{BookingError, BookingResult, Clock, SeatHold, SeatStore, TripLocks};

/// Creates, renews, and releases soft holds on seats.
///
/// Per (trip, seat) a hold moves Absent → Held → committed, released,
/// or expired, and back to Absent. Expiry is lazy: every path that
/// inspects holds sweeps lapsed ones first, so no timer task exists
/// and an expired-but-unswept hold never blocks anyone.
pub struct HoldManager {
    store: Arc<dyn SeatStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<TripLocks>,
    rules: BookingRules,
}

impl HoldManager {
    pub fn new(
        store: Arc<dyn SeatStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<TripLocks>,
        rules: BookingRules,
    ) -> Self {
        Self {
            store,
            clock,
            locks,
            rules,
        }
    }

    pub async fn create_hold(
        &self,
        trip_id: Uuid,
        holder_id: &str,
        seat_number: u32,
    ) -> BookingResult<SeatHold> {
        let _guard = self.locks.acquire(trip_id).await;
        let now = self.clock.now();

        self.store
            .remove_expired_holds(now)
            .await
            .map_err(BookingError::internal)?;

        let trip = self
            .store
            .get_trip(trip_id)
            .await
            .map_err(BookingError::internal)?
            .ok_or_else(|| BookingError::trip_not_found(trip_id))?;

        if trip.has_departed(now) {
            return Err(BookingError::TripDeparted);
        }
        if !trip.seat_in_range(seat_number) {
            return Err(BookingError::CapacityExceeded {
                seat: seat_number,
                capacity: trip.capacity,
            });
        }

        let booked = self
            .store
            .booked_seats(trip_id)
            .await
            .map_err(BookingError::internal)?;
        if booked.contains(&seat_number) {
            return Err(BookingError::SeatUnavailable(seat_number));
        }

        match self
            .store
            .get_hold(trip_id, seat_number)
            .await
            .map_err(BookingError::internal)?
        {
            // Re-selecting your own seat extends the hold.
            Some(existing) if existing.holder_id == holder_id => {
                let renewed = SeatHold {
                    expires_at: now + self.rules.hold_ttl,
                    ..existing
                };
                self.store
                    .put_hold(&renewed)
                    .await
                    .map_err(BookingError::internal)?;
                info!(%trip_id, holder_id, seat_number, "seat hold renewed");
                Ok(renewed)
            }
            Some(_) => Err(BookingError::HoldConflict(seat_number)),
            None => {
                let hold = SeatHold {
                    trip_id,
                    holder_id: holder_id.to_string(),
                    seat_number,
                    selected_at: now,
                    expires_at: now + self.rules.hold_ttl,
                };
                self.store
                    .put_hold(&hold)
                    .await
                    .map_err(BookingError::internal)?;
                info!(%trip_id, holder_id, seat_number, "seat hold created");
                Ok(hold)
            }
        }
    }

    /// Removes the caller's hold on a seat. Returns whether anything
    /// was removed; deselecting a seat you do not hold is a no-op.
    /// Lapsed holds are swept first, so releasing a hold that already
    /// expired reports `false`.
    pub async fn release_hold(
        &self,
        trip_id: Uuid,
        holder_id: &str,
        seat_number: u32,
    ) -> BookingResult<bool> {
        self.store
            .remove_expired_holds(self.clock.now())
            .await
            .map_err(BookingError::internal)?;

        let removed = self
            .store
            .remove_hold(trip_id, holder_id, seat_number)
            .await
            .map_err(BookingError::internal)?;
        if removed {
            info!(%trip_id, holder_id, seat_number, "seat hold released");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{passenger, Harness};
    use chrono::Duration;
    use farebox_core::BookingError;
    use uuid::Uuid;

    #[tokio::test]
    async fn competing_hold_conflicts_until_expiry() {
        let harness = Harness::with_capacity(40).await;
        let holds = harness.holds();

        holds
            .create_hold(harness.trip.id, "user-b", 7)
            .await
            .unwrap();

        let err = holds
            .create_hold(harness.trip.id, "user-c", 7)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::HoldConflict(7)));

        // After the TTL the identical retry succeeds.
        harness.clock.advance(Duration::minutes(5) + Duration::seconds(1));
        let hold = holds
            .create_hold(harness.trip.id, "user-c", 7)
            .await
            .unwrap();
        assert_eq!(hold.holder_id, "user-c");
    }

    #[tokio::test]
    async fn reselection_renews_the_expiry() {
        let harness = Harness::with_capacity(40).await;
        let holds = harness.holds();

        let first = holds
            .create_hold(harness.trip.id, "user-b", 3)
            .await
            .unwrap();

        harness.clock.advance(Duration::minutes(3));
        let renewed = holds
            .create_hold(harness.trip.id, "user-b", 3)
            .await
            .unwrap();

        assert_eq!(renewed.selected_at, first.selected_at);
        assert_eq!(
            renewed.expires_at,
            first.expires_at + Duration::minutes(3)
        );
    }

    #[tokio::test]
    async fn booked_seats_cannot_be_held() {
        let harness = Harness::with_capacity(40).await;
        harness
            .coordinator()
            .commit_booking(harness.trip.id, Some("user-a"), passenger("Ada"), &[12])
            .await
            .unwrap();

        let err = harness
            .holds()
            .create_hold(harness.trip.id, "user-b", 12)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatUnavailable(12)));
    }

    #[tokio::test]
    async fn holds_respect_departure_and_capacity() {
        let harness = Harness::with_capacity(40).await;
        let holds = harness.holds();

        let err = holds
            .create_hold(harness.trip.id, "user-b", 41)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::CapacityExceeded { seat: 41, capacity: 40 }
        ));
        let err = holds
            .create_hold(harness.trip.id, "user-b", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::CapacityExceeded { seat: 0, .. }));

        harness.clock.advance(Duration::hours(7));
        let err = holds
            .create_hold(harness.trip.id, "user-b", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::TripDeparted));
    }

    #[tokio::test]
    async fn release_is_owner_scoped_and_quiet_on_noop() {
        let harness = Harness::with_capacity(40).await;
        let holds = harness.holds();

        holds
            .create_hold(harness.trip.id, "user-b", 9)
            .await
            .unwrap();

        assert!(!holds
            .release_hold(harness.trip.id, "user-c", 9)
            .await
            .unwrap());
        assert!(holds
            .release_hold(harness.trip.id, "user-b", 9)
            .await
            .unwrap());
        assert!(!holds
            .release_hold(harness.trip.id, "user-b", 9)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn releasing_an_expired_hold_is_a_noop() {
        let harness = Harness::with_capacity(40).await;
        let holds = harness.holds();

        holds
            .create_hold(harness.trip.id, "user-b", 9)
            .await
            .unwrap();
        harness.clock.advance(Duration::minutes(5));

        // The hold already lapsed, so there is nothing to release.
        assert!(!holds
            .release_hold(harness.trip.id, "user-b", 9)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn unknown_trip_is_not_found() {
        let harness = Harness::with_capacity(40).await;
        let err = harness
            .holds()
            .create_hold(Uuid::new_v4(), "user-b", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }
}
