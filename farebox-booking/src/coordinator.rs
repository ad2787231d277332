use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::BookingRules;
use farebox_core::{
    BookingError, BookingResult, Clock, PassengerInfo, Reservation, SeatAssignment, SeatStore,
    TripLocks,
};

/// The transactional core: the only path that turns seats into
/// confirmed assignments.
///
/// Every prior availability read is advisory; the coordinator
/// recomputes booked and held sets inside the trip lock and trusts
/// nothing observed before entering the critical section.
pub struct BookingCoordinator {
    store: Arc<dyn SeatStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<TripLocks>,
    rules: BookingRules,
}

impl BookingCoordinator {
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

    /// Atomically reserves `seat_numbers` on a trip.
    ///
    /// `holder_id` is `None` for guest bookings, which bypass the
    /// per-holder quota (the quota is keyed on holder identity; this
    /// asymmetry is inherited behavior, kept deliberately).
    ///
    /// Retrying after a transient failure is not idempotent: there is
    /// no dedup token, so a retry of an already-committed call creates
    /// a second reservation.
    pub async fn commit_booking(
        &self,
        trip_id: Uuid,
        holder_id: Option<&str>,
        passenger: PassengerInfo,
        seat_numbers: &[u32],
    ) -> BookingResult<Reservation> {
        validate_request_shape(seat_numbers)?;

        let _guard = self.locks.acquire(trip_id).await;
        let now = self.clock.now();

        let trip = self
            .store
            .get_trip(trip_id)
            .await
            .map_err(BookingError::internal)?
            .ok_or_else(|| BookingError::trip_not_found(trip_id))?;

        if trip.has_departed(now) {
            return Err(BookingError::TripDeparted);
        }

        if let Some(holder) = holder_id {
            let booked = self
                .store
                .seats_booked_by(trip_id, holder)
                .await
                .map_err(BookingError::internal)?;
            if booked + seat_numbers.len() as u32 > self.rules.max_seats_per_user {
                return Err(BookingError::QuotaExceeded {
                    limit: self.rules.max_seats_per_user,
                    booked,
                });
            }
        }

        self.store
            .remove_expired_holds(now)
            .await
            .map_err(BookingError::internal)?;

        // Fresh sets, computed inside the lock.
        let booked_seats = self
            .store
            .booked_seats(trip_id)
            .await
            .map_err(BookingError::internal)?;
        let holds = self
            .store
            .holds_for_trip(trip_id)
            .await
            .map_err(BookingError::internal)?;

        for &seat in seat_numbers {
            if !trip.seat_in_range(seat) {
                return Err(BookingError::CapacityExceeded {
                    seat,
                    capacity: trip.capacity,
                });
            }
            if booked_seats.contains(&seat) {
                return Err(BookingError::SeatUnavailable(seat));
            }
            // A foreign hold blocks; the caller's own hold is consumed.
            if holds
                .iter()
                .any(|h| h.seat_number == seat && Some(h.holder_id.as_str()) != holder_id)
            {
                return Err(BookingError::SeatUnavailable(seat));
            }
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            trip_id,
            holder_id: holder_id.map(str::to_string),
            passenger,
            seats_booked: seat_numbers.len() as u32,
            assignments: seat_numbers
                .iter()
                .map(|&seat_number| SeatAssignment {
                    seat_number,
                    issued_at: now,
                })
                .collect(),
            total_amount: trip.fare_amount * seat_numbers.len() as i64,
            currency: trip.fare_currency.clone(),
            booked_at: now,
            confirmed: false,
        };
        self.store
            .insert_reservation(&reservation)
            .await
            .map_err(BookingError::internal)?;

        if let Some(holder) = holder_id {
            for &seat in seat_numbers {
                self.store
                    .remove_hold(trip_id, holder, seat)
                    .await
                    .map_err(BookingError::internal)?;
            }
        }

        info!(
            %trip_id,
            reservation_id = %reservation.id,
            seats = ?seat_numbers,
            total_amount = reservation.total_amount,
            "booking committed"
        );
        Ok(reservation)
    }

    /// Cancels an unconfirmed reservation owned by `holder_id`,
    /// returning its seats to the pool immediately. Confirmed
    /// reservations are immutable through this core.
    pub async fn cancel_reservation(
        &self,
        reservation_id: Uuid,
        holder_id: &str,
    ) -> BookingResult<()> {
        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await
            .map_err(BookingError::internal)?
            .filter(|r| r.holder_id.as_deref() == Some(holder_id))
            .ok_or_else(|| BookingError::reservation_not_found(reservation_id))?;

        let _guard = self.locks.acquire(reservation.trip_id).await;

        // Re-read under the lock; confirmation may have landed since.
        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await
            .map_err(BookingError::internal)?
            .ok_or_else(|| BookingError::reservation_not_found(reservation_id))?;
        if reservation.confirmed {
            return Err(BookingError::InvalidState(
                "cannot cancel a confirmed reservation".into(),
            ));
        }

        let deleted = self
            .store
            .delete_reservation(reservation_id)
            .await
            .map_err(BookingError::internal)?;
        if !deleted {
            return Err(BookingError::reservation_not_found(reservation_id));
        }
        info!(
            trip_id = %reservation.trip_id,
            %reservation_id,
            seats = ?reservation.seat_numbers(),
            "reservation cancelled, seats released"
        );
        Ok(())
    }

    /// Records the external payment-confirmation signal. The payment
    /// flow is authoritative; no price or seat re-derivation happens
    /// here.
    ///
    /// Runs under the trip lock so a confirmation cannot interleave
    /// with a cancellation's confirmed-check-then-delete sequence.
    pub async fn mark_confirmed(&self, reservation_id: Uuid) -> BookingResult<()> {
        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await
            .map_err(BookingError::internal)?
            .ok_or_else(|| BookingError::reservation_not_found(reservation_id))?;

        let _guard = self.locks.acquire(reservation.trip_id).await;

        let updated = self
            .store
            .set_confirmed(reservation_id)
            .await
            .map_err(BookingError::internal)?;
        if !updated {
            // Cancelled while we waited for the lock.
            return Err(BookingError::reservation_not_found(reservation_id));
        }
        info!(%reservation_id, "reservation confirmed by payment flow");
        Ok(())
    }

    /// A holder's reservations, most recent first, optionally limited
    /// to one trip.
    pub async fn list_reservations(
        &self,
        holder_id: &str,
        trip_id: Option<Uuid>,
    ) -> BookingResult<Vec<Reservation>> {
        self.store
            .reservations_for_holder(holder_id, trip_id)
            .await
            .map_err(BookingError::internal)
    }
}

fn validate_request_shape(seat_numbers: &[u32]) -> BookingResult<()> {
    if seat_numbers.is_empty() {
        return Err(BookingError::InvalidState(
            "a booking must include at least one seat".into(),
        ));
    }
    let mut seen = HashSet::new();
    for &seat in seat_numbers {
        if !seen.insert(seat) {
            return Err(BookingError::InvalidState(format!(
                "seat {} is requested more than once",
                seat
            )));
        }
    }
    Ok(())
}
