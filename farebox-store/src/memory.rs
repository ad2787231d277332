use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use farebox_core::store::{SeatStore, StoreResult};
use farebox_core::{Reservation, SeatHold, Trip};

#[derive(Debug, Default)]
struct Inner {
    trips: HashMap<Uuid, Trip>,
    holds: HashMap<(Uuid, u32), SeatHold>,
    reservations: HashMap<Uuid, Reservation>,
}

/// In-memory `SeatStore` used by tests and single-process deployments.
/// A SQL-backed implementation slots in behind the same trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatStore for MemoryStore {
    async fn insert_trip(&self, trip: &Trip) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.trips.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn get_trip(&self, trip_id: Uuid) -> StoreResult<Option<Trip>> {
        let inner = self.inner.read().await;
        Ok(inner.trips.get(&trip_id).cloned())
    }

    async fn booked_seats(&self, trip_id: Uuid) -> StoreResult<HashSet<u32>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reservations
            .values()
            .filter(|r| r.trip_id == trip_id)
            .flat_map(|r| r.assignments.iter().map(|a| a.seat_number))
            .collect())
    }

    async fn seats_booked_by(&self, trip_id: Uuid, holder_id: &str) -> StoreResult<u32> {
        let inner = self.inner.read().await;
        Ok(inner
            .reservations
            .values()
            .filter(|r| r.trip_id == trip_id && r.holder_id.as_deref() == Some(holder_id))
            .map(|r| r.seats_booked)
            .sum())
    }

    async fn holds_for_trip(&self, trip_id: Uuid) -> StoreResult<Vec<SeatHold>> {
        let inner = self.inner.read().await;
        Ok(inner
            .holds
            .values()
            .filter(|h| h.trip_id == trip_id)
            .cloned()
            .collect())
    }

    async fn get_hold(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<Option<SeatHold>> {
        let inner = self.inner.read().await;
        Ok(inner.holds.get(&(trip_id, seat_number)).cloned())
    }

    async fn put_hold(&self, hold: &SeatHold) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .holds
            .insert((hold.trip_id, hold.seat_number), hold.clone());
        Ok(())
    }

    async fn remove_hold(
        &self,
        trip_id: Uuid,
        holder_id: &str,
        seat_number: u32,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.holds.get(&(trip_id, seat_number)) {
            Some(hold) if hold.holder_id == holder_id => {
                inner.holds.remove(&(trip_id, seat_number));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_expired_holds(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let mut inner = self.inner.write().await;
        let before = inner.holds.len();
        inner.holds.retain(|_, hold| !hold.is_expired(now));
        let removed = before - inner.holds.len();
        if removed > 0 {
            info!(removed, "cleaned up expired seat holds");
        }
        Ok(removed)
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn get_reservation(&self, reservation_id: Uuid) -> StoreResult<Option<Reservation>> {
        let inner = self.inner.read().await;
        Ok(inner.reservations.get(&reservation_id).cloned())
    }

    async fn delete_reservation(&self, reservation_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.reservations.remove(&reservation_id).is_some())
    }

    async fn set_confirmed(&self, reservation_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.reservations.get_mut(&reservation_id) {
            Some(reservation) => {
                reservation.confirmed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reservations_for_holder(
        &self,
        holder_id: &str,
        trip_id: Option<Uuid>,
    ) -> StoreResult<Vec<Reservation>> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Reservation> = inner
            .reservations
            .values()
            .filter(|r| r.holder_id.as_deref() == Some(holder_id))
            .filter(|r| trip_id.map_or(true, |t| r.trip_id == t))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(matches)
    }
}
