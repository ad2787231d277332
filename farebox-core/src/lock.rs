use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Exclusive, trip-scoped locks serializing every validate-then-mutate
/// sequence on one trip's seat state.
///
/// One mutex exists per trip id; operations on different trips never
/// contend. `acquire` hands out an owned guard, so the lock is released
/// on every exit path, including early returns and panics.
#[derive(Debug, Default)]
pub struct TripLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl TripLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, trip_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.locks.lock().await;
            registry.entry(trip_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
