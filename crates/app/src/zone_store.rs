//! Zone state store: one gate state record per zone, behind one lock.
//!
//! The key set is fixed at construction (every zone of the routing table,
//! created closed); only the records themselves change afterwards. A single
//! process-wide mutex serializes the read-decide-write step of every
//! decision, which is what keeps two concurrent readings for the same zone
//! from both passing the cooldown check.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use fieldgate_domain::error::NotFoundError;
use fieldgate_domain::id::ZoneId;
use fieldgate_domain::routing::RoutingTable;
use fieldgate_domain::zone::ZoneState;

/// Mutex-guarded map of [`ZoneState`] records.
#[derive(Debug)]
pub struct ZoneStore {
    zones: Mutex<HashMap<ZoneId, ZoneState>>,
}

impl ZoneStore {
    /// Create a closed, never-commanded record for every zone in `routing`.
    #[must_use]
    pub fn new(routing: &RoutingTable) -> Self {
        Self::from_zones(routing.zones())
    }

    /// Create closed records for an explicit set of zones.
    pub fn from_zones(zones: impl IntoIterator<Item = ZoneId>) -> Self {
        let zones = zones
            .into_iter()
            .map(|zone_id| (zone_id, ZoneState::closed(zone_id)))
            .collect();
        Self {
            zones: Mutex::new(zones),
        }
    }

    /// Check that every zone referenced by `routing` has a record.
    ///
    /// # Errors
    ///
    /// Returns the first zone without a record as a [`NotFoundError`].
    pub fn ensure_covers(&self, routing: &RoutingTable) -> Result<(), NotFoundError> {
        let zones = self.lock();
        match routing.zones().find(|zone_id| !zones.contains_key(zone_id)) {
            Some(missing) => Err(zone_not_found(missing)),
            None => Ok(()),
        }
    }

    /// Copy of the current state of one zone.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for a zone that was not known at startup.
    pub fn get(&self, zone_id: ZoneId) -> Result<ZoneState, NotFoundError> {
        self.lock()
            .get(&zone_id)
            .copied()
            .ok_or_else(|| zone_not_found(zone_id))
    }

    /// Copies of every zone, ordered by zone id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ZoneState> {
        let mut states: Vec<_> = self.lock().values().copied().collect();
        states.sort_by_key(ZoneState::zone_id);
        states
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run `f` on one zone's record while holding the store lock.
    ///
    /// The guard is released as soon as `f` returns; `f` must not block.
    pub(crate) fn with_zone<R>(
        &self,
        zone_id: ZoneId,
        f: impl FnOnce(&mut ZoneState) -> R,
    ) -> Result<R, NotFoundError> {
        let mut zones = self.lock();
        let state = zones
            .get_mut(&zone_id)
            .ok_or_else(|| zone_not_found(zone_id))?;
        Ok(f(state))
    }

    // A panic inside the critical section cannot leave a record half
    // written: `ZoneState::decide` only writes after every check passed.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ZoneId, ZoneState>> {
        self.zones.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn zone_not_found(zone_id: ZoneId) -> NotFoundError {
    NotFoundError {
        entity: "Zone",
        id: zone_id.to_string(),
    }
}
