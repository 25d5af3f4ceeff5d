//! In-memory view state shared by the pollers and the operator API.
//!
//! Each poller owns one slice (aircraft, drone, breaches) and only ever
//! replaces it whole. Every poll takes a ticket before it goes out; a
//! response is committed only if no newer ticket has landed in that slice.
//! Lock order is zone, then drone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use airspace_core::{
    AircraftSighting, BreachPrediction, DroneState, LatLng, SettingsUpdate, ViewSnapshot,
    ZoneBounds, ZoneError, ZoneGeometry, ZoneSettings, ZoneTracker, ZoneUpdate,
};
use serde::Serialize;
use tokio::sync::broadcast;

use super::relay::RelayStore;
use crate::config::Config;

/// Which slice of state was just committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateChange {
    Aircraft,
    Drone,
    Breaches,
    Zone,
}

#[derive(Debug, Default)]
struct Versioned<T> {
    ticket: u64,
    value: T,
}

impl<T> Versioned<T> {
    /// Replace the value unless a newer ticket was already committed.
    fn commit(&mut self, ticket: u64, value: T) -> bool {
        if ticket < self.ticket {
            return false;
        }
        self.ticket = ticket;
        self.value = value;
        true
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Application state - the single store the presentation layer observes.
pub struct AppState {
    config: Config,
    aircraft: RwLock<Versioned<Vec<AircraftSighting>>>,
    drone: RwLock<Versioned<Option<DroneState>>>,
    /// Service order, as received
    breaches: RwLock<Versioned<Vec<BreachPrediction>>>,
    zone: Mutex<ZoneTracker>,
    tickets: AtomicU64,
    relay: RelayStore,
    pub tx: broadcast::Sender<StateChange>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_bounds(config, ZoneBounds::default())
    }

    pub fn with_bounds(config: Config, bounds: ZoneBounds) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            relay: RelayStore::new(config.aircraft_feed_url.clone(), config.http_timeout),
            config,
            aircraft: RwLock::new(Versioned::default()),
            drone: RwLock::new(Versioned::default()),
            breaches: RwLock::new(Versioned::default()),
            zone: Mutex::new(ZoneTracker::new(bounds)),
            tickets: AtomicU64::new(1),
            tx,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn relay(&self) -> &RelayStore {
        &self.relay
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.tx.subscribe()
    }

    fn publish(&self, change: StateChange) {
        // No subscribers is fine.
        let _ = self.tx.send(change);
    }

    /// Take a ticket for an outgoing poll.
    pub fn begin_poll(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst)
    }

    /// Replace the aircraft set (empty included). Returns false if stale.
    pub fn replace_aircraft(&self, ticket: u64, aircraft: Vec<AircraftSighting>) -> bool {
        let committed = write(&self.aircraft).commit(ticket, aircraft);
        if committed {
            self.publish(StateChange::Aircraft);
        }
        committed
    }

    /// Commit a valid drone fix and reconcile the zone against it.
    /// Returns `None` if a newer fix was already committed.
    pub fn update_drone(&self, ticket: u64, drone: DroneState) -> Option<ZoneUpdate> {
        let mut zone = lock(&self.zone);
        let mut slot = write(&self.drone);
        if ticket < slot.ticket {
            return None;
        }
        let update = zone.reconcile(Some(&drone));
        slot.commit(ticket, Some(drone));
        drop(slot);
        drop(zone);

        self.publish(StateChange::Drone);
        if !update.is_empty() {
            self.publish(StateChange::Zone);
        }
        Some(update)
    }

    /// Replace the breach set (empty included). Returns false if stale.
    pub fn replace_breaches(&self, ticket: u64, breaches: Vec<BreachPrediction>) -> bool {
        let committed = write(&self.breaches).commit(ticket, breaches);
        if committed {
            self.publish(StateChange::Breaches);
        }
        committed
    }

    pub fn get_aircraft(&self) -> Vec<AircraftSighting> {
        read(&self.aircraft).value.clone()
    }

    pub fn get_drone(&self) -> Option<DroneState> {
        read(&self.drone).value.clone()
    }

    /// Breaches in the order the prediction service returned them.
    pub fn get_breaches(&self) -> Vec<BreachPrediction> {
        read(&self.breaches).value.clone()
    }

    pub fn get_zone(&self) -> ZoneGeometry {
        lock(&self.zone).geometry()
    }

    pub fn get_settings(&self) -> ZoneSettings {
        lock(&self.zone).settings().clone()
    }

    pub fn get_bounds(&self) -> ZoneBounds {
        *lock(&self.zone).bounds()
    }

    /// Settings and center for the next prediction request, once a center exists.
    pub fn breach_request(&self) -> Option<(ZoneSettings, LatLng)> {
        let zone = lock(&self.zone);
        zone.center().map(|center| (zone.settings().clone(), center))
    }

    /// Run an operator action on the zone, then reconcile against the
    /// current drone fix.
    fn with_zone<R>(&self, action: impl FnOnce(&mut ZoneTracker) -> R) -> R {
        let mut zone = lock(&self.zone);
        let result = action(&mut zone);
        let drone = read(&self.drone).value.clone();
        zone.reconcile(drone.as_ref());
        drop(zone);
        self.publish(StateChange::Zone);
        result
    }

    pub fn set_zone_center(&self, center: LatLng) -> Result<ZoneGeometry, ZoneError> {
        self.with_zone(|zone| zone.set_center(center))?;
        Ok(self.get_zone())
    }

    /// Queue a one-shot "set zone to drone". Returns true if it was applied
    /// immediately because a drone fix is already known.
    pub fn request_recenter(&self) -> bool {
        self.with_zone(|zone| zone.request_recenter());
        !lock(&self.zone).recenter_pending()
    }

    /// Operator resize; clamped, then regrown if the drone is outside.
    pub fn resize_zone(&self, flight_range_m: f64) -> ZoneGeometry {
        self.with_zone(|zone| zone.resize(flight_range_m));
        self.get_zone()
    }

    pub fn update_settings(&self, update: &SettingsUpdate) -> ZoneSettings {
        self.with_zone(|zone| zone.update_settings(update));
        self.get_settings()
    }

    pub fn toggle_center_on_drone(&self) -> bool {
        self.with_zone(|zone| zone.toggle_center_on_drone())
    }

    pub fn toggle_labels(&self) -> bool {
        self.with_zone(|zone| zone.toggle_labels())
    }

    /// Consistent read of every slice plus the derived values.
    pub fn snapshot(&self) -> ViewSnapshot {
        let zone = lock(&self.zone);
        let drone = read(&self.drone).value.clone();
        let aircraft = read(&self.aircraft).value.clone();
        let breaches = read(&self.breaches).value.clone();
        ViewSnapshot::derive(&aircraft, drone.as_ref(), &zone, &breaches)
    }
}
