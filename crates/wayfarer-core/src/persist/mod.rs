//! Persistence bridge: snapshot and history records in the local store.
//!
//! Two keys, each holding a JSON blob:
//!
//! - [`PLAN_KEY`]: the current plan, its trip parameters and the selected flight.
//! - [`HISTORY_KEY`]: the history ring.
//!
//! Reads are fail-safe. A record that does not decode is purged and treated
//! as absent. Snapshot writes report failures to the caller; history writes
//! only log them.

pub mod history;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wayfarer_store::KvStore;

use crate::error::{PlannerError, StorageCause};
use crate::model::{Flight, Plan, TripParameters};

pub use history::{HISTORY_LIMIT, HistoryEntry, HistoryRing};

pub const PLAN_KEY: &str = "wayfarer.current_plan";
pub const HISTORY_KEY: &str = "wayfarer.history";

/// Snapshot format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A decoded plan snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub plan: Plan,
    pub trip_parameters: TripParameters,
    pub selection: Option<Flight>,
}

/// Borrowed form of [`Snapshot`] used for encoding without cloning the plan.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    plan: &'a Plan,
    trip_parameters: &'a TripParameters,
    selection: Option<&'a Flight>,
}

#[derive(Clone)]
pub struct PersistenceBridge {
    store: Arc<dyn KvStore>,
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Write the composite snapshot under [`PLAN_KEY`].
    ///
    /// On failure nothing in memory changes; the error is recoverable.
    pub fn save(
        &self,
        plan: &Plan,
        trip_parameters: &TripParameters,
        selection: Option<&Flight>,
    ) -> Result<(), PlannerError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            plan,
            trip_parameters,
            selection,
        };
        let encoded = serde_json::to_string(&snapshot).map_err(|e| PlannerError::StorageFailure {
            key: PLAN_KEY,
            source: StorageCause::Serialize(e),
        })?;
        self.store
            .set(PLAN_KEY, &encoded)
            .map_err(|e| PlannerError::StorageFailure {
                key: PLAN_KEY,
                source: StorageCause::Store(e),
            })?;
        info!(bytes = encoded.len(), "saved plan snapshot");
        Ok(())
    }

    /// Read the snapshot under [`PLAN_KEY`].
    ///
    /// A corrupt record is removed and reported as absent. A store read
    /// error is logged and also reported as absent, but the record is kept.
    pub fn load(&self) -> Option<Snapshot> {
        let raw = match self.store.get(PLAN_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = PLAN_KEY, error = %e, "could not read plan snapshot");
                return None;
            }
        };

        match decode_snapshot(&raw) {
            Ok(snapshot) => {
                debug!(saved_at = %snapshot.saved_at, "restored plan snapshot");
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "discarding corrupt plan snapshot");
                self.purge(PLAN_KEY);
                None
            }
        }
    }

    /// Remove the plan snapshot.
    pub fn discard(&self) -> Result<(), PlannerError> {
        self.store
            .remove(PLAN_KEY)
            .map_err(|e| PlannerError::StorageFailure {
                key: PLAN_KEY,
                source: StorageCause::Store(e),
            })
    }

    /// Read the history ring. Corrupt records are purged.
    pub fn load_history(&self) -> HistoryRing {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HistoryRing::new(),
            Err(e) => {
                warn!(key = HISTORY_KEY, error = %e, "could not read history");
                return HistoryRing::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => HistoryRing::from_entries(entries),
            Err(e) => {
                warn!(error = %e, "discarding corrupt history record");
                self.purge(HISTORY_KEY);
                HistoryRing::new()
            }
        }
    }

    /// Write the history ring. Failures are logged, never surfaced.
    ///
    /// Returns whether the write succeeded.
    pub fn persist_history(&self, ring: &HistoryRing) -> bool {
        let result = serde_json::to_string(ring)
            .map_err(StorageCause::from)
            .and_then(|encoded| {
                self.store
                    .set(HISTORY_KEY, &encoded)
                    .map_err(StorageCause::from)
            });
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(key = HISTORY_KEY, error = %e, "could not persist history");
                false
            }
        }
    }

    /// Empty `ring` and remove its stored record.
    pub fn clear_history(&self, ring: &mut HistoryRing) {
        ring.clear();
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!(key = HISTORY_KEY, error = %e, "could not remove history record");
        }
    }

    fn purge(&self, key: &'static str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key, error = %e, "could not purge corrupt record");
        }
    }
}

/// Decode and shape-check a stored snapshot.
pub fn decode_snapshot(raw: &str) -> Result<Snapshot, PlannerError> {
    let corrupt = |reason: String| PlannerError::CorruptPersistedState {
        key: PLAN_KEY,
        reason,
    };

    let snapshot: Snapshot = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(corrupt(format!(
            "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
            snapshot.version
        )));
    }
    if snapshot.plan.itinerary.is_empty() {
        return Err(corrupt("plan has no destinations".to_owned()));
    }
    if let Some(selected) = &snapshot.selection {
        if !snapshot.plan.contains_flight(selected) {
            return Err(corrupt("selected flight is not part of the plan".to_owned()));
        }
    }
    Ok(snapshot)
}
