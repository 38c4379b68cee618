//! History ring: the last few trip parameter sets, most recent first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::TripParameters;

/// Maximum number of entries kept.
pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the Unix epoch; unique in the ring.
    pub id: i64,
    pub title: String,
    pub parameters: TripParameters,
}

/// Bounded, deduplicated, most-recent-first list of past requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryRing {
    entries: Vec<HistoryEntry>,
}

impl HistoryRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ring from stored entries, re-establishing the invariants:
    /// later duplicates and anything past the limit are dropped.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut kept: Vec<HistoryEntry> = Vec::with_capacity(HISTORY_LIMIT);
        for entry in entries {
            if kept.len() == HISTORY_LIMIT {
                break;
            }
            let duplicate = kept
                .iter()
                .any(|e| e.parameters == entry.parameters || e.id == entry.id);
            if !duplicate {
                kept.push(entry);
            }
        }
        Self { entries: kept }
    }

    /// Record `parameters` at the front, evicting any entry with equal
    /// parameters and trimming to [`HISTORY_LIMIT`].
    pub fn push(&mut self, parameters: TripParameters, now: DateTime<Utc>) -> &HistoryEntry {
        let mut id = now.timestamp_millis();
        if let Some(max) = self.entries.iter().map(|e| e.id).max() {
            // Two requests in the same millisecond still get distinct ids.
            if id <= max {
                id = max + 1;
            }
        }

        self.entries.retain(|e| e.parameters != parameters);
        self.entries.insert(
            0,
            HistoryEntry {
                id,
                title: parameters.title(),
                parameters,
            },
        );
        self.entries.truncate(HISTORY_LIMIT);
        &self.entries[0]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
