//! Durable cross-level storage.
//!
//! Run statistics survive the full page reload between levels. The store is
//! a flat keyed string map; it is read once at level start and written back
//! immediately before a transition, never during normal ticks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Storage keys. Values are decimal strings.
pub mod keys {
    pub const SHOTS_FIRED: &str = "totalShotsFired";
    pub const GRIFTERS_KILLED: &str = "totalGriftersKilled";
    pub const CANYON_CLEAR_TIME: &str = "canyonClearTime";
    pub const COLLECTIBLES_COMPLETE_TIME: &str = "collectiblesCompleteTime";
    pub const NEXT_LEVEL: &str = "nextLevel";
}

/// Keyed string storage surviving a reload (session storage, a file, ...).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn delete(&mut self, key: &str);
}

/// In-memory store for tests and native harnesses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn delete(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Counters carried across levels. Missing or malformed stored values fall
/// back to zero, so a fresh run needs no initialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub shots_fired: u32,
    pub grifters_killed: u32,
    pub canyon_clear_time: f32,
    pub collectibles_complete_time: f32,
}

impl RunStats {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            shots_fired: read_u32(store, keys::SHOTS_FIRED),
            grifters_killed: read_u32(store, keys::GRIFTERS_KILLED),
            canyon_clear_time: read_f32(store, keys::CANYON_CLEAR_TIME),
            collectibles_complete_time: read_f32(store, keys::COLLECTIBLES_COMPLETE_TIME),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        store.set(keys::SHOTS_FIRED, &self.shots_fired.to_string());
        store.set(keys::GRIFTERS_KILLED, &self.grifters_killed.to_string());
        store.set(keys::CANYON_CLEAR_TIME, &self.canyon_clear_time.to_string());
        store.set(
            keys::COLLECTIBLES_COMPLETE_TIME,
            &self.collectibles_complete_time.to_string(),
        );
    }

    /// Removes every persisted counter; called at final victory.
    pub fn clear(store: &mut dyn KeyValueStore) {
        store.delete(keys::SHOTS_FIRED);
        store.delete(keys::GRIFTERS_KILLED);
        store.delete(keys::CANYON_CLEAR_TIME);
        store.delete(keys::COLLECTIBLES_COMPLETE_TIME);
    }
}

fn read_u32(store: &dyn KeyValueStore, key: &str) -> u32 {
    store
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

fn read_f32(store: &dyn KeyValueStore, key: &str) -> f32 {
    store
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

/// Final tally shown on the end-game stats overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub grifters_killed: u32,
    pub shots_fired: u32,
    pub canyon_clear_time: f32,
    pub collectibles_complete_time: f32,
    pub boss_defeat_time: f32,
}

impl RunSummary {
    pub fn total_time(&self) -> f32 {
        self.canyon_clear_time + self.collectibles_complete_time + self.boss_defeat_time
    }
}
