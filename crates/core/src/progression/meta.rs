//! Cross-level run bookkeeping.
//!
//! The campaign is canyon -> city -> boss -> ended. Each transition writes
//! the run counters and the next level's id to durable storage immediately
//! before the reload; the next level reads them back at startup. Final
//! victory clears everything.

use crate::config::ConfigError;
use crate::level::LevelId;
use crate::storage::{keys, KeyValueStore, RunStats, RunSummary};

/// Reads (and consumes) the pending level id left by the previous level's
/// transition. A fresh run starts in the canyon; a corrupted value is a
/// fatal configuration error.
pub fn resume_level(store: &mut dyn KeyValueStore) -> Result<LevelId, ConfigError> {
    match store.get(keys::NEXT_LEVEL) {
        None => Ok(LevelId::Canyon),
        Some(value) => {
            store.delete(keys::NEXT_LEVEL);
            value.parse()
        }
    }
}

/// Persists counters and the per-level clear time, then points storage at
/// the next level. Called immediately before the level transition.
pub fn record_clear(
    store: &mut dyn KeyValueStore,
    stats: &RunStats,
    level: LevelId,
    clear_time: f32,
) -> Option<LevelId> {
    let mut stats = *stats;
    match level {
        LevelId::Canyon => stats.canyon_clear_time = clear_time,
        LevelId::City => stats.collectibles_complete_time = clear_time,
        LevelId::Boss => {}
    }
    stats.save(store);

    let next = level.next();
    if let Some(next) = next {
        store.set(keys::NEXT_LEVEL, next.as_str());
        log::info!("level {} cleared in {:.1}s, next: {}", level.as_str(), clear_time, next.as_str());
    }
    next
}

/// Final victory: assembles the stats overlay payload and clears the
/// durable counters so a new run starts fresh.
pub fn finish_run(
    store: &mut dyn KeyValueStore,
    stats: &RunStats,
    boss_defeat_time: f32,
) -> RunSummary {
    let summary = RunSummary {
        grifters_killed: stats.grifters_killed,
        shots_fired: stats.shots_fired,
        canyon_clear_time: stats.canyon_clear_time,
        collectibles_complete_time: stats.collectibles_complete_time,
        boss_defeat_time,
    };
    RunStats::clear(store);
    store.delete(keys::NEXT_LEVEL);
    summary
}
