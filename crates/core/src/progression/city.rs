//! City collection ladder.
//!
//! The collected count *is* the state machine: every pickup re-evaluates a
//! fixed unlock table that says how many more buildings light up, and the
//! win fires at eight. Early collectibles spawn at hand-picked positions
//! (snapped to the nearest eligible building); once the position table is
//! exhausted, a random dark building is chosen instead.

use glam::Vec3;

use crate::level::buildings::BuildingCatalog;
use crate::random::SeededRandom;
use crate::scene::Scene;

/// Collections needed to finish the level.
pub const TOTAL_TO_WIN: u32 = 8;

/// Collectibles hover this far above a rooftop when no hand-picked
/// position applies.
const ROOF_HOVER: f32 = 2.0;

/// After `collect` pickups, light `unlock` more buildings.
#[derive(Debug, Clone, Copy)]
pub struct UnlockStep {
    pub collect: u32,
    pub unlock: u32,
}

pub const UNLOCK_TABLE: [UnlockStep; 5] = [
    UnlockStep { collect: 0, unlock: 1 },
    UnlockStep { collect: 1, unlock: 1 },
    UnlockStep { collect: 2, unlock: 2 },
    UnlockStep { collect: 3, unlock: 2 },
    UnlockStep { collect: 4, unlock: 2 },
];

/// Hand-picked spawn spots for the eight collectibles, in spawn order.
pub const COLLECTIBLE_POSITIONS: [Vec3; 8] = [
    Vec3::new(-182.80, 100.57, -59.64),
    Vec3::new(109.02, 112.01, 75.87),
    Vec3::new(218.27, 125.18, -137.93),
    Vec3::new(337.20, 106.28, -50.01),
    Vec3::new(201.81, 123.99, -48.64),
    Vec3::new(162.33, 46.17, -26.86),
    Vec3::new(-186.38, 60.39, 171.11),
    Vec3::new(-45.62, 128.47, -106.07),
];

/// Where the orchestrator should spawn a new collectible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec3,
    pub building_index: usize,
}

#[derive(Debug)]
pub struct CityProgression {
    pub catalog: BuildingCatalog,
    spawned: u32,
}

impl CityProgression {
    pub fn new(catalog: BuildingCatalog) -> Self {
        Self {
            catalog,
            spawned: 0,
        }
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Debug skip support: darkens every building and rewinds the ladder.
    pub fn reset(&mut self, scene: &mut dyn Scene) {
        self.catalog.reset(scene);
        self.spawned = 0;
    }

    /// Win check: exactly at the target, never before.
    pub fn is_won(collected: u32) -> bool {
        collected >= TOTAL_TO_WIN
    }

    /// Consumes the unlock-table entry for this collected count, activating
    /// buildings and returning the collectible spawns to perform. Counts
    /// with no table entry unlock nothing.
    pub fn unlock_for(
        &mut self,
        scene: &mut dyn Scene,
        collected: u32,
        rng: &mut SeededRandom,
    ) -> Vec<SpawnRequest> {
        let Some(entry) = UNLOCK_TABLE.iter().find(|e| e.collect == collected) else {
            return Vec::new();
        };

        let mut requests = Vec::new();
        for _ in 0..entry.unlock {
            let (building_index, position) =
                if (self.spawned as usize) < COLLECTIBLE_POSITIONS.len() {
                    let spot = COLLECTIBLE_POSITIONS[self.spawned as usize];
                    match self.catalog.closest_inactive(spot) {
                        Some(i) => (i, spot),
                        None => break,
                    }
                } else {
                    match self.catalog.random_inactive(rng) {
                        Some(i) => {
                            let center = self.catalog.get(i).map(|b| b.center).unwrap_or(Vec3::ZERO);
                            (i, center + Vec3::new(0.0, ROOF_HOVER, 0.0))
                        }
                        None => break,
                    }
                };

            self.catalog.activate(building_index, scene);
            self.spawned += 1;
            requests.push(SpawnRequest {
                position,
                building_index,
            });
        }
        log::debug!(
            "unlock step for {} collected: {} collectibles spawned",
            collected,
            requests.len()
        );
        requests
    }
}
