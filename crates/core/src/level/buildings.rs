//! City building catalog.
//!
//! Buildings start dark and activate as the player collects; multi-mesh
//! structures are treated as one unit by also activating every inactive
//! mesh within a fixed XZ radius of the activated one.

use glam::Vec3;

use crate::config::ConfigError;
use crate::level::BuildingSeed;
use crate::random::SeededRandom;
use crate::scene::{Scene, SceneId};

/// Meshes shorter than this are roads/ground, not buildings.
const MIN_BUILDING_HEIGHT: f32 = 5.0;
/// Activating a building also lights every inactive mesh this close (XZ).
const GROUP_RADIUS: f32 = 30.0;

#[derive(Debug, Clone)]
pub struct Building {
    pub scene_id: SceneId,
    pub center: Vec3,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct BuildingCatalog {
    buildings: Vec<Building>,
}

impl BuildingCatalog {
    /// Filters the engine-reported candidate meshes down to buildings.
    /// An empty catalog makes the city unplayable, so it is startup-fatal.
    pub fn from_seeds(seeds: &[BuildingSeed]) -> Result<Self, ConfigError> {
        let buildings: Vec<Building> = seeds
            .iter()
            .filter(|s| s.height > MIN_BUILDING_HEIGHT)
            .map(|s| Building {
                scene_id: s.scene_id,
                center: s.center,
                active: false,
            })
            .collect();
        if buildings.is_empty() {
            return Err(ConfigError::NoBuildings);
        }
        Ok(Self { buildings })
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Building> {
        self.buildings.get(index)
    }

    pub fn active_count(&self) -> usize {
        self.buildings.iter().filter(|b| b.active).count()
    }

    /// Index of the inactive building closest (XZ) to a position.
    pub fn closest_inactive(&self, position: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, b) in self.buildings.iter().enumerate() {
            if b.active {
                continue;
            }
            let dx = b.center.x - position.x;
            let dz = b.center.z - position.z;
            let dist = (dx * dx + dz * dz).sqrt();
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Uniform pick among the inactive buildings.
    pub fn random_inactive(&self, rng: &mut SeededRandom) -> Option<usize> {
        let inactive: Vec<usize> = self
            .buildings
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.active)
            .map(|(i, _)| i)
            .collect();
        if inactive.is_empty() {
            return None;
        }
        Some(inactive[rng.next_int(inactive.len() as u32) as usize])
    }

    /// Activates a building and its nearby sibling meshes, flipping their
    /// engine presentation. Returns the number of meshes newly activated;
    /// re-activating is a no-op.
    pub fn activate(&mut self, index: usize, scene: &mut dyn Scene) -> usize {
        let Some(anchor) = self.buildings.get(index) else {
            return 0;
        };
        if anchor.active {
            return 0;
        }
        let anchor_center = anchor.center;

        let mut activated = 0;
        for (i, b) in self.buildings.iter_mut().enumerate() {
            if b.active {
                continue;
            }
            let dx = b.center.x - anchor_center.x;
            let dz = b.center.z - anchor_center.z;
            let within_group = (dx * dx + dz * dz).sqrt() < GROUP_RADIUS;
            if i == index || within_group {
                b.active = true;
                scene.set_entity_active(b.scene_id, true);
                activated += 1;
                log::debug!("activated building mesh {i}");
            }
        }
        activated
    }

    /// Darkens everything again (debug skip helper).
    pub fn reset(&mut self, scene: &mut dyn Scene) {
        for b in &mut self.buildings {
            if b.active {
                b.active = false;
                scene.set_entity_active(b.scene_id, false);
            }
        }
    }
}
