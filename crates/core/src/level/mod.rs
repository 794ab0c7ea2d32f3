//! Per-level configuration: identity, constant tables, bounds and spawn
//! placement. The terrain strategies and the city building catalog live in
//! the submodules.

pub mod buildings;
pub mod terrain;

use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::entities::projectile::ProjectileTuning;
use crate::rcs::RcsMode;
use crate::scene::SceneId;

/// The three campaign levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelId {
    Canyon,
    City,
    Boss,
}

impl LevelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelId::Canyon => "canyon",
            LevelId::City => "city",
            LevelId::Boss => "boss",
        }
    }

    /// The level that follows this one, if any.
    pub fn next(&self) -> Option<LevelId> {
        match self {
            LevelId::Canyon => Some(LevelId::City),
            LevelId::City => Some(LevelId::Boss),
            LevelId::Boss => None,
        }
    }
}

impl FromStr for LevelId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canyon" => Ok(LevelId::Canyon),
            "city" => Ok(LevelId::City),
            "boss" => Ok(LevelId::Boss),
            other => Err(ConfigError::UnknownLevel(other.to_string())),
        }
    }
}

/// Axis-aligned bounds of the loaded terrain, reported by the engine after
/// the level model finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl LevelBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center_x(&self) -> f32 {
        (self.min.x + self.max.x) * 0.5
    }

    pub fn center_z(&self) -> f32 {
        (self.min.z + self.max.z) * 0.5
    }
}

/// Antagonist tuning for one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RcsSettings {
    pub scale: f32,
    /// Horizon distance ahead of the player in idle mode.
    pub idle_distance: f32,
    /// Idle mode: absolute Y. Pursuit mode: offset above the walk plane.
    pub height_offset: f32,
    pub walk_speed: f32,
    /// Pursuit stops inside this range; speed ramps over the next 20 units.
    pub min_approach: f32,
    /// Vertical offset of the glasses hitbox above the model origin.
    pub glasses_height: f32,
}

/// Everything constant about a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: LevelId,
    pub move_speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub max_jumps: u32,
    /// Walk plane sits this far above the terrain's minimum Y.
    pub ground_margin: f32,
    /// The antagonist's walk plane may differ from the player's.
    pub rcs_ground_margin: f32,
    pub fall_death_y: f32,
    pub enemy_spawn_interval: f32,
    pub max_enemies: usize,
    /// Forward obstacle probe that blocks walking into buildings.
    pub building_collision: bool,
    pub projectile: ProjectileTuning,
    pub explosion_size: f32,
    pub rcs_mode: RcsMode,
    pub rcs: RcsSettings,
}

impl LevelConfig {
    pub const EYE_HEIGHT: f32 = 1.0;

    pub fn for_level(id: LevelId) -> Self {
        match id {
            LevelId::Canyon => Self {
                id,
                move_speed: 6.0,
                jump_force: 6.0,
                gravity: 30.0,
                max_jumps: 1,
                ground_margin: 5.0,
                rcs_ground_margin: 0.0,
                fall_death_y: -100.0,
                enemy_spawn_interval: 1.5,
                max_enemies: 20,
                building_collision: false,
                projectile: ProjectileTuning::zapper(),
                explosion_size: 3.0,
                rcs_mode: RcsMode::IdleHorizon,
                rcs: RcsSettings {
                    scale: 0.0184,
                    idle_distance: 160.0,
                    height_offset: -6.0,
                    walk_speed: 5.0,
                    min_approach: 15.0,
                    glasses_height: 0.0,
                },
            },
            LevelId::City => Self {
                id,
                move_speed: 15.0,
                jump_force: 50.0,
                gravity: 30.0,
                max_jumps: 3,
                ground_margin: 46.0,
                rcs_ground_margin: 45.0,
                fall_death_y: -100.0,
                enemy_spawn_interval: 3.0,
                max_enemies: 10,
                building_collision: true,
                projectile: ProjectileTuning::zapper(),
                explosion_size: 3.0,
                rcs_mode: RcsMode::Pursuit,
                rcs: RcsSettings {
                    scale: 0.015,
                    idle_distance: 20.0,
                    height_offset: 0.0,
                    walk_speed: 5.0,
                    min_approach: 15.0,
                    glasses_height: 0.0,
                },
            },
            LevelId::Boss => Self {
                id,
                move_speed: 10.0,
                jump_force: 50.0,
                gravity: 30.0,
                max_jumps: 3,
                ground_margin: 2.0,
                rcs_ground_margin: 2.0,
                fall_death_y: -100.0,
                enemy_spawn_interval: f32::INFINITY,
                max_enemies: 0,
                building_collision: false,
                projectile: ProjectileTuning::scope(),
                explosion_size: 12.0,
                rcs_mode: RcsMode::Pursuit,
                rcs: RcsSettings {
                    scale: 0.025,
                    idle_distance: 30.0,
                    height_offset: 15.0,
                    walk_speed: 1.5,
                    min_approach: 8.0,
                    glasses_height: 0.625,
                },
            },
        }
    }

    /// Y of the player's walk plane for these bounds.
    pub fn ground_reference(&self, bounds: &LevelBounds) -> f32 {
        bounds.min.y + self.ground_margin
    }

    /// Y of the antagonist's walk plane. Recomputed from static bounds, not
    /// from a per-frame probe.
    pub fn rcs_ground_reference(&self, bounds: &LevelBounds) -> f32 {
        bounds.min.y + self.rcs_ground_margin
    }

    /// Where the player starts (and respawns after a fall).
    pub fn spawn_point(&self, bounds: &LevelBounds) -> Vec3 {
        match self.id {
            // One end of the canyon, centered between the walls.
            LevelId::Canyon => Vec3::new(
                bounds.min.x + 50.0,
                bounds.min.y + 5.0 + Self::EYE_HEIGHT,
                bounds.center_z(),
            ),
            // Edge of the city, dropped in from above the rooftops.
            LevelId::City => Vec3::new(
                bounds.min.x + 20.0,
                bounds.min.y + 50.0 + Self::EYE_HEIGHT,
                bounds.min.z + 20.0,
            ),
            // Center of the arena, falling to the floor.
            LevelId::Boss => Vec3::new(
                bounds.center_x(),
                bounds.min.y + 50.0,
                bounds.center_z(),
            ),
        }
    }
}

/// A candidate building mesh reported by the engine when the city model
/// loads: its handle, world-space center and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingSeed {
    pub scene_id: SceneId,
    pub center: Vec3,
    pub height: f32,
}

/// Engine-reported level geometry handed to the simulation at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSetup {
    pub bounds: LevelBounds,
    /// Candidate building meshes (city level only).
    pub buildings: Vec<BuildingSeed>,
    /// World length of one canyon terrain segment.
    pub segment_length: f32,
}

impl LevelSetup {
    /// Synthetic geometry for tests and headless runs.
    pub fn test(id: LevelId) -> Self {
        match id {
            LevelId::Canyon => Self {
                bounds: LevelBounds::new(
                    Vec3::new(0.0, 0.0, -60.0),
                    Vec3::new(5000.0, 120.0, 60.0),
                ),
                buildings: Vec::new(),
                segment_length: 380.0,
            },
            LevelId::City => {
                let mut buildings = Vec::new();
                let mut id_seq = 1000;
                for gx in -3i32..=3 {
                    for gz in -3i32..=3 {
                        id_seq += 1;
                        buildings.push(BuildingSeed {
                            scene_id: id_seq,
                            center: Vec3::new(gx as f32 * 100.0, 80.0, gz as f32 * 100.0),
                            height: 60.0,
                        });
                    }
                }
                // A few flat road meshes that must not be cataloged.
                for i in 0..3 {
                    id_seq += 1;
                    buildings.push(BuildingSeed {
                        scene_id: id_seq,
                        center: Vec3::new(i as f32 * 50.0, 1.0, 0.0),
                        height: 2.0,
                    });
                }
                Self {
                    bounds: LevelBounds::new(
                        Vec3::new(-400.0, 0.0, -400.0),
                        Vec3::new(400.0, 200.0, 400.0),
                    ),
                    buildings,
                    segment_length: 0.0,
                }
            }
            LevelId::Boss => Self {
                bounds: LevelBounds::new(
                    Vec3::new(-100.0, 0.0, -100.0),
                    Vec3::new(100.0, 60.0, 100.0),
                ),
                buildings: Vec::new(),
                segment_length: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_id_round_trip() {
        for id in [LevelId::Canyon, LevelId::City, LevelId::Boss] {
            assert_eq!(id.as_str().parse::<LevelId>().unwrap(), id);
        }
    }

    #[test]
    fn unknown_level_is_fatal() {
        let err = "moonbase".parse::<LevelId>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownLevel("moonbase".to_string()));
    }

    #[test]
    fn level_ordering() {
        assert_eq!(LevelId::Canyon.next(), Some(LevelId::City));
        assert_eq!(LevelId::City.next(), Some(LevelId::Boss));
        assert_eq!(LevelId::Boss.next(), None);
    }

    #[test]
    fn canyon_spawn_sits_on_the_floor() {
        let config = LevelConfig::for_level(LevelId::Canyon);
        let setup = LevelSetup::test(LevelId::Canyon);
        let spawn = config.spawn_point(&setup.bounds);
        assert_eq!(spawn.x, 50.0);
        assert_eq!(spawn.z, 0.0);
        assert_eq!(spawn.y, 6.0);
    }

    #[test]
    fn city_is_the_fast_multi_jump_level() {
        let config = LevelConfig::for_level(LevelId::City);
        assert_eq!(config.max_jumps, 3);
        assert!(config.building_collision);
        assert!(config.move_speed > LevelConfig::for_level(LevelId::Canyon).move_speed);
    }

    #[test]
    fn boss_disables_grifter_spawning() {
        let config = LevelConfig::for_level(LevelId::Boss);
        assert_eq!(config.max_enemies, 0);
        assert!(config.enemy_spawn_interval.is_infinite());
    }
}
