//! Player controller: camera-relative movement, jump physics, health.
//!
//! The player is the camera. Horizontal movement projects the held
//! direction flags onto the camera's ground-plane basis; vertical motion is
//! a plain gravity integrator clamped to the ground height under the
//! player. Health regenerates continuously and clamps at zero - reaching
//! zero is reported but not terminal.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::InputState;
use crate::level::LevelConfig;
use crate::math::{yaw_dir, ViewPose};
use crate::scene::Scene;

pub const MAX_HEALTH: f32 = 100.0;
/// Health restored per second while below max.
pub const REGEN_RATE: f32 = 5.0;
/// Seconds the damage flash stays on screen.
pub const HIT_FLASH_DURATION: f32 = 0.15;
/// Flat damage for falling off the world. Never lethal on its own.
pub const FALL_DAMAGE: f32 = 20.0;
/// Pitch stays inside +/- 0.45 pi so the view can't flip.
pub const PITCH_LIMIT: f32 = 0.45 * std::f32::consts::PI;
/// Forward obstacle probe length and block threshold.
const OBSTACLE_PROBE_RANGE: f32 = 2.0;
const OBSTACLE_BLOCK_DISTANCE: f32 = 1.5;
/// Downward ground query reach.
const GROUND_PROBE_RISE: f32 = 100.0;
/// Tolerance for counting as grounded.
const GROUND_EPSILON: f32 = 0.1;

/// What happened to the player during a movement update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerMoveEvents {
    /// Fell below the kill plane and was teleported back to spawn.
    pub respawned: bool,
}

/// Outcome of a damage application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health reached zero with this hit.
    pub died: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Eye position (the camera).
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub velocity_y: f32,
    pub jumps_remaining: u32,
    pub health: f32,
    jump_was_released: bool,
    hit_flash: f32,
    spawn_point: Vec3,
}

impl Player {
    pub fn new(spawn_point: Vec3, yaw: f32) -> Self {
        Self {
            position: spawn_point,
            yaw,
            pitch: 0.0,
            velocity_y: 0.0,
            jumps_remaining: 0,
            health: MAX_HEALTH,
            jump_was_released: true,
            hit_flash: 0.0,
            spawn_point,
        }
    }

    /// Applies a consumed look delta (pixels) at the given sensitivity.
    pub fn apply_look(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw += delta.x * sensitivity;
        self.pitch = (self.pitch + delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Camera basis for aiming and projectile spawning.
    pub fn view_pose(&self) -> ViewPose {
        ViewPose::from_angles(self.position, self.yaw, self.pitch)
    }

    pub fn is_at_full_health(&self) -> bool {
        self.health >= MAX_HEALTH
    }

    /// One movement step: walk, jump, gravity, ground clamp, fall check.
    pub fn update_movement(
        &mut self,
        dt: f32,
        input: &InputState,
        config: &LevelConfig,
        scene: &dyn Scene,
        default_ground_y: f32,
    ) -> PlayerMoveEvents {
        let mut events = PlayerMoveEvents::default();

        // Camera basis flattened onto the ground plane.
        let forward = yaw_dir(self.yaw);
        let right = Vec3::new(forward.z, 0.0, -forward.x);

        let mut step = Vec3::ZERO;
        if input.forward {
            step += forward;
        }
        if input.back {
            step -= forward;
        }
        if input.left {
            step -= right;
        }
        if input.right {
            step += right;
        }
        if step.length_squared() > 0.0 {
            step = step.normalize() * config.move_speed * dt;

            // Walking into a building stops the whole move, no sliding.
            if config.building_collision {
                let probe_origin = self.position - Vec3::new(0.0, 0.5, 0.0);
                let blocked = scene
                    .query_obstacle_ahead(probe_origin, step.normalize(), OBSTACLE_PROBE_RANGE)
                    .is_some_and(|d| d < OBSTACLE_BLOCK_DISTANCE);
                if blocked {
                    step = Vec3::ZERO;
                }
            }
            self.position += step;
        }

        // Ground under the player; fall back to the level's walk plane when
        // the query misses (e.g. past the edge of the model).
        let ground_y = scene
            .query_ground_height(self.position.x, self.position.z)
            .unwrap_or(default_ground_y);
        let target_y = ground_y + LevelConfig::EYE_HEIGHT;
        let on_ground = self.position.y <= target_y + GROUND_EPSILON;

        // Edge-triggered jump latch: holding the key cannot chain jumps.
        if !input.jump {
            self.jump_was_released = true;
        }
        if input.jump && self.jump_was_released {
            if on_ground {
                self.velocity_y = config.jump_force;
                self.jump_was_released = false;
                self.jumps_remaining = config.max_jumps.saturating_sub(1);
            } else if self.jumps_remaining > 0 {
                // Successive airborne jumps get progressively weaker.
                let scale =
                    0.7 + (self.jumps_remaining as f32 / config.max_jumps as f32) * 0.3;
                self.velocity_y = config.jump_force * scale;
                self.jumps_remaining -= 1;
                self.jump_was_released = false;
            }
        }

        self.velocity_y -= config.gravity * dt;
        self.position.y += self.velocity_y * dt;

        // Never sink below the walk plane; landing restores the jumps.
        if self.position.y < target_y {
            self.position.y = target_y;
            self.velocity_y = 0.0;
            self.jumps_remaining = 0;
        }

        if self.position.y < config.fall_death_y {
            log::debug!("player fell out of the world, respawning");
            self.position = self.spawn_point;
            self.velocity_y = 0.0;
            self.jumps_remaining = config.max_jumps;
            // Fall damage stings but never kills.
            self.health = (self.health - FALL_DAMAGE).max(1.0);
            self.hit_flash = HIT_FLASH_DURATION;
            events.respawned = true;
        }

        events
    }

    /// Applies damage, clamping at zero. Dying is a reported condition, not
    /// a state change - regen will bring the player back up.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        let was_alive = self.health > 0.0;
        self.health = (self.health - amount).max(0.0);
        self.hit_flash = HIT_FLASH_DURATION;
        DamageOutcome {
            died: was_alive && self.health <= 0.0,
        }
    }

    /// Continuous regeneration toward max. Returns whether health changed.
    pub fn regenerate(&mut self, dt: f32) -> bool {
        if self.health >= MAX_HEALTH {
            return false;
        }
        self.health = (self.health + REGEN_RATE * dt).min(MAX_HEALTH);
        true
    }

    /// Counts the hit flash down; true when it just expired.
    pub fn tick_hit_flash(&mut self, dt: f32) -> bool {
        if self.hit_flash <= 0.0 {
            return false;
        }
        self.hit_flash -= dt;
        self.hit_flash <= 0.0
    }
}
