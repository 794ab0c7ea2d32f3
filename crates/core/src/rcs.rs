//! RCS antagonist controller.
//!
//! Two behaviors, selected per level. In the canyon he is a fixture on the
//! horizon, pinned at a fixed offset from the player. In the city and the
//! arena he pursues: walking toward the player's ground position, slowing
//! to a stop at a minimum approach distance, and steering around buildings
//! with a throttled look-ahead probe whose decision is held for a while
//! before re-evaluating.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::RcsOverride;
use crate::level::RcsSettings;
use crate::scene::{Scene, SceneId, SceneKind, Transform};

/// Look-ahead probe distance when checking for buildings.
const PROBE_DISTANCE: f32 = 8.0;
/// Probe origin height above the feet.
const PROBE_HEIGHT: f32 = 2.0;
/// Probes run once per this many ticks.
const PROBE_PERIOD: u8 = 8;
/// Steering deflection when avoiding, and how long the decision holds.
const STEER_ANGLE: f32 = std::f32::consts::FRAC_PI_3;
const STEER_HOLD: f32 = 1.0;
/// Speed ramps from zero at min approach to full over this many units.
const APPROACH_RAMP: f32 = 20.0;

/// Behavior variant for the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RcsMode {
    /// Pinned at a fixed offset from the player, facing a set heading.
    IdleHorizon,
    /// Walks toward the player with obstacle steering.
    Pursuit,
}

#[derive(Debug, Clone, Copy, Default)]
struct SteerState {
    angle: f32,
    hold_left: f32,
    probe_phase: u8,
    blocked_ahead: bool,
}

#[derive(Debug)]
pub struct Rcs {
    pub scene_id: SceneId,
    /// Glasses hitbox entity; present on the boss level only.
    pub glasses_id: Option<SceneId>,
    pub position: Vec3,
    pub yaw: f32,
    steer: SteerState,
}

impl Rcs {
    pub fn new(scene: &mut dyn Scene, settings: &RcsSettings, start: Vec3, with_glasses: bool) -> Self {
        let scene_id = scene.create_entity(
            SceneKind::Rcs,
            Transform::at(start).with_scale(settings.scale),
        );
        let glasses_id = with_glasses.then(|| {
            scene.create_entity(
                SceneKind::Glasses,
                Transform::at(start + Vec3::new(0.0, settings.glasses_height, 0.0)),
            )
        });
        Self {
            scene_id,
            glasses_id,
            position: start,
            yaw: 0.0,
            steer: SteerState::default(),
        }
    }

    /// World position of the glasses hitbox.
    pub fn glasses_position(&self, settings: &RcsSettings) -> Vec3 {
        self.position + Vec3::new(0.0, settings.glasses_height, 0.0)
    }

    /// Canyon fixture: always a fixed distance ahead of the player along +X
    /// at an absolute height. The debug override substitutes its live
    /// values when enabled.
    pub fn update_idle(
        &mut self,
        scene: &mut dyn Scene,
        player_pos: Vec3,
        settings: &RcsSettings,
        debug_override: Option<&RcsOverride>,
    ) {
        let (distance, height, scale, yaw) = match debug_override {
            Some(o) => (o.distance, o.height_offset, o.scale, o.yaw),
            None => (settings.idle_distance, settings.height_offset, settings.scale, 0.0),
        };
        self.position = Vec3::new(player_pos.x + distance, height, player_pos.z);
        self.yaw = yaw;
        scene.set_transform(
            self.scene_id,
            Transform::at(self.position).with_yaw(self.yaw).with_scale(scale),
        );
    }

    /// Pursuit step. `ground_y` is the level's static walk plane for the
    /// antagonist - recalculated from bounds, not probed per frame.
    pub fn update_pursuit(
        &mut self,
        dt: f32,
        scene: &mut dyn Scene,
        player_pos: Vec3,
        settings: &RcsSettings,
        ground_y: f32,
    ) {
        let dx = player_pos.x - self.position.x;
        let dz = player_pos.z - self.position.z;
        let dist = (dx * dx + dz * dz).sqrt();

        if dist > settings.min_approach {
            let mut dir_x = dx / dist;
            let mut dir_z = dz / dist;

            // Throttled look-ahead; the cached answer steers in between.
            self.steer.probe_phase = (self.steer.probe_phase + 1) % PROBE_PERIOD;
            if self.steer.probe_phase == 0 {
                let origin = self.position + Vec3::new(0.0, PROBE_HEIGHT, 0.0);
                let ahead = Vec3::new(dir_x, 0.0, dir_z);
                self.steer.blocked_ahead = scene
                    .query_obstacle_ahead(origin, ahead, PROBE_DISTANCE)
                    .is_some();

                if self.steer.blocked_ahead && self.steer.hold_left <= 0.0 {
                    // Compare clearance to both sides and commit to one.
                    let left = Vec3::new(-dir_z, 0.0, dir_x);
                    let right = Vec3::new(dir_z, 0.0, -dir_x);
                    let left_clear = scene
                        .query_obstacle_ahead(origin, left, PROBE_DISTANCE)
                        .unwrap_or(PROBE_DISTANCE);
                    let right_clear = scene
                        .query_obstacle_ahead(origin, right, PROBE_DISTANCE)
                        .unwrap_or(PROBE_DISTANCE);
                    self.steer.angle = if left_clear > right_clear {
                        STEER_ANGLE
                    } else {
                        -STEER_ANGLE
                    };
                    self.steer.hold_left = STEER_HOLD;
                    log::debug!("rcs steering {}", if self.steer.angle > 0.0 { "left" } else { "right" });
                }
            }

            if self.steer.blocked_ahead && self.steer.hold_left > 0.0 {
                let (sin, cos) = self.steer.angle.sin_cos();
                let steered_x = dir_x * cos - dir_z * sin;
                let steered_z = dir_x * sin + dir_z * cos;
                dir_x = steered_x;
                dir_z = steered_z;
                self.steer.hold_left -= dt;
            } else if !self.steer.blocked_ahead {
                // Path is clear: bleed the held bias off quickly.
                self.steer.hold_left = (self.steer.hold_left - dt * 2.0).max(0.0);
            }

            let ramp = ((dist - settings.min_approach) / APPROACH_RAMP).min(1.0);
            self.position.x += dir_x * settings.walk_speed * ramp * dt;
            self.position.z += dir_z * settings.walk_speed * ramp * dt;
        }

        // Face the player bearing even when stopped.
        self.yaw = dx.atan2(dz);
        self.position.y = ground_y + settings.height_offset;

        scene.set_transform(
            self.scene_id,
            Transform::at(self.position)
                .with_yaw(self.yaw)
                .with_scale(settings.scale),
        );
        if let Some(glasses_id) = self.glasses_id {
            scene.set_transform(glasses_id, Transform::at(self.glasses_position(settings)));
        }
    }
}
