//! Projectile pool.
//!
//! Shots fly at constant speed along the camera's forward direction and
//! expire after a fixed travel distance. The boss level swaps in the
//! missile tuning: slower fire rate, longer range, optional gravity arc and
//! optional homing that bends velocity toward a target while preserving
//! speed. Firing is gated both by the cooldown and by the template-ready
//! flag - until the projectile model finishes loading, `fire` is a no-op.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::EntityId;
use crate::math::ViewPose;
use crate::scene::{Scene, SceneId, SceneKind, Transform};

/// Muzzle offset in camera space: slightly right, slightly down, forward.
const MUZZLE_RIGHT: f32 = 0.3;
const MUZZLE_DOWN: f32 = -0.2;
const MUZZLE_FORWARD: f32 = 0.8;

/// Flight tuning for one weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub max_range: f32,
    pub cooldown: f32,
    /// Downward acceleration; zero for a flat trajectory.
    pub gravity: f32,
    /// Homing blend strength; zero disables tracking.
    pub homing_strength: f32,
}

impl ProjectileTuning {
    /// The regular shooter.
    pub fn zapper() -> Self {
        Self {
            speed: 40.0,
            max_range: 100.0,
            cooldown: 0.15,
            gravity: 0.0,
            homing_strength: 0.0,
        }
    }

    /// The boss-level missile launcher.
    pub fn scope() -> Self {
        Self {
            speed: 100.0,
            max_range: 200.0,
            cooldown: 0.5,
            gravity: 0.0,
            homing_strength: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub scene_id: SceneId,
    pub position: Vec3,
    pub velocity: Vec3,
    origin: Vec3,
}

#[derive(Debug)]
pub struct ProjectilePool {
    tuning: ProjectileTuning,
    projectiles: Vec<Projectile>,
    cooldown_left: f32,
    template_ready: bool,
    next_id: EntityId,
    /// Homing destination, refreshed by the orchestrator each tick.
    pub homing_target: Option<Vec3>,
}

impl ProjectilePool {
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            tuning,
            projectiles: Vec::new(),
            cooldown_left: 0.0,
            template_ready: false,
            next_id: 0,
            homing_target: None,
        }
    }

    /// Marks the projectile model as loaded; firing stays a no-op until then.
    pub fn set_template_ready(&mut self) {
        self.template_ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.template_ready
    }

    /// Fires one shot from the camera muzzle. Returns whether a projectile
    /// actually spawned, so the caller can count the shot.
    pub fn fire(&mut self, scene: &mut dyn Scene, pose: &ViewPose) -> bool {
        if self.cooldown_left > 0.0 || !self.template_ready {
            return false;
        }
        self.cooldown_left = self.tuning.cooldown;

        let position = pose.position
            + pose.right * MUZZLE_RIGHT
            + pose.up * MUZZLE_DOWN
            + pose.forward * MUZZLE_FORWARD;
        let velocity = pose.forward * self.tuning.speed;

        self.next_id += 1;
        let scene_id = scene.create_entity(SceneKind::Projectile, Transform::at(position));
        self.projectiles.push(Projectile {
            id: self.next_id,
            scene_id,
            position,
            velocity,
            origin: position,
        });
        true
    }

    pub fn update(&mut self, dt: f32, scene: &mut dyn Scene) {
        self.cooldown_left = (self.cooldown_left - dt).max(0.0);

        let tuning = self.tuning;
        let target = self.homing_target;
        self.projectiles.retain_mut(|p| {
            if tuning.gravity > 0.0 {
                p.velocity.y -= tuning.gravity * dt;
            }

            if let (Some(target), true) = (target, tuning.homing_strength > 0.0) {
                let to_target = (target - p.position).normalize_or_zero();
                let current_dir = p.velocity.normalize_or_zero();
                p.velocity += (to_target - current_dir) * tuning.homing_strength * dt * tuning.speed;

                // Bending must not add energy: renormalize to the lesser of
                // the current and nominal speed.
                let speed = p.velocity.length();
                if speed > 0.1 {
                    p.velocity = p.velocity / speed * speed.min(tuning.speed);
                }
            }

            p.position += p.velocity * dt;

            if p.position.distance(p.origin) > tuning.max_range {
                scene.destroy_entity(p.scene_id);
                return false;
            }

            let yaw = p.velocity.x.atan2(p.velocity.z);
            scene.set_transform(p.scene_id, Transform::at(p.position).with_yaw(yaw));
            true
        });
    }

    /// Removes a projectile hit-consumed by a collision. Idempotent: a stale
    /// id is ignored.
    pub fn remove(&mut self, scene: &mut dyn Scene, id: EntityId) {
        if let Some(index) = self.projectiles.iter().position(|p| p.id == id) {
            let p = self.projectiles.remove(index);
            scene.destroy_entity(p.scene_id);
        }
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FlatScene;

    fn ready_pool(tuning: ProjectileTuning) -> ProjectilePool {
        let mut pool = ProjectilePool::new(tuning);
        pool.set_template_ready();
        pool
    }

    fn level_pose() -> ViewPose {
        ViewPose::from_angles(Vec3::new(0.0, 2.0, 0.0), 0.0, 0.0)
    }

    #[test]
    fn fire_is_noop_until_template_ready() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ProjectilePool::new(ProjectileTuning::zapper());
        assert!(!pool.fire(&mut scene, &level_pose()));
        assert_eq!(pool.len(), 0);

        pool.set_template_ready();
        assert!(pool.fire(&mut scene, &level_pose()));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn cooldown_gates_fire_rate() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ready_pool(ProjectileTuning::zapper());

        assert!(pool.fire(&mut scene, &level_pose()));
        assert!(!pool.fire(&mut scene, &level_pose()));

        // A tick shorter than the cooldown still blocks.
        pool.update(0.1, &mut scene);
        assert!(!pool.fire(&mut scene, &level_pose()));

        pool.update(0.1, &mut scene);
        assert!(pool.fire(&mut scene, &level_pose()));
    }

    #[test]
    fn straight_flight_covers_speed_times_time() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ready_pool(ProjectileTuning::zapper());
        pool.fire(&mut scene, &level_pose());
        let start = pool.projectiles()[0].position;

        for _ in 0..60 {
            pool.update(1.0 / 60.0, &mut scene);
        }
        let travelled = pool.projectiles()[0].position.distance(start);
        assert!((travelled - 40.0).abs() < 0.01, "travelled {travelled}");
    }

    #[test]
    fn shot_expires_past_max_range() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ready_pool(ProjectileTuning::zapper());
        pool.fire(&mut scene, &level_pose());

        // 100 units of range at 40 u/s is 2.5s of flight.
        for _ in 0..200 {
            pool.update(1.0 / 60.0, &mut scene);
        }
        assert!(pool.is_empty());
        assert_eq!(scene.live_count(SceneKind::Projectile), 0);
    }

    #[test]
    fn homing_preserves_speed_and_bends_course() {
        let mut scene = FlatScene::new(0.0);
        let mut tuning = ProjectileTuning::scope();
        tuning.homing_strength = 2.0;
        let mut pool = ready_pool(tuning);
        pool.homing_target = Some(Vec3::new(50.0, 2.0, 50.0));
        pool.fire(&mut scene, &level_pose());

        for _ in 0..30 {
            pool.update(1.0 / 60.0, &mut scene);
        }
        let p = &pool.projectiles()[0];
        assert!((p.velocity.length() - tuning.speed).abs() < 1.0);
        // Initially flying along +Z; homing should have pulled it toward +X.
        assert!(p.velocity.x > 1.0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ready_pool(ProjectileTuning::zapper());
        pool.fire(&mut scene, &level_pose());
        let id = pool.projectiles()[0].id;

        pool.remove(&mut scene, id);
        pool.remove(&mut scene, id);
        assert!(pool.is_empty());
    }
}
