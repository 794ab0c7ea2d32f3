//! Collectible pool (city pickups).
//!
//! Each collectible floats over its building and doubles as a rotating
//! laser hazard while the player is nearby: the sweep angle accumulates at
//! a constant rate and a beam fires along it on a fixed interval. Walking
//! into a collectible removes it and bumps the collected count.

use glam::Vec3;

use crate::entities::laser::LaserPool;
use crate::entities::EntityId;
use crate::scene::{Scene, SceneId, SceneKind, Transform};

/// Pickup range.
pub const COLLECTION_RADIUS: f32 = 3.0;
/// The hazard only fires while the player is inside this range.
pub const ACTIVATION_RADIUS: f32 = 40.0;
/// Beam length along the sweep direction.
pub const BEAM_LENGTH: f32 = 30.0;
/// Seconds between beams while active.
pub const FIRE_INTERVAL: f32 = 0.15;
/// Sweep speed in radians per second.
pub const SWEEP_RATE: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: EntityId,
    pub scene_id: SceneId,
    pub position: Vec3,
    /// Index of the building this collectible sits on.
    pub building_index: usize,
    sweep_angle: f32,
    fire_timer: f32,
    active: bool,
}

/// Result of a successful pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collected {
    pub building_index: usize,
}

#[derive(Debug, Default)]
pub struct CollectiblePool {
    collectibles: Vec<Collectible>,
    next_id: EntityId,
    collected: u32,
}

impl CollectiblePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, scene: &mut dyn Scene, position: Vec3, building_index: usize) {
        self.next_id += 1;
        let scene_id = scene.create_entity(SceneKind::Collectible, Transform::at(position));
        self.collectibles.push(Collectible {
            id: self.next_id,
            scene_id,
            position,
            building_index,
            sweep_angle: 0.0,
            fire_timer: 0.0,
            active: false,
        });
    }

    /// Picks up the first collectible (in list order) within range, if any.
    /// At most one pickup per call.
    pub fn check_collection(&mut self, scene: &mut dyn Scene, player_pos: Vec3) -> Option<Collected> {
        let index = self
            .collectibles
            .iter()
            .position(|c| c.position.distance(player_pos) < COLLECTION_RADIUS)?;
        let c = self.collectibles.remove(index);
        scene.destroy_entity(c.scene_id);
        self.collected += 1;
        log::debug!("collected {}/{}", self.collected, crate::progression::city::TOTAL_TO_WIN);
        Some(Collected {
            building_index: c.building_index,
        })
    }

    /// Advances activation, sweep and beam firing.
    pub fn update(
        &mut self,
        dt: f32,
        scene: &mut dyn Scene,
        player_pos: Vec3,
        lasers: &mut LaserPool,
    ) {
        for c in &mut self.collectibles {
            c.active = c.position.distance(player_pos) < ACTIVATION_RADIUS;
            if !c.active {
                continue;
            }

            c.sweep_angle += dt * SWEEP_RATE;
            c.fire_timer += dt;
            if c.fire_timer > FIRE_INTERVAL {
                c.fire_timer = 0.0;
                let dir = Vec3::new(c.sweep_angle.sin(), 0.0, c.sweep_angle.cos());
                // Horizontal beam out from the pickup.
                lasers.fire(scene, c.position, c.position + dir * BEAM_LENGTH);
            }
        }
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn live(&self) -> usize {
        self.collectibles.len()
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    /// Debug skip support: removes every live collectible and rewrites the
    /// collected count.
    pub fn reset(&mut self, scene: &mut dyn Scene) {
        for c in self.collectibles.drain(..) {
            scene.destroy_entity(c.scene_id);
        }
        self.collected = 0;
    }

    /// Debug skip support: consumes the `n` oldest live collectibles as if
    /// they had been picked up.
    pub fn force_collect(&mut self, scene: &mut dyn Scene, n: usize) {
        for _ in 0..n.min(self.collectibles.len()) {
            let c = self.collectibles.remove(0);
            scene.destroy_entity(c.scene_id);
            self.collected += 1;
        }
    }
}
