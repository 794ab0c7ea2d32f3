//! Grifter (enemy) pool.
//!
//! Grifters spawn on a timer, walk straight at the player on the ground
//! plane and die to the first projectile that gets close enough. Ground
//! height is resolved with a downward query that is throttled to every
//! fifth tick per entity - staggered so no single frame queries the whole
//! pool - and smoothed toward the cached result in between.
//!
//! Collision tie-breaks are pool-order-dependent: grifters are scanned
//! newest-first and each takes the first projectile in pool order found
//! within the hit radius. No global ordering is guaranteed.

use glam::Vec3;

use crate::entities::projectile::ProjectilePool;
use crate::entities::EntityId;
use crate::math::{flatten, smooth_approach};
use crate::random::SeededRandom;
use crate::scene::{Scene, SceneId, SceneKind, Transform};

/// A projectile this close kills the grifter.
pub const HIT_RADIUS: f32 = 1.2;
/// The grifter detonates on the player inside this range.
pub const CONTACT_RADIUS: f32 = 1.5;
/// Damage dealt to the player on contact.
pub const CONTACT_DAMAGE: f32 = 15.0;
/// Sprite center rides this far above the ground hit.
const SPRITE_LIFT: f32 = 0.75;
/// Ground queries run once per this many ticks per grifter.
const GROUND_PROBE_PERIOD: u8 = 5;
/// Per-tick blend toward the cached ground height, and the snap window.
const GROUND_BLEND: f32 = 0.15;
const GROUND_SNAP: f32 = 0.1;
/// Spawn cone in front of the player (city): 80 degrees total.
const CONE_SPREAD: f32 = 80.0 * std::f32::consts::PI / 180.0;
const CONE_RADIUS: f32 = 50.0;

/// Where new grifters come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPattern {
    /// Fan out from the antagonist's position toward the player (canyon).
    FanFromRcs,
    /// A cone in front of the player's camera (city).
    ConeAhead,
}

#[derive(Debug, Clone)]
pub struct Grifter {
    pub id: EntityId,
    pub scene_id: SceneId,
    pub position: Vec3,
    target_y: f32,
    probe_phase: u8,
}

/// What happened during one pool update.
#[derive(Debug, Default)]
pub struct GrifterUpdate {
    /// Positions of grifters killed by projectiles this tick.
    pub kills: Vec<Vec3>,
    /// Grifters that reached the player and detonated.
    pub contacts: u32,
}

#[derive(Debug)]
pub struct GrifterPool {
    grifters: Vec<Grifter>,
    next_id: EntityId,
    pattern: SpawnPattern,
    speed: f32,
    spawn_interval: f32,
    spawn_timer: f32,
    max_live: usize,
}

impl GrifterPool {
    pub fn new(pattern: SpawnPattern, spawn_interval: f32, max_live: usize) -> Self {
        Self {
            grifters: Vec::new(),
            next_id: 0,
            pattern,
            speed: 8.0,
            spawn_interval,
            spawn_timer: 0.0,
            max_live,
        }
    }

    /// Retunes the spawn cadence (the wave machine drives this each tick).
    pub fn set_spawn_interval(&mut self, interval: f32) {
        self.spawn_interval = interval;
    }

    /// Stops spawning for good; live grifters keep coming.
    pub fn halt_spawning(&mut self) {
        self.spawn_interval = f32::INFINITY;
    }

    pub fn len(&self) -> usize {
        self.grifters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grifters.is_empty()
    }

    pub fn grifters(&self) -> &[Grifter] {
        &self.grifters
    }

    /// Destroys oldest grifters until at most `keep` remain (debug skip).
    pub fn cull_to(&mut self, scene: &mut dyn Scene, keep: usize) {
        while self.grifters.len() > keep {
            let g = self.grifters.remove(0);
            scene.destroy_entity(g.scene_id);
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        scene: &mut dyn Scene,
        player_pos: Vec3,
        player_yaw: f32,
        rcs_pos: Option<Vec3>,
        projectiles: &mut ProjectilePool,
        rng: &mut SeededRandom,
    ) -> GrifterUpdate {
        let mut out = GrifterUpdate::default();

        self.spawn_timer += dt;
        if self.spawn_timer > self.spawn_interval && self.grifters.len() < self.max_live {
            self.spawn(scene, player_pos, player_yaw, rcs_pos, rng);
            self.spawn_timer = 0.0;
        }

        let mut i = self.grifters.len();
        while i > 0 {
            i -= 1;

            // Walk toward the player on the ground plane.
            let to_player = flatten(player_pos - self.grifters[i].position);
            let dist = to_player.length();
            if dist > 0.5 {
                let step = to_player.normalize() * self.speed * dt;
                self.grifters[i].position += step;
            }

            // Throttled ground probe, smoothed every tick.
            self.grifters[i].probe_phase =
                (self.grifters[i].probe_phase + 1) % GROUND_PROBE_PERIOD;
            if self.grifters[i].probe_phase == 0 {
                let g = &self.grifters[i];
                if let Some(ground) = scene.query_ground_height(g.position.x, g.position.z) {
                    self.grifters[i].target_y = ground + SPRITE_LIFT;
                }
            }
            let g = &mut self.grifters[i];
            g.position.y = smooth_approach(g.position.y, g.target_y, GROUND_BLEND, GROUND_SNAP);

            // First projectile in pool order within the hit radius wins.
            let hit = projectiles
                .projectiles()
                .iter()
                .find(|p| p.position.distance(self.grifters[i].position) < HIT_RADIUS)
                .map(|p| p.id);
            if let Some(projectile_id) = hit {
                let g = self.grifters.remove(i);
                scene.destroy_entity(g.scene_id);
                projectiles.remove(scene, projectile_id);
                out.kills.push(g.position);
                continue;
            }

            // Contact with the player destroys the grifter and hurts.
            if dist < CONTACT_RADIUS {
                let g = self.grifters.remove(i);
                scene.destroy_entity(g.scene_id);
                out.contacts += 1;
                continue;
            }

            let g = &self.grifters[i];
            scene.set_transform(g.scene_id, Transform::at(g.position));
        }

        out
    }

    fn spawn(
        &mut self,
        scene: &mut dyn Scene,
        player_pos: Vec3,
        player_yaw: f32,
        rcs_pos: Option<Vec3>,
        rng: &mut SeededRandom,
    ) {
        let position = match (self.pattern, rcs_pos) {
            (SpawnPattern::FanFromRcs, Some(rcs)) => {
                // Jittered around the antagonist, slightly toward the player,
                // with a wide lateral fan.
                let x = rcs.x + rng.jitter(15.0) - 20.0;
                let z = rcs.z + rng.jitter(30.0);
                let y = rcs.y + rng.jitter(5.0);
                Vec3::new(x, y, z)
            }
            _ => {
                let angle = player_yaw + rng.jitter(CONE_SPREAD / 2.0);
                let x = player_pos.x + angle.sin() * CONE_RADIUS;
                let z = player_pos.z + angle.cos() * CONE_RADIUS;
                let y = scene
                    .query_ground_height(x, z)
                    .map(|g| g + SPRITE_LIFT)
                    .unwrap_or(player_pos.y);
                Vec3::new(x, y, z)
            }
        };

        self.next_id += 1;
        let scene_id = scene.create_entity(SceneKind::Grifter, Transform::at(position));
        self.grifters.push(Grifter {
            id: self.next_id,
            scene_id,
            position,
            target_y: position.y,
            probe_phase: rng.next_int(GROUND_PROBE_PERIOD as u32) as u8,
        });
        log::debug!("spawned grifter at {position}");
    }
}
