//! Laser beam pool (city hazards).
//!
//! Beams are short-lived segments fired by active collectibles. A beam
//! hits the player when the player's position projects onto the segment
//! and the perpendicular distance is under the hit threshold. Damage has
//! no per-hit cooldown: a player standing in a live beam is hurt on every
//! check.

use glam::Vec3;

use crate::math::point_segment_distance;
use crate::scene::{Scene, SceneId, SceneKind, Transform};

/// How long one beam stays live.
pub const BURST_DURATION: f32 = 0.12;
/// Player-to-beam distance that counts as a hit.
pub const HIT_DISTANCE: f32 = 1.5;
/// Damage per registered hit.
pub const DAMAGE: f32 = 5.0;

#[derive(Debug)]
struct LaserBeam {
    scene_id: SceneId,
    start: Vec3,
    end: Vec3,
    timer: f32,
}

#[derive(Debug, Default)]
pub struct LaserPool {
    beams: Vec<LaserBeam>,
}

impl LaserPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&mut self, scene: &mut dyn Scene, start: Vec3, end: Vec3) {
        let dir = end - start;
        let length = dir.length();
        let midpoint = start + dir * 0.5;
        let yaw = dir.x.atan2(dir.z);
        let scene_id = scene.create_entity(
            SceneKind::LaserBeam,
            Transform::at(midpoint).with_yaw(yaw).with_scale(length),
        );
        self.beams.push(LaserBeam {
            scene_id,
            start,
            end,
            timer: 0.0,
        });
    }

    pub fn update(&mut self, dt: f32, scene: &mut dyn Scene) {
        self.beams.retain_mut(|beam| {
            beam.timer += dt;
            if beam.timer >= BURST_DURATION {
                scene.destroy_entity(beam.scene_id);
                false
            } else {
                true
            }
        });
    }

    /// True if any live beam intersects the player. At most one hit is
    /// reported per call; the caller applies damage once per tick.
    pub fn check_player_hit(&self, player_pos: Vec3) -> bool {
        self.beams.iter().any(|beam| {
            point_segment_distance(player_pos, beam.start, beam.end)
                .is_some_and(|d| d < HIT_DISTANCE)
        })
    }

    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FlatScene;

    #[test]
    fn beams_expire_after_burst_duration() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = LaserPool::new();
        pool.fire(&mut scene, Vec3::ZERO, Vec3::new(30.0, 0.0, 0.0));
        assert_eq!(pool.len(), 1);

        pool.update(0.06, &mut scene);
        assert_eq!(pool.len(), 1);
        pool.update(0.06, &mut scene);
        assert!(pool.is_empty());
        assert_eq!(scene.live_count(SceneKind::LaserBeam), 0);
    }

    #[test]
    fn hit_requires_projection_inside_segment() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = LaserPool::new();
        pool.fire(&mut scene, Vec3::ZERO, Vec3::new(30.0, 0.0, 0.0));

        // Alongside the beam, 1 unit off axis: hit.
        assert!(pool.check_player_hit(Vec3::new(15.0, 0.0, 1.0)));
        // Too far off axis: miss.
        assert!(!pool.check_player_hit(Vec3::new(15.0, 0.0, 2.0)));
        // Past the end of the segment: miss, even though it is near the line.
        assert!(!pool.check_player_hit(Vec3::new(31.0, 0.0, 0.5)));
    }

    #[test]
    fn standing_in_a_beam_hits_every_check() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = LaserPool::new();
        pool.fire(&mut scene, Vec3::ZERO, Vec3::new(30.0, 0.0, 0.0));

        let spot = Vec3::new(10.0, 0.0, 0.5);
        assert!(pool.check_player_hit(spot));
        assert!(pool.check_player_hit(spot));
    }
}
