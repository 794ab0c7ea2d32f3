//! Explosion pool.
//!
//! Purely visual sprite animations: a fixed number of frames advanced on a
//! fixed timer, self-destructing after the last frame. Explosions never
//! collide with anything; they exist in the core because simulation events
//! (kills, boss defeat) fan out into them.

use glam::Vec3;

use crate::scene::{Scene, SceneId, SceneKind, Transform};

pub const FRAME_COUNT: u32 = 5;
pub const FRAME_DURATION: f32 = 0.08;

#[derive(Debug)]
struct Explosion {
    scene_id: SceneId,
    frame: u32,
    timer: f32,
}

#[derive(Debug)]
pub struct ExplosionPool {
    explosions: Vec<Explosion>,
    /// Sprite size when the spawner doesn't override it.
    pub default_size: f32,
}

impl ExplosionPool {
    pub fn new(default_size: f32) -> Self {
        Self {
            explosions: Vec::new(),
            default_size,
        }
    }

    pub fn spawn(&mut self, scene: &mut dyn Scene, position: Vec3, size: Option<f32>) {
        let size = size.unwrap_or(self.default_size);
        let scene_id =
            scene.create_entity(SceneKind::Explosion, Transform::at(position).with_scale(size));
        self.explosions.push(Explosion {
            scene_id,
            frame: 0,
            timer: 0.0,
        });
    }

    pub fn update(&mut self, dt: f32, scene: &mut dyn Scene) {
        self.explosions.retain_mut(|e| {
            e.timer += dt;
            if e.timer < FRAME_DURATION {
                return true;
            }
            e.timer = 0.0;
            e.frame += 1;
            if e.frame >= FRAME_COUNT {
                scene.destroy_entity(e.scene_id);
                false
            } else {
                scene.set_sprite_frame(e.scene_id, e.frame);
                true
            }
        });
    }

    pub fn len(&self) -> usize {
        self.explosions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explosions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FlatScene;

    #[test]
    fn animation_advances_and_self_destructs() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ExplosionPool::new(3.0);
        pool.spawn(&mut scene, Vec3::ZERO, None);

        // One frame per 0.08s, five frames total.
        pool.update(0.08, &mut scene);
        assert_eq!(pool.len(), 1);

        for _ in 0..4 {
            pool.update(0.08, &mut scene);
        }
        assert!(pool.is_empty());
        assert_eq!(scene.live_count(SceneKind::Explosion), 0);
    }

    #[test]
    fn short_ticks_accumulate() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ExplosionPool::new(3.0);
        pool.spawn(&mut scene, Vec3::ZERO, None);

        // Whole lifetime is 5 * 0.08 = 0.4s.
        for _ in 0..30 {
            pool.update(1.0 / 60.0, &mut scene);
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn custom_size_reaches_the_scene() {
        let mut scene = FlatScene::new(0.0);
        let mut pool = ExplosionPool::new(3.0);
        pool.spawn(&mut scene, Vec3::new(1.0, 2.0, 3.0), Some(100.0));

        let id = 1; // first entity minted by FlatScene
        assert_eq!(scene.transform(id).unwrap().scale, 100.0);
    }
}
