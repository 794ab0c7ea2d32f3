//! Contract with the rendering/scene-graph engine.
//!
//! The simulation never issues graphics calls; it creates and moves
//! abstract scene entities and asks the engine spatial questions (ground
//! height under a point, obstacles along a ray, mesh intersection). Query
//! misses are `None`, never errors - callers fall back to their last-known
//! or level-default value.

use std::collections::BTreeMap;

use glam::Vec3;

/// Handle to an engine-side entity. Minted by the engine on `create_entity`.
pub type SceneId = u32;

/// What an entity is, so the engine can pick meshes/materials for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Projectile,
    Grifter,
    Explosion,
    Collectible,
    LaserBeam,
    TerrainSegment,
    TerrainTile,
    Rcs,
    Glasses,
}

/// Placement of a scene entity. `yaw` is heading on the ground plane;
/// `scale` doubles as sprite size for billboards and beam length for lasers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            scale: 1.0,
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// The engine surface the simulation drives each tick.
pub trait Scene {
    fn create_entity(&mut self, kind: SceneKind, transform: Transform) -> SceneId;

    fn set_transform(&mut self, id: SceneId, transform: Transform);

    /// Toggles render visibility (terrain segment culling).
    fn set_entity_visible(&mut self, id: SceneId, visible: bool);

    /// Toggles the "activated" presentation of a pre-existing entity
    /// (city buildings switch from dark to glitch material).
    fn set_entity_active(&mut self, id: SceneId, active: bool);

    /// Advances a sprite-sheet animation frame (explosions).
    fn set_sprite_frame(&mut self, id: SceneId, frame: u32);

    fn destroy_entity(&mut self, id: SceneId);

    /// Height of the topmost walkable surface under (x, z), if any.
    fn query_ground_height(&self, x: f32, z: f32) -> Option<f32>;

    /// Distance to the first obstacle along a ray, if one is hit within
    /// `max_distance`.
    fn query_obstacle_ahead(&self, origin: Vec3, direction: Vec3, max_distance: f32)
        -> Option<f32>;

    /// Mesh-accurate intersection test between two entities.
    fn query_intersection(&self, a: SceneId, b: SceneId) -> bool;
}

/// Minimal in-memory scene: flat ground, scripted obstacle and intersection
/// answers. Serves as the test double and as a headless harness environment.
#[derive(Debug, Default)]
pub struct FlatScene {
    pub ground_y: f32,
    /// Answer for every obstacle query; `None` means nothing ahead.
    pub obstacle_distance: Option<f32>,
    /// Pairs reported as intersecting (order-insensitive).
    pub intersecting: Vec<(SceneId, SceneId)>,
    /// When set, every intersection query answers true.
    pub intersect_all: bool,
    next_id: SceneId,
    entities: BTreeMap<SceneId, (SceneKind, Transform)>,
    visibility: BTreeMap<SceneId, bool>,
    activated: BTreeMap<SceneId, bool>,
    frames: BTreeMap<SceneId, u32>,
}

impl FlatScene {
    pub fn new(ground_y: f32) -> Self {
        Self {
            ground_y,
            ..Self::default()
        }
    }

    pub fn live_count(&self, kind: SceneKind) -> usize {
        self.entities.values().filter(|(k, _)| *k == kind).count()
    }

    pub fn transform(&self, id: SceneId) -> Option<Transform> {
        self.entities.get(&id).map(|(_, t)| *t)
    }

    pub fn is_visible(&self, id: SceneId) -> bool {
        self.visibility.get(&id).copied().unwrap_or(true)
    }

    pub fn is_active(&self, id: SceneId) -> bool {
        self.activated.get(&id).copied().unwrap_or(false)
    }

    pub fn sprite_frame(&self, id: SceneId) -> u32 {
        self.frames.get(&id).copied().unwrap_or(0)
    }

    /// Registers a pre-existing engine entity (e.g. a city building) so the
    /// simulation can reference it by id.
    pub fn seed_entity(&mut self, kind: SceneKind, transform: Transform) -> SceneId {
        self.create_entity(kind, transform)
    }
}

impl Scene for FlatScene {
    fn create_entity(&mut self, kind: SceneKind, transform: Transform) -> SceneId {
        self.next_id += 1;
        self.entities.insert(self.next_id, (kind, transform));
        self.next_id
    }

    fn set_transform(&mut self, id: SceneId, transform: Transform) {
        if let Some(entry) = self.entities.get_mut(&id) {
            entry.1 = transform;
        }
    }

    fn set_entity_visible(&mut self, id: SceneId, visible: bool) {
        self.visibility.insert(id, visible);
    }

    fn set_entity_active(&mut self, id: SceneId, active: bool) {
        self.activated.insert(id, active);
    }

    fn set_sprite_frame(&mut self, id: SceneId, frame: u32) {
        self.frames.insert(id, frame);
    }

    fn destroy_entity(&mut self, id: SceneId) {
        self.entities.remove(&id);
        self.visibility.remove(&id);
        self.activated.remove(&id);
        self.frames.remove(&id);
    }

    fn query_ground_height(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.ground_y)
    }

    fn query_obstacle_ahead(
        &self,
        _origin: Vec3,
        _direction: Vec3,
        max_distance: f32,
    ) -> Option<f32> {
        self.obstacle_distance.filter(|d| *d <= max_distance)
    }

    fn query_intersection(&self, a: SceneId, b: SceneId) -> bool {
        if self.intersect_all {
            return true;
        }
        self.intersecting
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}
