//! Terrain presentation strategies.
//!
//! Each level keeps its world visible a different way: the canyon is a
//! strip of repeated segments culled by distance, the forest is an
//! infinite recycled tile grid, and the city/arena are static models that
//! need no per-frame work.

use std::collections::BTreeSet;

use glam::Vec3;

use crate::scene::{Scene, SceneId, SceneKind, Transform};

/// The strategy selected for the current level.
#[derive(Debug)]
pub enum Terrain {
    Segments(SegmentStrip),
    Tiled(TileGrid),
    Static,
}

impl Terrain {
    pub fn update(&mut self, scene: &mut dyn Scene, player_pos: Vec3) {
        match self {
            Terrain::Segments(strip) => strip.update(scene, player_pos.x),
            Terrain::Tiled(grid) => grid.update(scene, player_pos),
            Terrain::Static => {}
        }
    }
}

/// Canyon terrain: `count` copies of one segment laid end to end along +X.
/// Only segments within `visible_range` of the player's segment stay
/// enabled, bounding draw cost on the long strip.
#[derive(Debug)]
pub struct SegmentStrip {
    segment_length: f32,
    visible_range: i32,
    segments: Vec<SegmentSlot>,
}

#[derive(Debug)]
struct SegmentSlot {
    scene_id: SceneId,
    visible: bool,
}

impl SegmentStrip {
    pub const SEGMENT_COUNT: usize = 13;
    pub const VISIBLE_RANGE: i32 = 9;

    pub fn new(scene: &mut dyn Scene, segment_length: f32) -> Self {
        let mut segments = Vec::with_capacity(Self::SEGMENT_COUNT);
        for i in 0..Self::SEGMENT_COUNT {
            let position = Vec3::new(i as f32 * segment_length, 0.0, 0.0);
            let scene_id = scene.create_entity(SceneKind::TerrainSegment, Transform::at(position));
            let visible = (i as i32) < Self::VISIBLE_RANGE;
            scene.set_entity_visible(scene_id, visible);
            segments.push(SegmentSlot { scene_id, visible });
        }
        Self {
            segment_length,
            visible_range: Self::VISIBLE_RANGE,
            segments,
        }
    }

    pub fn update(&mut self, scene: &mut dyn Scene, player_x: f32) {
        let player_segment = (player_x / self.segment_length).floor() as i32;
        for (i, slot) in self.segments.iter_mut().enumerate() {
            let should_show = (i as i32 - player_segment).abs() <= self.visible_range;
            if slot.visible != should_show {
                slot.visible = should_show;
                scene.set_entity_visible(slot.scene_id, should_show);
            }
        }
    }

    #[cfg(test)]
    fn visible_count(&self) -> usize {
        self.segments.iter().filter(|s| s.visible).count()
    }
}

/// Endless forest floor: a (2r+1)^2 grid of terrain tiles recentered on the
/// player's cell. Tiles that fall off the grid are recycled into the newly
/// uncovered cells instead of being recreated.
#[derive(Debug)]
pub struct TileGrid {
    tile_size: f32,
    grid_radius: i32,
    tiles: Vec<Tile>,
    last_cell: (i32, i32),
}

#[derive(Debug)]
struct Tile {
    scene_id: SceneId,
    cell: (i32, i32),
}

impl TileGrid {
    pub const GRID_RADIUS: i32 = 2;

    pub fn new(scene: &mut dyn Scene, tile_size: f32) -> Self {
        let radius = Self::GRID_RADIUS;
        let mut tiles = Vec::new();
        for x in -radius..=radius {
            for z in -radius..=radius {
                let scene_id = scene.create_entity(
                    SceneKind::TerrainTile,
                    Transform::at(Self::cell_origin(tile_size, x, z)),
                );
                tiles.push(Tile {
                    scene_id,
                    cell: (x, z),
                });
            }
        }
        Self {
            tile_size,
            grid_radius: radius,
            tiles,
            last_cell: (0, 0),
        }
    }

    fn cell_origin(tile_size: f32, cx: i32, cz: i32) -> Vec3 {
        Vec3::new(cx as f32 * tile_size, 0.0, cz as f32 * tile_size)
    }

    pub fn update(&mut self, scene: &mut dyn Scene, player_pos: Vec3) {
        let cell_x = (player_pos.x / self.tile_size).round() as i32;
        let cell_z = (player_pos.z / self.tile_size).round() as i32;
        if (cell_x, cell_z) == self.last_cell {
            return;
        }
        self.last_cell = (cell_x, cell_z);

        let mut desired = BTreeSet::new();
        for dx in -self.grid_radius..=self.grid_radius {
            for dz in -self.grid_radius..=self.grid_radius {
                desired.insert((cell_x + dx, cell_z + dz));
            }
        }

        // Tiles already in a wanted cell keep their spot; the rest recycle.
        let mut occupied = BTreeSet::new();
        let mut to_recycle = Vec::new();
        for (i, tile) in self.tiles.iter().enumerate() {
            if desired.contains(&tile.cell) && !occupied.contains(&tile.cell) {
                occupied.insert(tile.cell);
            } else {
                to_recycle.push(i);
            }
        }

        for cell in desired {
            if occupied.contains(&cell) {
                continue;
            }
            let Some(index) = to_recycle.pop() else { break };
            let tile = &mut self.tiles[index];
            tile.cell = cell;
            scene.set_transform(
                tile.scene_id,
                Transform::at(Self::cell_origin(self.tile_size, cell.0, cell.1)),
            );
        }
    }

    #[cfg(test)]
    fn covered_cells(&self) -> BTreeSet<(i32, i32)> {
        self.tiles.iter().map(|t| t.cell).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FlatScene;

    #[test]
    fn strip_starts_with_leading_segments_visible() {
        let mut scene = FlatScene::new(0.0);
        let strip = SegmentStrip::new(&mut scene, 100.0);
        assert_eq!(strip.visible_count(), SegmentStrip::VISIBLE_RANGE as usize);
    }

    #[test]
    fn strip_culls_by_player_distance() {
        let mut scene = FlatScene::new(0.0);
        let mut strip = SegmentStrip::new(&mut scene, 100.0);

        // Player deep into the strip: everything within range of segment 12
        // shows, the early segments hide.
        strip.update(&mut scene, 1250.0);
        assert!(!strip.segments[0].visible);
        assert!(strip.segments[12].visible);
        assert!(strip.segments[3].visible);
        assert!(!strip.segments[2].visible);
    }

    #[test]
    fn tile_grid_covers_player_neighborhood() {
        let mut scene = FlatScene::new(0.0);
        let mut grid = TileGrid::new(&mut scene, 120.0);
        let tile_count = scene.live_count(SceneKind::TerrainTile);
        assert_eq!(tile_count, 25);

        grid.update(&mut scene, Vec3::new(500.0, 0.0, -250.0));
        let cells = grid.covered_cells();
        assert_eq!(cells.len(), 25, "recycle must not duplicate cells");
        let center = ((500.0f32 / 120.0).round() as i32, (-250.0f32 / 120.0).round() as i32);
        assert!(cells.contains(&center));
        // No new tiles were created; existing ones were recycled.
        assert_eq!(scene.live_count(SceneKind::TerrainTile), tile_count);
    }

    #[test]
    fn tile_grid_skips_work_within_same_cell() {
        let mut scene = FlatScene::new(0.0);
        let mut grid = TileGrid::new(&mut scene, 120.0);
        let before = grid.covered_cells();
        grid.update(&mut scene, Vec3::new(10.0, 0.0, -10.0));
        assert_eq!(grid.covered_cells(), before);
    }
}
