//! Small math helpers shared by the pools and controllers.
//!
//! All gameplay happens on the XZ ground plane with Y up; movement
//! directions are flattened onto that plane before use.

use glam::{Vec2, Vec3};

/// Drops the vertical component of a vector.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Flattens onto the ground plane and normalizes; zero if degenerate.
#[inline]
pub fn flatten_normalize(v: Vec3) -> Vec3 {
    flatten(v).normalize_or_zero()
}

/// Unit direction on the ground plane for a yaw angle.
/// Yaw 0 faces +Z; yaw pi/2 faces +X.
#[inline]
pub fn yaw_dir(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Exponential approach used for ground-height smoothing: moves a fraction
/// of the remaining distance per call and snaps once within `snap`.
#[inline]
pub fn smooth_approach(current: f32, target: f32, blend: f32, snap: f32) -> f32 {
    let diff = target - current;
    if diff.abs() > snap {
        current + diff * blend
    } else {
        target
    }
}

/// Perpendicular distance from a point to the segment `a -> b`.
///
/// Returns `None` when the point's projection falls outside the segment, so
/// a beam only registers hits between its endpoints.
pub fn point_segment_distance(point: Vec3, a: Vec3, b: Vec3) -> Option<f32> {
    let ab = b - a;
    let length = ab.length();
    if length <= f32::EPSILON {
        return None;
    }
    let dir = ab / length;
    let t = (point - a).dot(dir);
    if t <= 0.0 || t >= length {
        return None;
    }
    let closest = a + dir * t;
    Some(point.distance(closest))
}

/// Camera basis derived from a position and yaw/pitch view angles.
///
/// Matches the convention of the rendering engine's universal camera:
/// positive pitch looks down, yaw 0 looks along +Z.
#[derive(Debug, Clone, Copy)]
pub struct ViewPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl ViewPose {
    pub fn from_angles(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let (sy, cy) = yaw.sin_cos();
        let (sp, cp) = pitch.sin_cos();
        let forward = Vec3::new(sy * cp, -sp, cy * cp);
        let right = Vec3::new(cy, 0.0, -sy);
        let up = forward.cross(right);
        Self {
            position,
            forward,
            right,
            up,
        }
    }
}

/// Rotates an XZ offset into a frame where "up" is the given yaw heading.
/// Used by the radar to draw blips relative to where the player faces.
#[inline]
pub fn rotate_into_heading(offset: Vec2, yaw: f32) -> Vec2 {
    let adjusted = -yaw + std::f32::consts::PI;
    let (sin, cos) = adjusted.sin_cos();
    Vec2::new(
        offset.x * cos - offset.y * sin,
        -(offset.x * sin + offset.y * cos),
    )
}
