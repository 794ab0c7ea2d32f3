//! Abstract input state shared with the input collaborator.
//!
//! Device listeners (keyboard, touch joystick, pointer) normalize their
//! events into this struct through the setters; the simulation only reads
//! it during a tick. The look delta is transient: it accumulates between
//! ticks and is consumed exactly once per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Movement and action flags plus the pending look delta.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub jump: bool,
    look_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates a raw look delta (pixels) from the pointer/touch handler.
    pub fn add_look_delta(&mut self, dx: f32, dy: f32) {
        self.look_delta.x += dx;
        self.look_delta.y += dy;
    }

    /// Consumes the pending look delta, clearing it for the next frame.
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// True if any movement flag is held.
    pub fn any_movement(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    /// Releases every flag, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        *self = Self {
            look_delta: self.look_delta,
            ..Self::default()
        };
    }
}
