//! Simulation configuration and startup-fatal errors.
//!
//! All tunables and debug toggles are injected here at construction; the
//! simulation has no ambient globals. Asset and query failures are soft
//! (`Option` fallbacks); `ConfigError` is reserved for configuration that
//! makes a level impossible to start.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::LevelId;

/// Impossible-configuration errors, surfaced to the harness at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown level id: {0:?}")]
    UnknownLevel(String),
    #[error("wave table is empty")]
    EmptyWaveTable,
    #[error("wave table start times must be strictly ascending")]
    NonAscendingWaveTable,
    #[error("level has no buildings to catalog")]
    NoBuildings,
}

/// Live-tunable override of the antagonist's idle placement, driven by the
/// debug keybindings while `rcs_debug` is on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RcsOverride {
    pub scale: f32,
    pub distance: f32,
    pub height_offset: f32,
    pub yaw: f32,
}

impl Default for RcsOverride {
    fn default() -> Self {
        Self {
            scale: 2.0,
            distance: 200.0,
            height_offset: 24.0,
            yaw: 0.0,
        }
    }
}

/// Debug toggles. Off in release configurations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugOptions {
    /// Enables the live RCS placement override.
    pub rcs_debug: bool,
    /// Enables the skip-to-end helpers.
    pub skip_helpers: bool,
    pub rcs_override: RcsOverride,
}

/// Per-run configuration injected at simulation construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub level: LevelId,
    /// RNG seed; together with the input sequence it determines the run.
    pub seed: u32,
    /// Monotonic level-load generation, used to reject stale async asset
    /// completions that finish after a transition.
    pub generation: u32,
    /// Look sensitivity in radians per pixel of pointer movement.
    pub look_sensitivity: f32,
    pub debug: DebugOptions,
}

impl SimConfig {
    pub const DEFAULT_LOOK_SENSITIVITY: f32 = 0.0022;

    pub fn new(level: LevelId, seed: u32) -> Self {
        Self {
            level,
            seed,
            generation: 0,
            look_sensitivity: Self::DEFAULT_LOOK_SENSITIVITY,
            debug: DebugOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_problem() {
        let err = ConfigError::UnknownLevel("moon".to_string());
        assert!(err.to_string().contains("moon"));
    }

    #[test]
    fn default_config_is_quiet() {
        let config = SimConfig::new(LevelId::Canyon, 1);
        assert!(!config.debug.rcs_debug);
        assert!(!config.debug.skip_helpers);
        assert!(config.look_sensitivity > 0.0);
    }
}
