//! RCS Kill Core - Deterministic Gameplay Simulation
//!
//! The runtime core of the Right-Click Save KILL browser FPS: per-frame
//! player movement and health, grifter spawning and pursuit, projectile
//! ballistics, collision resolution, and the wave/collection/boss
//! progression machines across the three campaign levels. Rendering,
//! audio, the DOM HUD, asset loading and input capture are external
//! collaborators reached only through the contracts in [`scene`], [`hud`],
//! [`storage`] and [`input`].
//!
//! # Simulation Rules
//!
//! 1. One synchronous tick per rendered frame - nothing blocks
//! 2. No `rand::thread_rng()` - use [`SeededRandom`] only
//! 3. No system time - all timers advance by the tick's `dt`
//! 4. `Vec` storage in pools - iteration order is part of the behavior
//! 5. Pools own their entities; cross-pool reads are snapshot accessors

pub mod config;
pub mod entities;
pub mod hud;
pub mod input;
pub mod level;
pub mod math;
pub mod player;
pub mod progression;
pub mod random;
pub mod rcs;
pub mod scene;
pub mod simulation;
pub mod storage;
pub mod tasks;

pub use config::{ConfigError, SimConfig};
pub use hud::{HudEvent, HudSink};
pub use input::InputState;
pub use level::{LevelConfig, LevelId, LevelSetup};
pub use random::SeededRandom;
pub use scene::{Scene, SceneId, SceneKind};
pub use simulation::{AssetKind, Simulation};
pub use storage::{KeyValueStore, RunStats, RunSummary};
