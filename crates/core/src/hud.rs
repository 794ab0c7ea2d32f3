//! HUD collaborator contract.
//!
//! The simulation pushes display events into a write-only sink; nothing is
//! read back. The embedding client maps them onto DOM elements (health bar,
//! wave banner, radar canvas, stats overlay).

use glam::Vec2;

use crate::storage::RunSummary;

/// Visual weight of a banner announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Survive,
    Final,
}

/// Relative enemy positions rotated into the player's facing frame, in
/// world units. The client scales them onto the radar disc.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSnapshot {
    pub facing_yaw: f32,
    pub blips: Vec<Vec2>,
}

/// Events the simulation emits for the HUD.
#[derive(Debug, Clone, PartialEq)]
pub enum HudEvent {
    HealthChanged { health: f32, max: f32 },
    HitFlash,
    PlayerDied,
    KillCountChanged(u32),
    WaveAnnounced { label: &'static str, emphasis: Emphasis },
    WaveCountdown { remaining: f32, urgent: bool },
    EnemiesRemainingVisible(bool),
    EnemiesRemaining(usize),
    CollectCountChanged { collected: u32, total: u32 },
    BossHealthChanged { health: i32, max: i32 },
    BossHitFlash(bool),
    Announcement { text: &'static str, emphasis: Emphasis },
    LevelInstruction(&'static str),
    Radar(RadarSnapshot),
    EndStats(RunSummary),
}

/// Write-only event sink.
pub trait HudSink {
    fn push(&mut self, event: HudEvent);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullHud;

impl HudSink for NullHud {
    fn push(&mut self, _event: HudEvent) {}
}

/// Records events for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingHud {
    pub events: Vec<HudEvent>,
}

impl RecordingHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_matching(&self, pred: impl Fn(&HudEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl HudSink for RecordingHud {
    fn push(&mut self, event: HudEvent) {
        self.events.push(event);
    }
}
