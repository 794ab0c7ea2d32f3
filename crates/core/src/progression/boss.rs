//! Boss state machine.
//!
//! Health steps down by a fixed amount per confirmed glasses hit and
//! clamps at zero; the alive-to-defeated transition fires exactly once no
//! matter how many hits land afterwards. The defeat celebration is purely
//! cosmetic and is expressed as a delayed-task list, kept out of the
//! authoritative state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::hud::Emphasis;
use crate::random::SeededRandom;
use crate::tasks::{ScheduledTask, TaskAction};

pub const MAX_HEALTH: i32 = 100;
/// Damage per confirmed glasses hit.
pub const HIT_DAMAGE: i32 = 5;
/// Seconds the hit flash holds.
pub const HIT_FLASH_DURATION: f32 = 0.15;

/// Outcome of one registered hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossHit {
    pub health: i32,
    /// The terminal transition happened on this hit.
    pub defeated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub health: i32,
    pub alive: bool,
    hit_flash: f32,
}

impl BossState {
    pub fn new() -> Self {
        Self {
            health: MAX_HEALTH,
            alive: true,
            hit_flash: 0.0,
        }
    }

    /// Applies one glasses hit. Idempotent once defeated.
    pub fn register_hit(&mut self) -> BossHit {
        if !self.alive {
            return BossHit {
                health: self.health,
                defeated: false,
            };
        }
        self.health = (self.health - HIT_DAMAGE).max(0);
        self.hit_flash = HIT_FLASH_DURATION;
        let defeated = self.health == 0;
        if defeated {
            self.alive = false;
            log::info!("boss defeated");
        }
        BossHit {
            health: self.health,
            defeated,
        }
    }

    /// Counts the hit flash down; true when it just expired.
    pub fn tick_hit_flash(&mut self, dt: f32) -> bool {
        if self.hit_flash <= 0.0 {
            return false;
        }
        self.hit_flash -= dt;
        self.hit_flash <= 0.0
    }

    /// Debug skip: leave the boss a couple of hits from defeat.
    pub fn set_health(&mut self, health: i32) {
        if self.alive {
            self.health = health.clamp(0, MAX_HEALTH).max(1);
        }
    }
}

impl Default for BossState {
    fn default() -> Self {
        Self::new()
    }
}

fn explosion(position: Vec3, size: f32, delay: f32) -> ScheduledTask {
    ScheduledTask {
        delay,
        action: TaskAction::SpawnExplosion { position, size },
    }
}

/// Builds the scripted defeat barrage: an opening blast on the boss, a
/// rolling storm of bursts between boss and player, timed rings and
/// stacked finishers, then the victory banner and the stats overlay.
pub fn defeat_barrage(
    rng: &mut SeededRandom,
    boss_pos: Vec3,
    player_pos: Vec3,
) -> Vec<ScheduledTask> {
    let mut tasks = Vec::new();

    // Opening blasts on the boss.
    tasks.push(explosion(boss_pos, 100.0, 0.0));
    tasks.push(explosion(boss_pos + Vec3::new(0.0, 15.0, 0.0), 100.0, 0.0));

    // Rolling storm: batches every 50ms until ~80 bursts have landed.
    let mut total = 0;
    let mut tick = 0;
    while total < 80 {
        tick += 1;
        let delay = tick as f32 * 0.05;
        let batch = 3 + rng.next_int(3);
        for _ in 0..batch {
            let t = rng.next();
            let x = player_pos.x + (boss_pos.x - player_pos.x) * t + rng.jitter(75.0);
            let z = player_pos.z + (boss_pos.z - player_pos.z) * t + rng.jitter(75.0);
            let y = boss_pos.y + rng.next() * 80.0;
            let size = rng.next_range(40.0, 120.0);
            tasks.push(explosion(Vec3::new(x, y, z), size, delay));
            total += 1;
        }
    }

    // Extra-large punctuation.
    tasks.push(explosion(boss_pos + Vec3::new(0.0, 30.0, 0.0), 150.0, 0.5));
    tasks.push(explosion(player_pos + Vec3::new(30.0, 20.0, 30.0), 120.0, 0.5));
    tasks.push(explosion(player_pos + Vec3::new(-30.0, 25.0, -30.0), 120.0, 0.5));

    // A ring around the boss.
    tasks.push(explosion(boss_pos + Vec3::new(0.0, 50.0, 0.0), 180.0, 1.0));
    for i in 0..8 {
        let angle = (i as f32 / 8.0) * std::f32::consts::TAU;
        let offset = Vec3::new(
            angle.cos() * 60.0,
            30.0 + rng.next() * 30.0,
            angle.sin() * 60.0,
        );
        tasks.push(explosion(boss_pos + offset, rng.next_range(80.0, 120.0), 1.0));
    }

    // A ring around the player.
    for i in 0..12 {
        let angle = (i as f32 / 12.0) * std::f32::consts::TAU;
        let dist = 40.0 + rng.next() * 30.0;
        let offset = Vec3::new(
            angle.cos() * dist,
            15.0 + rng.next() * 40.0,
            angle.sin() * dist,
        );
        tasks.push(explosion(player_pos + offset, rng.next_range(60.0, 120.0), 1.5));
    }

    // Stacked finishers up the boss's column.
    tasks.push(explosion(boss_pos + Vec3::new(0.0, 40.0, 0.0), 200.0, 2.0));
    tasks.push(explosion(boss_pos + Vec3::new(0.0, 60.0, 0.0), 180.0, 2.0));
    tasks.push(explosion(boss_pos + Vec3::new(0.0, 80.0, 0.0), 150.0, 2.0));

    // Lingering pops trailing off.
    for i in 0..10 {
        let offset = Vec3::new(rng.jitter(100.0), rng.next() * 80.0, rng.jitter(100.0));
        tasks.push(explosion(
            boss_pos + offset,
            rng.next_range(30.0, 70.0),
            2.5 + i as f32 * 0.1,
        ));
    }

    // The reveal once the dust settles.
    tasks.push(ScheduledTask {
        delay: 3.0,
        action: TaskAction::Announce {
            text: "VICTORY!",
            emphasis: Emphasis::Survive,
        },
    });
    tasks.push(ScheduledTask {
        delay: 3.5,
        action: TaskAction::ShowEndStats,
    });

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_steps_down_by_five_and_clamps() {
        let mut boss = BossState::new();
        assert_eq!(boss.register_hit().health, 95);
        assert_eq!(boss.register_hit().health, 90);
        for _ in 0..30 {
            boss.register_hit();
        }
        assert_eq!(boss.health, 0);
        assert!(!boss.alive);
    }

    #[test]
    fn twenty_hits_defeat_the_boss() {
        let mut boss = BossState::new();
        let mut defeats = 0;
        for _ in 0..25 {
            if boss.register_hit().defeated {
                defeats += 1;
            }
        }
        // Exactly one terminal transition, on the 20th hit.
        assert_eq!(defeats, 1);
        assert_eq!(boss.health, 0);
    }

    #[test]
    fn hits_after_defeat_change_nothing() {
        let mut boss = BossState::new();
        for _ in 0..20 {
            boss.register_hit();
        }
        let hit = boss.register_hit();
        assert!(!hit.defeated);
        assert_eq!(hit.health, 0);
    }

    #[test]
    fn set_health_never_revives_or_kills() {
        let mut boss = BossState::new();
        boss.set_health(10);
        assert_eq!(boss.health, 10);
        boss.set_health(-5);
        assert_eq!(boss.health, 1, "debug skip cannot kill outright");

        for _ in 0..20 {
            boss.register_hit();
        }
        boss.set_health(50);
        assert_eq!(boss.health, 0, "defeated boss stays defeated");
    }

    #[test]
    fn barrage_ends_with_victory_and_stats() {
        let mut rng = SeededRandom::new(77);
        let tasks = defeat_barrage(&mut rng, Vec3::new(0.0, 5.0, 50.0), Vec3::ZERO);

        assert!(tasks.len() > 80, "the barrage is a storm, got {}", tasks.len());
        let last_two: Vec<_> = tasks.iter().rev().take(2).collect();
        assert!(matches!(last_two[1].action, TaskAction::Announce { text: "VICTORY!", .. }));
        assert!(matches!(last_two[0].action, TaskAction::ShowEndStats));
        // Stats follow the banner.
        assert!(last_two[0].delay > last_two[1].delay);
    }

    #[test]
    fn barrage_is_deterministic_for_a_seed() {
        let a = defeat_barrage(&mut SeededRandom::new(5), Vec3::ZERO, Vec3::ONE);
        let b = defeat_barrage(&mut SeededRandom::new(5), Vec3::ZERO, Vec3::ONE);
        assert_eq!(a, b);
    }
}
