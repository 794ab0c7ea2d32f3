//! Canyon wave machine.
//!
//! A fixed ascending table of wave start times drives the whole level: the
//! current wave index is the largest entry whose start time has passed,
//! each wave is announced exactly once, and the spawn rate is a lookup on
//! the index. When the total duration elapses, spawning stops and the
//! level waits for the field to clear.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::hud::Emphasis;

/// Total timed portion of the level, in seconds.
pub const WAVE_DURATION: f32 = 120.0;
/// The countdown turns urgent under this many seconds left.
pub const URGENT_THRESHOLD: f32 = 30.0;

/// One row of the wave table.
#[derive(Debug, Clone, Copy)]
pub struct WaveTiming {
    pub start: f32,
    pub label: &'static str,
    pub emphasis: Emphasis,
}

pub const WAVE_TIMINGS: [WaveTiming; 4] = [
    WaveTiming {
        start: 0.0,
        label: "SURVIVE",
        emphasis: Emphasis::Survive,
    },
    WaveTiming {
        start: 3.0,
        label: "FIRST WAVE",
        emphasis: Emphasis::Plain,
    },
    WaveTiming {
        start: 40.0,
        label: "SECOND WAVE",
        emphasis: Emphasis::Plain,
    },
    WaveTiming {
        start: 80.0,
        label: "FINAL WAVE",
        emphasis: Emphasis::Final,
    },
];

/// Enemies per second for each wave index.
pub const WAVE_SPAWN_RATES: [f32; 4] = [0.5, 0.7, 1.0, 1.5];

/// Validates a wave table: non-empty, strictly ascending start times.
pub fn validate_table(table: &[WaveTiming]) -> Result<(), ConfigError> {
    if table.is_empty() {
        return Err(ConfigError::EmptyWaveTable);
    }
    for pair in table.windows(2) {
        if pair[1].start <= pair[0].start {
            return Err(ConfigError::NonAscendingWaveTable);
        }
    }
    Ok(())
}

/// Events produced while advancing the timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveEvent {
    /// A wave's start time was crossed for the first time.
    Announced { label: &'static str, emphasis: Emphasis },
    /// The timed portion just finished; spawning must stop.
    TimerComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveState {
    elapsed: f32,
    current_wave: usize,
    announced: [bool; WAVE_TIMINGS.len()],
    complete: bool,
}

impl WaveState {
    pub fn new() -> Result<Self, ConfigError> {
        validate_table(&WAVE_TIMINGS)?;
        Ok(Self {
            elapsed: 0.0,
            current_wave: 0,
            announced: [false; WAVE_TIMINGS.len()],
            complete: false,
        })
    }

    /// Advances the timer; stops accumulating once complete.
    pub fn update(&mut self, dt: f32) -> Vec<WaveEvent> {
        let mut events = Vec::new();
        if self.complete {
            return events;
        }
        self.elapsed += dt;

        for (i, wave) in WAVE_TIMINGS.iter().enumerate() {
            if self.elapsed >= wave.start && !self.announced[i] {
                self.announced[i] = true;
                // The index never moves backward, however erratic dt is.
                self.current_wave = self.current_wave.max(i);
                events.push(WaveEvent::Announced {
                    label: wave.label,
                    emphasis: wave.emphasis,
                });
            }
        }

        if self.elapsed >= WAVE_DURATION {
            self.complete = true;
            events.push(WaveEvent::TimerComplete);
        }
        events
    }

    /// Largest table index whose start time has passed.
    pub fn current_index(&self) -> usize {
        WAVE_TIMINGS
            .iter()
            .rposition(|w| self.elapsed >= w.start)
            .unwrap_or(0)
    }

    /// Seconds between spawns for the current wave.
    pub fn spawn_interval(&self) -> f32 {
        1.0 / WAVE_SPAWN_RATES[self.current_index()]
    }

    pub fn remaining(&self) -> f32 {
        (WAVE_DURATION - self.elapsed).max(0.0)
    }

    pub fn is_urgent(&self) -> bool {
        !self.complete && self.remaining() < URGENT_THRESHOLD
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Debug skip: jump the timer forward.
    pub fn set_elapsed(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_table_at_breakpoints() {
        let mut wave = WaveState::new().unwrap();
        wave.update(0.0);
        assert_eq!(wave.current_index(), 0);

        wave.set_elapsed(2.9);
        assert_eq!(wave.current_index(), 0);
        wave.set_elapsed(3.0);
        assert_eq!(wave.current_index(), 1);
        // The worked example: 45s with breakpoints 0/3/40/80 is wave 2.
        wave.set_elapsed(45.0);
        assert_eq!(wave.current_index(), 2);
        wave.set_elapsed(119.0);
        assert_eq!(wave.current_index(), 3);
    }

    #[test]
    fn each_wave_announced_exactly_once() {
        let mut wave = WaveState::new().unwrap();
        let mut announcements = 0;
        // Erratic frame times, including long stalls.
        let pattern = [0.016, 0.5, 0.016, 7.0, 0.016, 40.0, 0.1, 45.0, 0.016, 40.0];
        for dt in pattern.iter().cycle().take(300) {
            for e in wave.update(*dt) {
                if matches!(e, WaveEvent::Announced { .. }) {
                    announcements += 1;
                }
            }
        }
        assert_eq!(announcements, WAVE_TIMINGS.len());
    }

    #[test]
    fn one_big_tick_announces_all_crossed_waves() {
        let mut wave = WaveState::new().unwrap();
        let events = wave.update(50.0);
        let labels: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                WaveEvent::Announced { label, .. } => Some(*label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["SURVIVE", "FIRST WAVE", "SECOND WAVE"]);
    }

    #[test]
    fn spawn_rate_follows_wave() {
        let mut wave = WaveState::new().unwrap();
        wave.set_elapsed(1.0);
        assert!((wave.spawn_interval() - 2.0).abs() < 1e-6);
        wave.set_elapsed(100.0);
        assert!((wave.spawn_interval() - 1.0 / 1.5).abs() < 1e-6);
    }

    #[test]
    fn completion_fires_once_and_freezes_timer() {
        let mut wave = WaveState::new().unwrap();
        wave.set_elapsed(119.9);

        let events = wave.update(0.2);
        assert!(events.contains(&WaveEvent::TimerComplete));
        assert!(wave.is_complete());

        assert!(wave.update(10.0).is_empty());
        assert_eq!(wave.remaining(), 0.0);
    }

    #[test]
    fn urgency_under_thirty_seconds() {
        let mut wave = WaveState::new().unwrap();
        wave.set_elapsed(80.0);
        assert!(!wave.is_urgent());
        wave.set_elapsed(95.0);
        assert!(wave.is_urgent());
    }

    #[test]
    fn bad_tables_are_rejected() {
        assert_eq!(validate_table(&[]), Err(ConfigError::EmptyWaveTable));
        let out_of_order = [
            WaveTiming {
                start: 10.0,
                label: "A",
                emphasis: Emphasis::Plain,
            },
            WaveTiming {
                start: 5.0,
                label: "B",
                emphasis: Emphasis::Plain,
            },
        ];
        assert_eq!(
            validate_table(&out_of_order),
            Err(ConfigError::NonAscendingWaveTable)
        );
    }
}
