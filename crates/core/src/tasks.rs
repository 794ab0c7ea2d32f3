//! Delayed-task scheduler.
//!
//! Scripted cosmetic sequences (the boss-defeat barrage, the victory
//! banner) are an ordered list of {delay, action} entries consumed here,
//! decoupled from the authoritative state machines. Time advances with the
//! simulation's dt, never with wall-clock timers.

use glam::Vec3;

use crate::hud::Emphasis;

/// What a due task asks the orchestrator to do.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskAction {
    SpawnExplosion { position: Vec3, size: f32 },
    Announce { text: &'static str, emphasis: Emphasis },
    ShowEndStats,
}

/// A task with a delay measured from the moment it is scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub delay: f32,
    pub action: TaskAction,
}

#[derive(Debug)]
struct Pending {
    remaining: f32,
    action: TaskAction,
}

/// Fire-and-forget task queue drained once per tick.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: ScheduledTask) {
        self.pending.push(Pending {
            remaining: task.delay,
            action: task.action,
        });
    }

    pub fn schedule_all(&mut self, tasks: impl IntoIterator<Item = ScheduledTask>) {
        for task in tasks {
            self.schedule(task);
        }
    }

    /// Advances every pending task and returns the due actions in schedule
    /// order (most overdue first, insertion order breaking ties).
    pub fn update(&mut self, dt: f32) -> Vec<TaskAction> {
        let mut due: Vec<(f32, usize, TaskAction)> = Vec::new();
        let mut index = 0;
        self.pending.retain_mut(|p| {
            p.remaining -= dt;
            let fired = p.remaining <= 0.0;
            if fired {
                due.push((p.remaining, index, p.action.clone()));
            }
            index += 1;
            !fired
        });
        due.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, action)| action).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Drops everything still pending (level teardown).
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announce(text: &'static str, delay: f32) -> ScheduledTask {
        ScheduledTask {
            delay,
            action: TaskAction::Announce {
                text,
                emphasis: Emphasis::Plain,
            },
        }
    }

    #[test]
    fn tasks_fire_after_their_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(announce("later", 0.5));

        assert!(scheduler.update(0.3).is_empty());
        let due = scheduler.update(0.3);
        assert_eq!(due.len(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn one_big_tick_fires_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(announce("second", 2.0));
        scheduler.schedule(announce("first", 1.0));

        let due = scheduler.update(5.0);
        assert_eq!(
            due,
            vec![
                TaskAction::Announce {
                    text: "first",
                    emphasis: Emphasis::Plain
                },
                TaskAction::Announce {
                    text: "second",
                    emphasis: Emphasis::Plain
                },
            ]
        );
    }

    #[test]
    fn zero_delay_fires_on_next_update() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(announce("now", 0.0));
        assert_eq!(scheduler.update(1.0 / 60.0).len(), 1);
    }

    #[test]
    fn clear_drops_pending_work() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(announce("never", 1.0));
        scheduler.clear();
        assert!(scheduler.update(10.0).is_empty());
    }
}
