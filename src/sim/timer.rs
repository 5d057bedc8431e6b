//! Delayed session transitions
//!
//! Timers count down in simulation steps and carry the session generation
//! they were scheduled under. A timer from an earlier game is dropped when it
//! comes due instead of acting on the new one.

use serde::{Deserialize, Serialize};

/// What to do when a timer comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Build the bricks for a level
    BuildLevel(u32),
    /// Offer "play again" after a game over
    ShowPlayAgain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    ticks_remaining: u32,
    generation: u32,
    action: TimerAction,
}

/// Cooperative scheduler ticked once per simulation step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire after `ticks` steps
    pub fn schedule(&mut self, ticks: u32, generation: u32, action: TimerAction) {
        self.timers.push(Timer {
            ticks_remaining: ticks,
            generation,
            action,
        });
    }

    /// Number of timers still counting down
    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Count down one step and return the due actions for `generation`,
    /// in the order they were scheduled
    pub fn advance(&mut self, generation: u32) -> Vec<TimerAction> {
        let mut due = Vec::new();
        self.timers.retain_mut(|timer| {
            timer.ticks_remaining = timer.ticks_remaining.saturating_sub(1);
            if timer.ticks_remaining > 0 {
                return true;
            }
            if timer.generation == generation {
                due.push(timer.action);
            } else {
                log::debug!(
                    "Dropping stale {:?} from generation {} (now {})",
                    timer.action,
                    timer.generation,
                    generation
                );
            }
            false
        });
        due
    }
}
