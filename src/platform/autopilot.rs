//! Demo-mode input: an AI that plays the game
//!
//! Launches as soon as a ball is waiting and steers the paddle under the
//! predicted landing point, with a slow oscillating offset so the returns
//! vary instead of settling into a loop.

use crate::sim::{BallState, GamePhase, GameSession, TickInput};

use super::InputSource;

#[derive(Debug, Clone, Default)]
pub struct AutoPilot {
    /// Scale of the off-center aim, as a fraction of the paddle half spine
    pub aim_spread: f32,
}

impl AutoPilot {
    pub fn new() -> Self {
        Self { aim_spread: 0.6 }
    }

    /// Where the paddle should be centered this tick
    pub fn target_x(&self, session: &GameSession) -> f32 {
        let paddle = session.paddle();
        let Some(ball) = session.ball().filter(|b| matches!(b.state, BallState::Free)) else {
            return 0.0;
        };

        let time_factor = session.time_ticks() as f32 * 0.01;
        let wobble = time_factor.sin() * 0.3 + (time_factor * 0.7).sin() * 0.15;
        let offset = wobble * self.aim_spread * paddle.half_spine();

        if ball.vel.y >= 0.0 {
            return ball.pos.x + offset;
        }

        // Follow the ball down to the paddle line, folding side-wall bounces
        let tuning = session.tuning();
        let catch_y = paddle.y + tuning.paddle_cap_radius + ball.radius;
        let time_to_catch = ((ball.pos.y - catch_y) / -ball.vel.y).max(0.0);
        let raw_x = ball.pos.x + ball.vel.x * time_to_catch;
        let half = tuning.field_width * 0.5 - ball.radius;
        fold_into_walls(raw_x, half) + offset
    }
}

impl InputSource for AutoPilot {
    fn poll(&mut self, session: &GameSession) -> TickInput {
        let launch = session.phase() == GamePhase::Playing && session.attached_ball().is_some();
        TickInput {
            horizontal_axis: self.target_x(session) - session.paddle().x,
            launch,
        }
    }
}

/// Mirror an unbounded x back into [-half, half] as repeated wall bounces would
fn fold_into_walls(x: f32, half: f32) -> f32 {
    if half <= 0.0 || !x.is_finite() {
        return 0.0;
    }
    let period = 4.0 * half;
    let shifted = (x + half).rem_euclid(period);
    let folded = if shifted > 2.0 * half { period - shifted } else { shifted };
    folded - half
}
