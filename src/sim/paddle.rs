//! The player's paddle
//!
//! A horizontal capsule sliding along a fixed line near the bottom of the
//! field. It lives for the whole process and keeps the unlaunched ball.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use crate::tuning::Tuning;

/// Paddle size setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaddleSize {
    #[default]
    Default,
    Shrunk,
}

/// Where the shrink particle cue plays (the two old paddle ends)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkCue {
    pub left: Vec2,
    pub right: Vec2,
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Horizontal center position
    pub x: f32,
    /// Vertical center (fixed)
    pub y: f32,
    pub size: PaddleSize,
    /// Furthest the center may travel from the field center
    pub max_pos: f32,
    /// Max displacement per step
    pub max_speed: f32,
    pub cap_radius: f32,
    field_width: f32,
    default_size: f32,
    shrunk_size: f32,
    ball_radius: f32,
    ball_offset: Vec2,
    /// Ball waiting for launch
    pub attached: Option<Ball>,
}

impl Paddle {
    pub fn new(tuning: &Tuning) -> Self {
        let mut paddle = Self {
            x: 0.0,
            y: tuning.paddle_y,
            size: PaddleSize::Default,
            max_pos: 0.0,
            max_speed: tuning.paddle_max_speed,
            cap_radius: tuning.paddle_cap_radius,
            field_width: tuning.field_width,
            default_size: tuning.paddle_default_size,
            shrunk_size: tuning.paddle_shrunk_size,
            ball_radius: tuning.ball_radius,
            ball_offset: Vec2::new(0.0, tuning.ball_attach_offset),
            attached: None,
        };
        paddle.set_size(PaddleSize::Default);
        paddle
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Numeric size of the spine for the current setting
    pub fn size_value(&self) -> f32 {
        match self.size {
            PaddleSize::Default => self.default_size,
            PaddleSize::Shrunk => self.shrunk_size,
        }
    }

    /// Total collider length, rounded ends included
    pub fn length(&self) -> f32 {
        self.size_value() + 2.0 * self.cap_radius
    }

    /// Half length of the straight spine between the rounded ends
    pub fn half_spine(&self) -> f32 {
        self.size_value() * 0.5
    }

    /// Apply a size and recompute the travel limit
    pub fn set_size(&mut self, size: PaddleSize) {
        self.size = size;
        self.max_pos = ((self.field_width - self.length()) * 0.5).max(0.0);
        self.x = self.x.clamp(-self.max_pos, self.max_pos);
        self.sync_attached();
    }

    /// Shrink once; a paddle that is already shrunk ignores the request
    pub fn shrink(&mut self) -> Option<ShrinkCue> {
        if self.size == PaddleSize::Shrunk {
            return None;
        }
        let half = self.size_value() * 0.5;
        let cue = ShrinkCue {
            left: Vec2::new(self.x - half, self.y),
            right: Vec2::new(self.x + half, self.y),
        };
        self.set_size(PaddleSize::Shrunk);
        log::debug!("Paddle shrunk (max_pos {:.2})", self.max_pos);
        Some(cue)
    }

    /// Move by the axis input for one step
    pub fn move_by(&mut self, axis: f32) {
        let axis = if axis.is_finite() { axis } else { 0.0 };
        let limit = if self.max_speed.is_finite() { self.max_speed.max(0.0) } else { 0.0 };
        let delta = axis.clamp(-limit, limit);
        self.x = (self.x + delta).clamp(-self.max_pos, self.max_pos);
        self.sync_attached();
    }

    /// Create an unlaunched ball riding above the paddle center
    pub fn attach_new_ball(&mut self, id: u32) {
        let mut ball = Ball::attached(id, self.ball_radius, self.ball_offset);
        ball.update_attached(self.center());
        if let Some(old) = self.attached.replace(ball) {
            log::debug!("Replaced attached ball {}", old.id);
        }
    }

    /// Take back a ball from the field
    pub fn reattach(&mut self, mut ball: Ball) {
        ball.reattach(self.ball_offset, self.center());
        self.attached = Some(ball);
    }

    /// Hand the attached ball over to the field
    pub fn release_ball(&mut self) -> Option<Ball> {
        self.attached.take()
    }

    fn sync_attached(&mut self) {
        let center = self.center();
        if let Some(ball) = self.attached.as_mut() {
            ball.update_attached(center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_max_pos_follows_size() {
        let mut paddle = Paddle::new(&Tuning::default());
        assert!((paddle.max_pos - (33.0 - 7.0) / 2.0).abs() < 1e-5);
        paddle.set_size(PaddleSize::Shrunk);
        assert!((paddle.max_pos - (33.0 - 5.0) / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_shrink_is_idempotent() {
        let mut paddle = Paddle::new(&Tuning::default());
        let cue = paddle.shrink().expect("first shrink");
        assert_eq!(cue.left.x, -3.0);
        assert_eq!(cue.right.x, 3.0);
        assert_eq!(paddle.size, PaddleSize::Shrunk);
        assert!(paddle.shrink().is_none());
    }

    #[test]
    fn test_restoring_size_clamps_position() {
        let mut paddle = Paddle::new(&Tuning::default());
        paddle.shrink();
        for _ in 0..100 {
            paddle.move_by(1.0);
        }
        assert_eq!(paddle.x, paddle.max_pos);
        paddle.set_size(PaddleSize::Default);
        assert_eq!(paddle.x, paddle.max_pos);
        assert!((paddle.x - 13.0).abs() < 1e-5);
    }

    #[test]
    fn test_move_clamps_step_to_max_speed() {
        let mut paddle = Paddle::new(&Tuning::default());
        paddle.move_by(1.0);
        assert!((paddle.x - 0.75).abs() < 1e-6);
        paddle.move_by(-0.25);
        assert!((paddle.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bad_max_speed_holds_still() {
        let tuning = Tuning {
            paddle_max_speed: -0.5,
            ..Default::default()
        };
        let mut paddle = Paddle::new(&tuning);
        paddle.move_by(0.3);
        assert_eq!(paddle.x, 0.0);
    }

    #[test]
    fn test_wide_caps_stay_in_field() {
        let tuning = Tuning {
            paddle_cap_radius: 2.0,
            ..Default::default()
        };
        let mut paddle = Paddle::new(&tuning);
        for _ in 0..100 {
            paddle.move_by(1.0);
        }
        assert!((paddle.max_pos - (33.0 - 10.0) / 2.0).abs() < 1e-5);
        assert!(paddle.x + paddle.length() * 0.5 <= 33.0 / 2.0 + 1e-4);
    }

    #[test]
    fn test_attached_ball_follows_paddle() {
        let mut paddle = Paddle::new(&Tuning::default());
        paddle.attach_new_ball(4);
        paddle.move_by(0.5);
        let ball = paddle.attached.as_ref().unwrap();
        assert_eq!(ball.pos, Vec2::new(0.5, paddle.y + 1.0));
        assert!(!ball.in_play());
    }

    proptest! {
        #[test]
        fn prop_paddle_stays_in_bounds(
            inputs in proptest::collection::vec(prop_oneof![Just(-1.0f32), Just(1.0f32), -1.0f32..1.0], 1..400),
            shrink_at in 0usize..400,
            cap_radius in prop_oneof![Just(0.5f32), 0.1f32..3.0],
        ) {
            let tuning = Tuning {
                paddle_cap_radius: cap_radius,
                ..Default::default()
            };
            let mut paddle = Paddle::new(&tuning);
            for (i, axis) in inputs.iter().enumerate() {
                if i == shrink_at {
                    paddle.shrink();
                }
                paddle.move_by(*axis);
                prop_assert!(paddle.x >= -paddle.max_pos && paddle.x <= paddle.max_pos);
                let half = paddle.length() * 0.5;
                prop_assert!(paddle.x - half >= -33.0 / 2.0 - 1e-4);
                prop_assert!(paddle.x + half <= 33.0 / 2.0 + 1e-4);
            }
        }
    }
}
