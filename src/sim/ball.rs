//! The ball: constant-speed motion and collision response
//!
//! A ball never changes its own speed. It is handed the session's
//! [`BallSpeed`] whenever it needs a magnitude, and only ever recomputes its
//! direction.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::bounce;
use crate::direction;

/// The shared speed magnitude of the active ball
///
/// Owned by the session, raised by row clears, reset on every new game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSpeed(f32);

impl BallSpeed {
    pub fn new(initial: f32) -> Self {
        Self(initial)
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }

    pub fn boost(&mut self, bonus: f32) {
        self.0 += bonus;
    }

    pub fn reset(&mut self, initial: f32) {
        self.0 = initial;
    }
}

/// Ball lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallState {
    /// Riding on the paddle at the given offset from its center
    Attached { offset: Vec2 },
    /// Launched and moving freely
    Free,
    /// Left the field through the bottom
    Lost,
}

/// Solids the ball can bounce off
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solid {
    /// The paddle capsule, centered at `center`, total collider length `length`
    Paddle { center: Vec2, length: f32 },
    TopWall,
    SideWall,
    Brick,
}

/// What a collision asks of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallSignal {
    /// Top wall touched: shrink the paddle
    ShrinkPaddle,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
}

impl Ball {
    /// Create a ball riding on the paddle
    pub fn attached(id: u32, radius: f32, offset: Vec2) -> Self {
        Self {
            id,
            pos: offset,
            vel: Vec2::ZERO,
            radius,
            state: BallState::Attached { offset },
        }
    }

    #[inline]
    pub fn in_play(&self) -> bool {
        self.state == BallState::Free
    }

    /// Follow the paddle while attached
    pub fn update_attached(&mut self, paddle_center: Vec2) {
        if let BallState::Attached { offset } = self.state {
            self.pos = paddle_center + offset;
        }
    }

    /// Launch at a random angle between 45° and 135°
    ///
    /// Returns false (and does nothing) if the ball is already in play.
    pub fn launch(&mut self, speed: BallSpeed, rng: &mut impl Rng) -> bool {
        if !matches!(self.state, BallState::Attached { .. }) {
            return false;
        }
        let theta = rng.random_range(FRAC_PI_4..=3.0 * FRAC_PI_4);
        self.vel = direction(theta) * speed.get();
        self.state = BallState::Free;
        true
    }

    /// Put the ball back on the paddle (level rebuild)
    pub fn reattach(&mut self, offset: Vec2, paddle_center: Vec2) {
        self.vel = Vec2::ZERO;
        self.state = BallState::Attached { offset };
        self.pos = paddle_center + offset;
    }

    /// Keep the velocity magnitude pinned to the shared speed
    pub fn sync_speed(&mut self, speed: BallSpeed) {
        if self.in_play() {
            let dir = self.vel.normalize_or_zero();
            if dir != Vec2::ZERO {
                self.vel = dir * speed.get();
            }
        }
    }

    /// Advance position by `dt` seconds
    pub fn integrate(&mut self, dt: f32) {
        if self.in_play() {
            self.pos += self.vel * dt;
        }
    }

    /// Resolve contact with a solid
    ///
    /// `normal` points from the solid toward the ball center.
    pub fn on_collide_solid(
        &mut self,
        solid: Solid,
        normal: Vec2,
        speed: BallSpeed,
        cone: f32,
    ) -> Option<BallSignal> {
        if !self.in_play() {
            return None;
        }
        match solid {
            Solid::Paddle { center, length } => {
                // Paddle above the ball means a side or underside graze
                if center.y > self.pos.y {
                    self.vel = bounce(self.vel, normal);
                    return None;
                }
                match paddle_return_angle(center.x, self.pos.x, length, cone) {
                    Some(theta) => self.vel = direction(theta) * speed.get(),
                    None => {
                        log::debug!("Ball {}: unusable paddle geometry, bouncing", self.id);
                        self.vel = bounce(self.vel, normal);
                    }
                }
                None
            }
            Solid::TopWall => {
                self.vel = bounce(self.vel, normal);
                Some(BallSignal::ShrinkPaddle)
            }
            Solid::SideWall | Solid::Brick => {
                self.vel = bounce(self.vel, normal);
                None
            }
        }
    }

    /// Bottom of the field reached
    ///
    /// Fires once: returns true only on the transition out of play.
    pub fn on_exit_field(&mut self) -> bool {
        if !self.in_play() {
            return false;
        }
        self.state = BallState::Lost;
        self.vel = Vec2::ZERO;
        true
    }
}

/// Return angle off the paddle, measured from the positive x axis
///
/// Linear in the horizontal offset from the paddle center: straight up at
/// the center, `90° + cone` at the left end, `90° - cone` at the right end.
/// `None` when the paddle length cannot be used.
pub fn paddle_return_angle(paddle_x: f32, ball_x: f32, length: f32, cone: f32) -> Option<f32> {
    let half = length * 0.5;
    if !half.is_finite() || half <= f32::EPSILON || !cone.is_finite() {
        return None;
    }
    let rel = ((paddle_x - ball_x) / half).clamp(-1.0, 1.0);
    Some(rel * cone + FRAC_PI_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CONE: f32 = std::f32::consts::FRAC_PI_3;

    fn free_ball(vel: Vec2) -> Ball {
        let mut ball = Ball::attached(1, 0.5, Vec2::new(0.0, 1.0));
        ball.state = BallState::Free;
        ball.vel = vel;
        ball
    }

    #[test]
    fn test_launch_angle_and_speed() {
        let mut rng = Pcg32::seed_from_u64(7);
        let speed = BallSpeed::new(16.0);
        for _ in 0..200 {
            let mut ball = Ball::attached(1, 0.5, Vec2::new(0.0, 1.0));
            assert!(ball.launch(speed, &mut rng));
            let theta = crate::heading(ball.vel);
            assert!(theta >= FRAC_PI_4 - 1e-4 && theta <= 3.0 * FRAC_PI_4 + 1e-4);
            assert!((ball.vel.length() - 16.0).abs() < 1e-3);
            assert!(ball.in_play());
        }
    }

    #[test]
    fn test_second_launch_is_ignored() {
        let mut rng = Pcg32::seed_from_u64(1);
        let speed = BallSpeed::new(16.0);
        let mut ball = Ball::attached(1, 0.5, Vec2::new(0.0, 1.0));
        assert!(ball.launch(speed, &mut rng));
        let vel = ball.vel;
        assert!(!ball.launch(speed, &mut rng));
        assert_eq!(ball.vel, vel);
    }

    #[test]
    fn test_paddle_center_hit_goes_straight_up() {
        let mut ball = free_ball(Vec2::new(3.0, -10.0));
        ball.pos = Vec2::new(2.0, -9.0);
        let paddle = Solid::Paddle {
            center: Vec2::new(2.0, -10.0),
            length: 7.0,
        };
        ball.on_collide_solid(paddle, Vec2::Y, BallSpeed::new(16.0), CONE);
        assert!((crate::heading(ball.vel) - FRAC_PI_2).abs() < 1e-5);
        assert!((ball.vel.length() - 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_paddle_left_edge_hit_is_150_degrees() {
        let mut ball = free_ball(Vec2::new(0.0, -10.0));
        ball.pos = Vec2::new(-3.5, -9.0);
        let paddle = Solid::Paddle {
            center: Vec2::new(0.0, -10.0),
            length: 7.0,
        };
        ball.on_collide_solid(paddle, Vec2::Y, BallSpeed::new(20.0), CONE);
        let degrees = crate::heading(ball.vel).to_degrees();
        assert!((degrees - 150.0).abs() < 1e-3, "got {degrees}");
        assert!((ball.vel.length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_paddle_above_ball_bounces_elastically() {
        let mut ball = free_ball(Vec2::new(4.0, 3.0));
        ball.pos = Vec2::new(-4.0, -10.5);
        let paddle = Solid::Paddle {
            center: Vec2::new(0.0, -10.0),
            length: 7.0,
        };
        ball.on_collide_solid(paddle, -Vec2::X, BallSpeed::new(5.0), CONE);
        assert_eq!(ball.vel, Vec2::new(-4.0, 3.0));
    }

    #[test]
    fn test_broken_paddle_geometry_falls_back_to_bounce() {
        let mut ball = free_ball(Vec2::new(0.0, -5.0));
        ball.pos = Vec2::new(0.0, -9.0);
        let paddle = Solid::Paddle {
            center: Vec2::new(0.0, -10.0),
            length: f32::NAN,
        };
        ball.on_collide_solid(paddle, Vec2::Y, BallSpeed::new(5.0), CONE);
        assert_eq!(ball.vel, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_top_wall_signals_shrink() {
        let mut ball = free_ball(Vec2::new(3.0, 4.0));
        let signal = ball.on_collide_solid(Solid::TopWall, -Vec2::Y, BallSpeed::new(5.0), CONE);
        assert_eq!(signal, Some(BallSignal::ShrinkPaddle));
        assert_eq!(ball.vel, Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_exit_field_fires_once() {
        let mut ball = free_ball(Vec2::new(0.0, -5.0));
        assert!(ball.on_exit_field());
        assert!(!ball.in_play());
        assert!(!ball.on_exit_field());
    }

    #[test]
    fn test_attached_ball_never_exits() {
        let mut ball = Ball::attached(1, 0.5, Vec2::new(0.0, 1.0));
        assert!(!ball.on_exit_field());
    }

    proptest! {
        #[test]
        fn prop_return_angle_stays_in_cone(paddle_x in -15.0f32..15.0, ball_x in -20.0f32..20.0) {
            let theta = paddle_return_angle(paddle_x, ball_x, 7.0, CONE).unwrap();
            prop_assert!(theta >= FRAC_PI_2 - CONE - 1e-5);
            prop_assert!(theta <= FRAC_PI_2 + CONE + 1e-5);
        }

        #[test]
        fn prop_bounces_preserve_speed(angle in 0.0f32..std::f32::consts::TAU, wall in 0usize..3) {
            let speed = BallSpeed::new(16.0);
            let mut ball = free_ball(direction(angle) * 16.0);
            let (solid, normal) = match wall {
                0 => (Solid::SideWall, Vec2::X),
                1 => (Solid::TopWall, -Vec2::Y),
                _ => (Solid::Brick, Vec2::Y),
            };
            ball.on_collide_solid(solid, normal, speed, CONE);
            prop_assert!((ball.vel.length() - 16.0).abs() < 1e-3);
        }
    }
}
