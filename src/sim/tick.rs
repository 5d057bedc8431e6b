//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session deterministically: paddle, ball
//! and contacts, falling bricks, due timers, then the score display.

use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallSignal, Solid};
use super::collision::{ball_box_collision, ball_capsule_collision, ball_wall_collisions, Wall};
use super::brick::BrickState;
use super::session::GameSession;
use crate::consts::MAX_SUBSTEPS;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Horizontal axis in [-1, 1]
    pub horizontal_axis: f32,
    /// Launch ball (fire button)
    pub launch: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) {
    session.time_ticks += 1;

    session.paddle.move_by(input.horizontal_axis);

    if input.launch {
        session.launch_ball();
    }

    step_ball(session, dt);
    step_falling_bricks(session, dt);

    for action in session.scheduler.advance(session.generation) {
        session.fire_timer(action);
    }

    session.animate_score();
}

/// Move the field ball, substepping so it never skips past a brick
fn step_ball(session: &mut GameSession, dt: f32) {
    let Some(mut ball) = session.ball.take() else {
        return;
    };

    ball.sync_speed(session.ball_speed);
    let travel = ball.vel.length() * dt;
    let max_step = (ball.radius * 0.5).max(1e-3);
    let substeps = ((travel / max_step).ceil() as u32).clamp(1, MAX_SUBSTEPS);
    let sub_dt = dt / substeps as f32;

    for _ in 0..substeps {
        ball.integrate(sub_dt);
        resolve_contacts(session, &mut ball);

        if ball.pos.y < session.tuning.field_exit_y {
            if ball.on_exit_field() {
                log::debug!("Ball {} left the field", ball.id);
                session.on_ball_lost(ball.id);
            }
            return;
        }
    }

    // Row clears during the step may have raised the speed
    ball.sync_speed(session.ball_speed);
    session.ball = Some(ball);
}

/// Resolve every contact of the ball in a fixed order:
/// walls (left, right, top), paddle, then rows top-down and bricks by id
fn resolve_contacts(session: &mut GameSession, ball: &mut Ball) {
    let half_width = session.tuning.field_width * 0.5;
    let top = session.tuning.field_top;
    let cone = session.tuning.deflection_cone();

    for (wall, hit) in ball_wall_collisions(ball.pos, ball.radius, half_width, top) {
        ball.pos += hit.normal * hit.penetration;
        let solid = match wall {
            Wall::Top => Solid::TopWall,
            Wall::Left | Wall::Right => Solid::SideWall,
        };
        if let Some(BallSignal::ShrinkPaddle) =
            ball.on_collide_solid(solid, hit.normal, session.ball_speed, cone)
        {
            session.on_top_wall_hit();
        }
    }

    let paddle = &session.paddle;
    let hit = ball_capsule_collision(
        ball.pos,
        ball.radius,
        paddle.center(),
        paddle.half_spine(),
        paddle.cap_radius,
    );
    if hit.hit {
        let approaching = ball.vel.dot(hit.normal) < 0.0;
        let solid = Solid::Paddle {
            center: paddle.center(),
            length: paddle.length(),
        };
        ball.pos += hit.normal * hit.penetration;
        if approaching {
            ball.on_collide_solid(solid, hit.normal, session.ball_speed, cone);
        }
    }

    let contacts: Vec<_> = session
        .rows
        .iter()
        .flat_map(|row| {
            row.bricks
                .iter()
                .filter(|b| b.state != BrickState::Falling)
                .map(move |b| (row.id, b.id, b.center, b.half_extents))
        })
        .filter_map(|(row_id, brick_id, center, half)| {
            let hit = ball_box_collision(ball.pos, ball.radius, center, half);
            hit.hit.then_some((row_id, brick_id, hit))
        })
        .collect();

    let deepest = contacts
        .iter()
        .map(|(_, _, hit)| (hit.normal, hit.penetration))
        .fold(None, |best: Option<(glam::Vec2, f32)>, (n, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((n, p)),
        });

    for (row_id, brick_id, hit) in &contacts {
        ball.on_collide_solid(Solid::Brick, hit.normal, session.ball_speed, cone);
        session.hit_brick(*row_id, *brick_id);
    }

    if let Some((normal, penetration)) = deepest {
        ball.pos += normal * penetration;
    }
}

/// Drop cascade: move falling bricks and retire those off the field
fn step_falling_bricks(session: &mut GameSession, dt: f32) {
    let gravity = session.tuning.drop_gravity;
    let exit_y = session.tuning.field_exit_y;

    let mut fallen = Vec::new();
    for row in &mut session.rows {
        for brick in &mut row.bricks {
            if brick.fall(gravity, exit_y, dt) {
                fallen.push((row.id, brick.id));
            }
        }
    }

    for (row_id, brick_id) in fallen {
        session.brick_fell(row_id, brick_id);
    }
}
