//! Collision detection and response for the rectangular playfield
//!
//! Bricks are axis-aligned boxes, the paddle is a horizontal capsule and the
//! walls are half-planes. Every test returns the contact normal pointing
//! toward the ball center so callers can reflect and push out.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward ball center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    fn contact(normal: Vec2, penetration: f32) -> Self {
        Self {
            hit: true,
            normal,
            penetration,
        }
    }
}

/// Check collision between a ball and an axis-aligned box
pub fn ball_box_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    center: Vec2,
    half_extents: Vec2,
) -> CollisionResult {
    let min = center - half_extents;
    let max = center + half_extents;
    let closest = ball_pos.clamp(min, max);
    let delta = ball_pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > ball_radius * ball_radius {
        return CollisionResult::miss();
    }

    if dist_sq > 1e-8 {
        let dist = dist_sq.sqrt();
        return CollisionResult::contact(delta / dist, ball_radius - dist);
    }

    // Ball center inside the box (tunneling) - push out through the nearest face
    let local = ball_pos - center;
    let gap_x = half_extents.x - local.x.abs();
    let gap_y = half_extents.y - local.y.abs();
    if gap_x < gap_y {
        let sign = if local.x < 0.0 { -1.0 } else { 1.0 };
        CollisionResult::contact(Vec2::new(sign, 0.0), gap_x + ball_radius)
    } else {
        let sign = if local.y < 0.0 { -1.0 } else { 1.0 };
        CollisionResult::contact(Vec2::new(0.0, sign), gap_y + ball_radius)
    }
}

/// Check collision between a ball and a horizontal capsule
///
/// The capsule's spine runs from `center.x - half_length` to
/// `center.x + half_length`, and `cap_radius` rounds it off.
pub fn ball_capsule_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    center: Vec2,
    half_length: f32,
    cap_radius: f32,
) -> CollisionResult {
    let spine_x = ball_pos
        .x
        .clamp(center.x - half_length, center.x + half_length);
    let spine = Vec2::new(spine_x, center.y);
    let delta = ball_pos - spine;
    let dist = delta.length();
    let reach = ball_radius + cap_radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > 1e-6 { delta / dist } else { Vec2::Y };
    CollisionResult::contact(normal, reach - dist)
}

/// Walls of the playfield the ball can bounce off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
}

/// Check the ball against the left, right and top walls (in that order)
pub fn ball_wall_collisions(
    ball_pos: Vec2,
    ball_radius: f32,
    half_width: f32,
    top: f32,
) -> Vec<(Wall, CollisionResult)> {
    let mut hits = Vec::new();

    let left_gap = ball_pos.x - ball_radius + half_width;
    if left_gap < 0.0 {
        hits.push((
            Wall::Left,
            CollisionResult::contact(Vec2::X, -left_gap),
        ));
    }

    let right_gap = half_width - (ball_pos.x + ball_radius);
    if right_gap < 0.0 {
        hits.push((
            Wall::Right,
            CollisionResult::contact(-Vec2::X, -right_gap),
        ));
    }

    let top_gap = top - (ball_pos.y + ball_radius);
    if top_gap < 0.0 {
        hits.push((
            Wall::Top,
            CollisionResult::contact(-Vec2::Y, -top_gap),
        ));
    }

    hits
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Elastic bounce that only flips a velocity heading into the surface
///
/// A ball already separating from the surface is left alone, so touching two
/// coplanar solids in one step does not cancel the first bounce.
#[inline]
pub fn bounce(velocity: Vec2, normal: Vec2) -> Vec2 {
    if velocity.dot(normal) < 0.0 {
        reflect_velocity(velocity, normal)
    } else {
        velocity
    }
}
