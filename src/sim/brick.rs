//! Bricks and the rows that own them
//!
//! A brick reports what a hit did to it; the row turns a destruction into a
//! count and, once the count reaches zero, a clear. Neither reaches upward:
//! the session acts on the returned outcome.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball::BallSpeed;
use crate::tuning::RowTemplate;

/// Brick durability state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickState {
    /// Never hit
    Active,
    /// Hit at least once, still standing
    Weakened,
    /// Hits exhausted
    Destroyed,
    /// Knocked loose by the game-over cascade
    Falling,
}

/// What a single hit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Brick is falling and cannot be destroyed
    Ignored,
    /// Brick survived; `stage` counts hits taken so far (1-based)
    Weakened { stage: u32 },
    /// Brick destroyed; award `points`
    Destroyed { points: u64 },
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub remaining_hits: u32,
    /// Weakened stages between intact and destroyed
    pub weakened_states: u32,
    pub destroyable: bool,
    pub point_value: u64,
    pub state: BrickState,
    /// Fall velocity while dropping
    #[serde(default)]
    pub vel: Vec2,
    /// Tumble rate (radians/s per axis) while dropping
    #[serde(default)]
    pub spin: Vec3,
    /// Accumulated tumble, for presentation
    #[serde(default)]
    pub rotation: Vec3,
}

impl Brick {
    pub fn new(
        id: u32,
        center: Vec2,
        half_extents: Vec2,
        weakened_states: u32,
        point_value: u64,
    ) -> Self {
        Self {
            id,
            center,
            half_extents,
            remaining_hits: weakened_states + 1,
            weakened_states,
            destroyable: true,
            point_value,
            state: BrickState::Active,
            vel: Vec2::ZERO,
            spin: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    /// Register a ball hit
    pub fn on_hit(&mut self) -> HitOutcome {
        if !self.destroyable || self.remaining_hits == 0 {
            return HitOutcome::Ignored;
        }
        self.remaining_hits -= 1;
        if self.remaining_hits > 0 {
            self.state = BrickState::Weakened;
            HitOutcome::Weakened {
                stage: self.weakened_states + 1 - self.remaining_hits,
            }
        } else {
            self.state = BrickState::Destroyed;
            self.destroyable = false;
            HitOutcome::Destroyed {
                points: self.point_value,
            }
        }
    }

    /// Knock the brick loose with a random tumble
    pub fn drop(&mut self, rng: &mut impl Rng) {
        if matches!(self.state, BrickState::Destroyed | BrickState::Falling) {
            return;
        }
        self.destroyable = false;
        self.state = BrickState::Falling;
        self.spin = Vec3::new(
            rng.random_range(-20.0..20.0),
            rng.random_range(-100.0..100.0),
            rng.random_range(-50.0..50.0),
        );
    }

    /// Advance a falling brick; returns true once it has left the field
    pub fn fall(&mut self, gravity: f32, exit_y: f32, dt: f32) -> bool {
        if self.state != BrickState::Falling {
            return false;
        }
        self.vel.y -= gravity * dt;
        self.center += self.vel * dt;
        self.rotation += self.spin * dt;
        self.center.y + self.half_extents.y < exit_y
    }
}

/// Row status after losing a brick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowStatus {
    /// Bricks remain
    Standing { live: u32 },
    /// Last brick gone; the speed bonus has been applied
    Cleared,
    /// Brick was not live in this row; nothing counted
    Unchanged,
}

/// Result of a ball hitting a brick in a row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHit {
    pub outcome: HitOutcome,
    pub status: RowStatus,
}

/// A horizontal group of bricks sharing a clear event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrickRow {
    pub id: u32,
    pub bricks: Vec<Brick>,
    pub live_brick_count: u32,
    pub speed_bonus: f32,
}

impl BrickRow {
    /// Lay out a row from its template, bricks spread across `field_width`
    ///
    /// `top` is the upper edge of the row. `next_id` hands out brick ids.
    pub fn build(
        id: u32,
        template: &RowTemplate,
        field_width: f32,
        top: f32,
        mut next_id: impl FnMut() -> u32,
    ) -> Self {
        let count = template.brick_count.max(1);
        let cell_w = field_width / count as f32;
        let half_extents = Vec2::new(cell_w * 0.45, template.row_height * 0.4);
        let y = top - template.row_height * 0.5;
        let weakened = template.hit_points_per_brick.max(1) - 1;

        let bricks: Vec<Brick> = (0..count)
            .map(|i| {
                let x = -field_width * 0.5 + cell_w * (i as f32 + 0.5);
                Brick::new(
                    next_id(),
                    Vec2::new(x, y),
                    half_extents,
                    weakened,
                    template.point_value,
                )
            })
            .collect();

        Self {
            id,
            live_brick_count: bricks.len() as u32,
            bricks,
            speed_bonus: template.speed_bonus,
        }
    }

    /// Hit a brick by id, funnelling a destruction into the row count
    pub fn hit_brick(&mut self, brick_id: u32, speed: &mut BallSpeed) -> Option<RowHit> {
        let brick = self.bricks.iter_mut().find(|b| b.id == brick_id)?;
        let outcome = brick.on_hit();
        let status = match outcome {
            HitOutcome::Destroyed { .. } => self.on_child_destroyed(brick_id, speed),
            _ => RowStatus::Unchanged,
        };
        Some(RowHit { outcome, status })
    }

    /// A child brick has gone, either destroyed or fallen off the field
    ///
    /// Removing the brick is what makes a second report for the same id a
    /// no-op, so the count never goes below zero.
    pub fn on_child_destroyed(&mut self, brick_id: u32, speed: &mut BallSpeed) -> RowStatus {
        let Some(index) = self.bricks.iter().position(|b| b.id == brick_id) else {
            return RowStatus::Unchanged;
        };
        if self.live_brick_count == 0 {
            log::warn!("Row {}: brick {} reported after clear", self.id, brick_id);
            return RowStatus::Unchanged;
        }
        self.bricks.remove(index);
        self.live_brick_count -= 1;

        if self.live_brick_count == 0 {
            speed.boost(self.speed_bonus);
            log::debug!(
                "Row {} cleared, ball speed now {:.2}",
                self.id,
                speed.get()
            );
            RowStatus::Cleared
        } else {
            RowStatus::Standing {
                live: self.live_brick_count,
            }
        }
    }

    /// Drop every remaining brick (game-over cascade)
    pub fn drop_all(&mut self, rng: &mut impl Rng) {
        for brick in &mut self.bricks {
            brick.drop(rng);
        }
    }
}
