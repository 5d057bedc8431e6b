//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (walls, paddle, rows top-down, bricks by ID)
//! - No rendering or platform dependencies

pub mod ball;
pub mod brick;
pub mod collision;
pub mod events;
pub mod paddle;
pub mod session;
pub mod tick;
pub mod timer;

pub use ball::{Ball, BallSignal, BallSpeed, BallState, Solid, paddle_return_angle};
pub use brick::{Brick, BrickRow, BrickState, HitOutcome, RowHit, RowStatus};
pub use collision::{CollisionResult, ball_box_collision, ball_capsule_collision, reflect_velocity};
pub use events::GameEvent;
pub use paddle::{Paddle, PaddleSize, ShrinkCue};
pub use session::{GamePhase, GameSession};
pub use tick::{TickInput, tick};
pub use timer::{Scheduler, TimerAction};
