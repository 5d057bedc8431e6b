//! Breakout - deterministic brick-breaking gameplay core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball, paddle, bricks, rows, session)
//! - `platform`: Input and presentation collaborator contracts
//! - `persistence`: Versioned JSON save files
//! - `highscores`: Persistent high score store
//! - `tuning`: Data-driven game balance and level catalog

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use highscores::{FileHighScores, HighScoreStore, MemoryHighScores};
pub use tuning::{LevelCatalog, RowTemplate, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz, paddle speed is tuned per step)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Cap on ball substeps within one tick
    pub const MAX_SUBSTEPS: u32 = 64;

    /// Playfield dimensions (origin at field center)
    pub const FIELD_WIDTH: f32 = 33.0;
    pub const FIELD_TOP: f32 = 12.0;
    /// Anything whose center falls below this has left the field
    pub const FIELD_EXIT_Y: f32 = -12.5;
    /// Top edge of the first row of bricks
    pub const WALL_TOP: f32 = 10.0;

    /// Paddle defaults
    pub const PADDLE_Y: f32 = -10.0;
    pub const PADDLE_DEFAULT_SIZE: f32 = 6.0;
    pub const PADDLE_SHRUNK_SIZE: f32 = 4.0;
    /// Radius of the rounded capsule ends
    pub const PADDLE_CAP_RADIUS: f32 = 0.5;
    /// Max displacement per step
    pub const PADDLE_MAX_SPEED: f32 = 0.75;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BALL_INIT_SPEED: f32 = 16.0;
    /// Height of an attached ball above the paddle center
    pub const BALL_ATTACH_OFFSET: f32 = 1.0;
    /// Half-angle of the paddle return cone, measured from vertical
    pub const PADDLE_DEFLECTION_DEG: f32 = 60.0;

    pub const LIVES_PER_GAME: u8 = 3;
    pub const LEVEL_ANNOUNCE_DELAY_SECS: f32 = 2.5;
    pub const PLAY_AGAIN_DELAY_SECS: f32 = 3.0;
    /// Downward acceleration applied to dropped bricks after game over
    pub const DROP_GRAVITY: f32 = 10.0;
}

/// Convert a duration in seconds to whole simulation steps (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    ((secs / consts::SIM_DT).round() as u32).max(1)
}

/// Direction vector for an angle measured from the positive x axis
#[inline]
pub fn direction(theta: f32) -> glam::Vec2 {
    glam::Vec2::new(theta.cos(), theta.sin())
}

/// Angle of a vector measured from the positive x axis
#[cfg(test)]
pub(crate) fn heading(v: glam::Vec2) -> f32 {
    v.y.atan2(v.x)
}
