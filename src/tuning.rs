//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`] so it can be tweaked from a
//! JSON file without recompiling. The row templates double as the default
//! level catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// One row of bricks as authored content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowTemplate {
    /// Bricks spread evenly across the field width
    pub brick_count: u32,
    /// Hits needed to destroy each brick (weakened states + 1)
    pub hit_points_per_brick: u32,
    /// Score awarded per destroyed brick
    pub point_value: u64,
    /// Vertical space this row takes in the wall
    pub row_height: f32,
    /// Added to the ball speed when the row is cleared
    pub speed_bonus: f32,
}

impl RowTemplate {
    pub fn new(
        brick_count: u32,
        hit_points_per_brick: u32,
        point_value: u64,
        row_height: f32,
        speed_bonus: f32,
    ) -> Self {
        Self {
            brick_count,
            hit_points_per_brick,
            point_value,
            row_height,
            speed_bonus,
        }
    }
}

/// Ordered source of row templates, top row first
pub trait LevelCatalog {
    fn rows_for_level(&self, level: u32) -> Vec<RowTemplate>;
}

/// Catalog that builds the same wall on every level
#[derive(Debug, Clone, Default)]
pub struct FixedCatalog {
    pub rows: Vec<RowTemplate>,
}

impl FixedCatalog {
    pub fn new(rows: Vec<RowTemplate>) -> Self {
        Self { rows }
    }
}

impl LevelCatalog for FixedCatalog {
    fn rows_for_level(&self, _level: u32) -> Vec<RowTemplate> {
        self.rows.clone()
    }
}

impl LevelCatalog for Tuning {
    fn rows_for_level(&self, _level: u32) -> Vec<RowTemplate> {
        self.rows.clone()
    }
}

/// Errors while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Complete game balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub field_width: f32,
    pub field_top: f32,
    pub field_exit_y: f32,
    pub wall_top: f32,

    // === Paddle ===
    pub paddle_y: f32,
    pub paddle_default_size: f32,
    pub paddle_shrunk_size: f32,
    pub paddle_cap_radius: f32,
    pub paddle_max_speed: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_init_speed: f32,
    pub ball_attach_offset: f32,
    pub paddle_deflection_deg: f32,

    // === Session ===
    pub lives_per_game: u8,
    pub level_announce_delay_secs: f32,
    pub play_again_delay_secs: f32,
    pub drop_gravity: f32,

    // === Content ===
    pub rows: Vec<RowTemplate>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_top: FIELD_TOP,
            field_exit_y: FIELD_EXIT_Y,
            wall_top: WALL_TOP,

            paddle_y: PADDLE_Y,
            paddle_default_size: PADDLE_DEFAULT_SIZE,
            paddle_shrunk_size: PADDLE_SHRUNK_SIZE,
            paddle_cap_radius: PADDLE_CAP_RADIUS,
            paddle_max_speed: PADDLE_MAX_SPEED,

            ball_radius: BALL_RADIUS,
            ball_init_speed: BALL_INIT_SPEED,
            ball_attach_offset: BALL_ATTACH_OFFSET,
            paddle_deflection_deg: PADDLE_DEFLECTION_DEG,

            lives_per_game: LIVES_PER_GAME,
            level_announce_delay_secs: LEVEL_ANNOUNCE_DELAY_SECS,
            play_again_delay_secs: PLAY_AGAIN_DELAY_SECS,
            drop_gravity: DROP_GRAVITY,

            // Top rows are tougher and worth more
            rows: vec![
                RowTemplate::new(11, 3, 7, 1.0, 4.0),
                RowTemplate::new(11, 2, 5, 1.0, 4.0),
                RowTemplate::new(11, 2, 4, 1.0, 4.0),
                RowTemplate::new(11, 1, 3, 1.0, 4.0),
                RowTemplate::new(11, 1, 2, 1.0, 4.0),
                RowTemplate::new(11, 1, 1, 1.0, 4.0),
            ],
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let tuning: Tuning = serde_json::from_str(&text)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning from {} ({} rows)",
            path.as_ref().display(),
            tuning.rows.len()
        );
        Ok(tuning)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.field_width > 0.0) {
            return Err(TuningError::Invalid("field_width must be positive".into()));
        }
        if !(self.paddle_cap_radius > 0.0 && self.paddle_cap_radius.is_finite()) {
            return Err(TuningError::Invalid("paddle_cap_radius must be positive".into()));
        }
        if self.paddle_default_size + 2.0 * self.paddle_cap_radius >= self.field_width {
            return Err(TuningError::Invalid(
                "paddle_default_size does not fit in the field".into(),
            ));
        }
        if !(self.paddle_shrunk_size >= 0.0) || self.paddle_shrunk_size > self.paddle_default_size {
            return Err(TuningError::Invalid(
                "paddle_shrunk_size must be between 0 and paddle_default_size".into(),
            ));
        }
        if !(self.paddle_max_speed > 0.0 && self.paddle_max_speed.is_finite()) {
            return Err(TuningError::Invalid("paddle_max_speed must be positive".into()));
        }
        if !(self.ball_radius > 0.0 && self.ball_radius.is_finite()) {
            return Err(TuningError::Invalid("ball_radius must be positive".into()));
        }
        if !(self.ball_init_speed > 0.0) {
            return Err(TuningError::Invalid("ball_init_speed must be positive".into()));
        }
        if self.lives_per_game == 0 {
            return Err(TuningError::Invalid("lives_per_game must be at least 1".into()));
        }
        if self.field_exit_y >= self.paddle_y {
            return Err(TuningError::Invalid(
                "field_exit_y must be below paddle_y".into(),
            ));
        }
        if !self.rows.iter().any(|row| row.brick_count > 0) {
            return Err(TuningError::Invalid("rows must contain at least one brick".into()));
        }
        Ok(())
    }

    /// Half-angle of the paddle return cone in radians
    pub fn deflection_cone(&self) -> f32 {
        self.paddle_deflection_deg.to_radians()
    }
}
