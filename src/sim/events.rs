//! Events the simulation emits for presentation
//!
//! The session queues these during a step; the platform layer drains and
//! dispatches them. Nothing in the simulation reads them back.

use glam::Vec2;

/// A notification for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    GameStarted,
    /// Displayed score changed (animated toward the real score)
    ScoreChanged(u64),
    HighScoreChanged(u64),
    LivesChanged(u8),
    LevelChanged(u32),
    /// Level banner and fireworks before a delayed build
    LevelAnnounced(u32),
    /// Instructions and game-over text should be hidden
    MessagesCleared,
    BallLaunched { ball_id: u32 },
    BallLost { ball_id: u32 },
    /// Shrink cue plays at the old paddle ends
    PaddleShrunk { left: Vec2, right: Vec2 },
    BrickWeakened { brick_id: u32, stage: u32 },
    BrickDestroyed { brick_id: u32, pos: Vec2 },
    /// A dropped brick fell out of the field (no points)
    BrickFell { brick_id: u32 },
    RowCleared { row_id: u32 },
    GameOver,
    PlayAgainAvailable,
}
