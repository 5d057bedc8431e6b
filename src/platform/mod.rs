//! Platform abstraction layer
//!
//! The simulation never talks to a screen, speaker or keyboard. The platform
//! side supplies:
//! - Input (`InputSource`, polled once per tick)
//! - Presentation (`PresentationSink`, fed from drained session events)

pub mod autopilot;

pub use autopilot::AutoPilot;

use glam::Vec2;

use crate::sim::{GameEvent, GameSession, TickInput};

/// Supplies the per-tick input
pub trait InputSource {
    fn poll(&mut self, session: &GameSession) -> TickInput;
}

/// Receives gameplay notifications (labels, particles, sounds)
///
/// The first group is what every front end must show; the rest default to
/// no-ops.
pub trait PresentationSink {
    fn on_score_changed(&mut self, score: u64);
    fn on_lives_changed(&mut self, lives: u8);
    fn on_level_changed(&mut self, level: u32);
    fn on_game_over(&mut self);
    fn on_game_started(&mut self);
    fn on_paddle_shrunk(&mut self, left: Vec2, right: Vec2);
    fn on_brick_weakened(&mut self, brick_id: u32, stage: u32);
    fn on_brick_destroyed(&mut self, brick_id: u32, pos: Vec2);

    fn on_high_score_changed(&mut self, _score: u64) {}
    fn on_level_announced(&mut self, _level: u32) {}
    fn on_messages_cleared(&mut self) {}
    fn on_play_again_available(&mut self) {}
    fn on_ball_launched(&mut self, _ball_id: u32) {}
    fn on_ball_lost(&mut self, _ball_id: u32) {}
    fn on_brick_fell(&mut self, _brick_id: u32) {}
    fn on_row_cleared(&mut self, _row_id: u32) {}
}

/// Route events to the sink in emission order
pub fn dispatch(events: &[GameEvent], sink: &mut dyn PresentationSink) {
    for event in events {
        match *event {
            GameEvent::GameStarted => sink.on_game_started(),
            GameEvent::ScoreChanged(score) => sink.on_score_changed(score),
            GameEvent::HighScoreChanged(score) => sink.on_high_score_changed(score),
            GameEvent::LivesChanged(lives) => sink.on_lives_changed(lives),
            GameEvent::LevelChanged(level) => sink.on_level_changed(level),
            GameEvent::LevelAnnounced(level) => sink.on_level_announced(level),
            GameEvent::MessagesCleared => sink.on_messages_cleared(),
            GameEvent::BallLaunched { ball_id } => sink.on_ball_launched(ball_id),
            GameEvent::BallLost { ball_id } => sink.on_ball_lost(ball_id),
            GameEvent::PaddleShrunk { left, right } => sink.on_paddle_shrunk(left, right),
            GameEvent::BrickWeakened { brick_id, stage } => sink.on_brick_weakened(brick_id, stage),
            GameEvent::BrickDestroyed { brick_id, pos } => sink.on_brick_destroyed(brick_id, pos),
            GameEvent::BrickFell { brick_id } => sink.on_brick_fell(brick_id),
            GameEvent::RowCleared { row_id } => sink.on_row_cleared(row_id),
            GameEvent::GameOver => sink.on_game_over(),
            GameEvent::PlayAgainAvailable => sink.on_play_again_available(),
        }
    }
}

/// Headless sink that writes the interesting events to the log
#[derive(Debug, Default)]
pub struct LogSink {
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    pub bricks_destroyed: u32,
    pub games_over: u32,
}

impl PresentationSink for LogSink {
    fn on_score_changed(&mut self, score: u64) {
        self.score = score;
        log::trace!("Score {}", score);
    }

    fn on_lives_changed(&mut self, lives: u8) {
        self.lives = lives;
        log::info!("Balls left: {}", lives);
    }

    fn on_level_changed(&mut self, level: u32) {
        self.level = level;
        log::info!("Level {}", level);
    }

    fn on_game_over(&mut self) {
        self.games_over += 1;
        log::info!("GAME OVER (score {})", self.score);
    }

    fn on_game_started(&mut self) {
        log::info!("Game started");
    }

    fn on_paddle_shrunk(&mut self, left: Vec2, right: Vec2) {
        log::info!("Paddle shrunk (cue at {:.1} / {:.1})", left.x, right.x);
    }

    fn on_brick_weakened(&mut self, brick_id: u32, stage: u32) {
        log::debug!("Brick {} cracked (stage {})", brick_id, stage);
    }

    fn on_brick_destroyed(&mut self, brick_id: u32, pos: Vec2) {
        self.bricks_destroyed += 1;
        log::debug!("Brick {} destroyed at ({:.1}, {:.1})", brick_id, pos.x, pos.y);
    }

    fn on_high_score_changed(&mut self, score: u64) {
        log::info!("High score {}", score);
    }

    fn on_row_cleared(&mut self, row_id: u32) {
        log::info!("Row {} cleared", row_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl PresentationSink for Recorder {
        fn on_score_changed(&mut self, score: u64) {
            self.calls.push(format!("score {score}"));
        }
        fn on_lives_changed(&mut self, lives: u8) {
            self.calls.push(format!("lives {lives}"));
        }
        fn on_level_changed(&mut self, level: u32) {
            self.calls.push(format!("level {level}"));
        }
        fn on_game_over(&mut self) {
            self.calls.push("game over".into());
        }
        fn on_game_started(&mut self) {
            self.calls.push("started".into());
        }
        fn on_paddle_shrunk(&mut self, _left: Vec2, _right: Vec2) {
            self.calls.push("shrunk".into());
        }
        fn on_brick_weakened(&mut self, brick_id: u32, stage: u32) {
            self.calls.push(format!("weakened {brick_id} {stage}"));
        }
        fn on_brick_destroyed(&mut self, brick_id: u32, _pos: Vec2) {
            self.calls.push(format!("destroyed {brick_id}"));
        }
    }

    #[test]
    fn test_dispatch_preserves_order() {
        let events = [
            GameEvent::GameStarted,
            GameEvent::LivesChanged(3),
            GameEvent::LevelChanged(1),
            GameEvent::BrickWeakened { brick_id: 4, stage: 1 },
            GameEvent::RowCleared { row_id: 2 },
            GameEvent::BrickDestroyed { brick_id: 4, pos: Vec2::ZERO },
            GameEvent::ScoreChanged(7),
            GameEvent::GameOver,
        ];
        let mut sink = Recorder::default();
        dispatch(&events, &mut sink);
        assert_eq!(
            sink.calls,
            vec![
                "started",
                "lives 3",
                "level 1",
                "weakened 4 1",
                "destroyed 4",
                "score 7",
                "game over",
            ]
        );
    }

    #[test]
    fn test_log_sink_tracks_session() {
        let mut session = GameSession::new(Tuning::default(), None, 5);
        session.start_game();
        let mut sink = LogSink::default();
        dispatch(&session.drain_events(), &mut sink);
        assert_eq!(sink.lives, 3);
        assert_eq!(sink.level, 1);
        assert_eq!(sink.games_over, 0);
    }
}
