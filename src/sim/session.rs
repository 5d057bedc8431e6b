//! The game session: score, lives, levels and the game state machine
//!
//! The session owns the paddle, the ball in the field, the rows of the
//! current level and the shared ball speed. Entities report upward by return
//! value; the session turns those reports into bookkeeping and events.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallSpeed};
use super::brick::{BrickRow, HitOutcome, RowStatus};
use super::events::GameEvent;
use super::paddle::{Paddle, PaddleSize};
use super::timer::{Scheduler, TimerAction};
use crate::highscores::HighScoreStore;
use crate::secs_to_ticks;
use crate::tuning::{LevelCatalog, Tuning};

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first game; the wall is on display
    Idle,
    /// Active gameplay
    Playing,
    /// Level cleared, next wall is announced and not built yet
    LevelTransition,
    /// All lives lost; bricks are dropping
    GameOver,
}

/// Top-level orchestrator for one process run
pub struct GameSession {
    pub(crate) tuning: Tuning,
    catalog: Box<dyn LevelCatalog>,
    pub(crate) rng: Pcg32,
    pub(crate) phase: GamePhase,
    /// Bumped on every new game; timers from older games are ignored
    pub(crate) generation: u32,
    pub(crate) score: u64,
    pub(crate) displayed_score: u64,
    pub(crate) high_score: u64,
    pub(crate) lives: u8,
    pub(crate) level: u32,
    pub(crate) active_row_count: u32,
    pub(crate) is_in_play: bool,
    pub(crate) play_again_available: bool,
    pub(crate) ball_speed: BallSpeed,
    pub(crate) paddle: Paddle,
    /// Launched ball, owned by the field
    pub(crate) ball: Option<Ball>,
    /// Rows of the current level, top row first
    pub(crate) rows: Vec<BrickRow>,
    pub(crate) scheduler: Scheduler,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) time_ticks: u64,
    next_id: u32,
}

impl GameSession {
    /// Create a session whose level catalog is the tuning's own rows
    pub fn new(tuning: Tuning, high_score: Option<u64>, seed: u64) -> Self {
        let catalog = Box::new(tuning.clone());
        Self::with_catalog(tuning, catalog, high_score, seed)
    }

    /// Create a session with an explicit level catalog
    ///
    /// The session starts `Idle` with level 1 built for display.
    pub fn with_catalog(
        tuning: Tuning,
        catalog: Box<dyn LevelCatalog>,
        high_score: Option<u64>,
        seed: u64,
    ) -> Self {
        let paddle = Paddle::new(&tuning);
        let ball_speed = BallSpeed::new(tuning.ball_init_speed);
        let mut session = Self {
            tuning,
            catalog,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            generation: 0,
            score: 0,
            displayed_score: 0,
            high_score: high_score.unwrap_or(0),
            lives: 0,
            level: 0,
            active_row_count: 0,
            is_in_play: false,
            play_again_available: false,
            ball_speed,
            paddle,
            ball: None,
            rows: Vec::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            time_ticks: 0,
            next_id: 1,
        };
        session.events.push(GameEvent::HighScoreChanged(session.high_score));
        session.build_level(1);
        session
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Queries ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn displayed_score(&self) -> u64 {
        self.displayed_score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn active_row_count(&self) -> u32 {
        self.active_row_count
    }

    pub fn is_in_play(&self) -> bool {
        self.is_in_play
    }

    pub fn play_again_available(&self) -> bool {
        self.play_again_available
    }

    pub fn ball_speed(&self) -> f32 {
        self.ball_speed.get()
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    /// The launched ball, if one is in the field
    pub fn ball(&self) -> Option<&Ball> {
        self.ball.as_ref()
    }

    /// The ball waiting on the paddle, if any
    pub fn attached_ball(&self) -> Option<&Ball> {
        self.paddle.attached.as_ref()
    }

    pub fn rows(&self) -> &[BrickRow] {
        &self.rows
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Game lifecycle ===

    /// Start a new game from `Idle` or `GameOver`
    ///
    /// Returns false (and does nothing) while a game is running.
    pub fn start_game(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Idle | GamePhase::GameOver) {
            log::debug!("start_game ignored in {:?}", self.phase);
            return false;
        }
        self.generation += 1;
        log::info!("Starting game (generation {})", self.generation);

        self.score = 0;
        self.lives = self.tuning.lives_per_game;
        self.ball_speed.reset(self.tuning.ball_init_speed);
        self.is_in_play = true;
        self.play_again_available = false;
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::GameStarted);
        self.events.push(GameEvent::LivesChanged(self.lives));

        self.paddle.set_size(PaddleSize::Default);
        self.ball = None;
        let id = self.next_entity_id();
        self.paddle.attach_new_ball(id);

        self.build_level(1);
        true
    }

    /// "Play again" after a game over, skipping the instructions
    pub fn play_again(&mut self) -> bool {
        if !self.play_again_available {
            return false;
        }
        let started = self.start_game();
        if started {
            self.clear_messages();
        }
        started
    }

    /// Hide waiting messages (first launch of a game)
    pub fn clear_messages(&mut self) {
        self.events.push(GameEvent::MessagesCleared);
    }

    /// Launch the ball waiting on the paddle
    pub fn launch_ball(&mut self) -> bool {
        let Some(mut ball) = self.paddle.release_ball() else {
            return false;
        };
        if !ball.launch(self.ball_speed, &mut self.rng) {
            self.paddle.attached = Some(ball);
            return false;
        }
        log::debug!("Ball {} launched at {:?}", ball.id, ball.vel);
        self.events.push(GameEvent::BallLaunched { ball_id: ball.id });
        self.ball = Some(ball);
        self.clear_messages();
        true
    }

    /// Set the level and build its wall, immediately for level 1 and after
    /// the announcement delay otherwise
    pub fn build_level(&mut self, level: u32) {
        self.level = level;
        self.events.push(GameEvent::LevelChanged(level));

        if level <= 1 {
            self.build_bricks(level);
            return;
        }

        log::info!("Level {} announced", level);
        self.events.push(GameEvent::LevelAnnounced(level));
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::LevelTransition;
        }
        let ticks = secs_to_ticks(self.tuning.level_announce_delay_secs);
        self.scheduler
            .schedule(ticks, self.generation, TimerAction::BuildLevel(level));
    }

    /// Replace the wall with the rows for `level`
    fn build_bricks(&mut self, level: u32) {
        self.rows.clear();

        // Don't build bricks on top of a ball in flight
        if let Some(ball) = self.ball.take() {
            if self.paddle.attached.is_none() {
                self.paddle.reattach(ball);
            }
        }

        let templates = self.catalog.rows_for_level(level);
        let field_width = self.tuning.field_width;
        let mut top = self.tuning.wall_top;
        for template in &templates {
            if template.brick_count == 0 {
                log::warn!("Skipping row template with no bricks: {:?}", template);
                continue;
            }
            let row_id = self.next_entity_id();
            let mut next_id = self.next_id;
            let row = BrickRow::build(row_id, template, field_width, top, || {
                let id = next_id;
                next_id += 1;
                id
            });
            self.next_id = next_id;
            top -= template.row_height;
            self.rows.push(row);
        }
        self.active_row_count = self.rows.len() as u32;

        if self.phase == GamePhase::LevelTransition {
            self.phase = GamePhase::Playing;
        }
        log::info!(
            "Built level {}: {} rows, ball speed {:.1}",
            level,
            self.active_row_count,
            self.ball_speed.get()
        );

        // An empty wall can never be cleared; move on
        if self.active_row_count == 0 {
            log::warn!("Level {} has no rows", level);
            if self.is_in_play {
                self.build_level(level + 1);
            }
        }
    }

    /// A row has been cleared; advance the level once the wall is gone
    pub fn on_row_cleared(&mut self, row_id: u32) {
        self.events.push(GameEvent::RowCleared { row_id });
        if self.active_row_count == 0 {
            log::warn!("Row {} cleared with no active rows", row_id);
            return;
        }
        self.active_row_count -= 1;

        // Rows emptied by the game-over drop never level up
        if self.active_row_count == 0 && self.is_in_play {
            self.build_level(self.level + 1);
        }
    }

    /// The ball in the field has been lost
    pub fn on_ball_lost(&mut self, ball_id: u32) {
        self.events.push(GameEvent::BallLost { ball_id });
        if self.lives == 0 {
            log::debug!("Ball {} lost with no lives left", ball_id);
            return;
        }
        self.lives -= 1;
        self.events.push(GameEvent::LivesChanged(self.lives));

        if self.lives == 0 {
            self.enter_game_over();
        } else {
            let id = self.next_entity_id();
            self.paddle.attach_new_ball(id);
        }
    }

    fn enter_game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        log::info!(
            "Game over: score {}, level {}, high score {}",
            self.score,
            self.level,
            self.high_score
        );
        self.phase = GamePhase::GameOver;
        self.is_in_play = false;
        self.events.push(GameEvent::GameOver);

        for row in &mut self.rows {
            row.drop_all(&mut self.rng);
        }

        let ticks = secs_to_ticks(self.tuning.play_again_delay_secs);
        self.scheduler
            .schedule(ticks, self.generation, TimerAction::ShowPlayAgain);
    }

    /// The ball touched the top wall
    pub fn on_top_wall_hit(&mut self) {
        if let Some(cue) = self.paddle.shrink() {
            self.events.push(GameEvent::PaddleShrunk {
                left: cue.left,
                right: cue.right,
            });
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
            self.events.push(GameEvent::HighScoreChanged(self.high_score));
        }
    }

    /// Move the displayed score one step toward the real score
    pub fn animate_score(&mut self) {
        if self.score < self.displayed_score {
            self.displayed_score = self.score;
        } else if self.score > self.displayed_score {
            self.displayed_score += 1;
        } else {
            return;
        }
        self.events
            .push(GameEvent::ScoreChanged(self.displayed_score));
    }

    /// Ball hit a brick: weaken or destroy it and settle the row
    pub fn hit_brick(&mut self, row_id: u32, brick_id: u32) {
        let Some(index) = self.rows.iter().position(|r| r.id == row_id) else {
            return;
        };
        let pos = self.rows[index]
            .bricks
            .iter()
            .find(|b| b.id == brick_id)
            .map(|b| b.center)
            .unwrap_or(Vec2::ZERO);
        let Some(hit) = self.rows[index].hit_brick(brick_id, &mut self.ball_speed) else {
            return;
        };

        match hit.outcome {
            HitOutcome::Ignored => {}
            HitOutcome::Weakened { stage } => {
                self.events
                    .push(GameEvent::BrickWeakened { brick_id, stage });
            }
            HitOutcome::Destroyed { points } => {
                self.events
                    .push(GameEvent::BrickDestroyed { brick_id, pos });
                self.add_score(points);
            }
        }

        if hit.status == RowStatus::Cleared {
            self.rows.remove(index);
            self.on_row_cleared(row_id);
        }
    }

    /// A dropped brick fell out of the field
    pub fn brick_fell(&mut self, row_id: u32, brick_id: u32) {
        let Some(index) = self.rows.iter().position(|r| r.id == row_id) else {
            return;
        };
        let status = self.rows[index].on_child_destroyed(brick_id, &mut self.ball_speed);
        if status == RowStatus::Unchanged {
            return;
        }
        self.events.push(GameEvent::BrickFell { brick_id });
        if status == RowStatus::Cleared {
            self.rows.remove(index);
            self.on_row_cleared(row_id);
        }
    }

    /// Run a due timer action
    pub(crate) fn fire_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::BuildLevel(level) => {
                if self.phase == GamePhase::LevelTransition && level == self.level {
                    self.build_bricks(level);
                } else {
                    log::debug!("Level {} build skipped in {:?}", level, self.phase);
                }
            }
            TimerAction::ShowPlayAgain => {
                if self.phase == GamePhase::GameOver {
                    self.play_again_available = true;
                    self.events.push(GameEvent::PlayAgainAvailable);
                }
            }
        }
    }

    /// Hand the high score to the persistent store
    pub fn save_high_score(&self, store: &mut dyn HighScoreStore) {
        store.set_high_score(self.high_score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{FixedCatalog, RowTemplate};

    fn small_session() -> GameSession {
        let tuning = Tuning {
            rows: vec![
                RowTemplate::new(2, 1, 100, 1.0, 4.0),
                RowTemplate::new(3, 2, 10, 1.0, 2.0),
            ],
            ..Default::default()
        };
        GameSession::new(tuning, None, 42)
    }

    fn lose_ball(session: &mut GameSession) {
        session.launch_ball();
        let id = session.ball.take().map(|b| b.id).unwrap_or(0);
        session.on_ball_lost(id);
    }

    fn clear_all_rows(session: &mut GameSession) {
        let targets: Vec<(u32, u32, u32)> = session
            .rows
            .iter()
            .flat_map(|r| r.bricks.iter().map(move |b| (r.id, b.id, b.remaining_hits)))
            .collect();
        for (row_id, brick_id, hits) in targets {
            for _ in 0..hits {
                session.hit_brick(row_id, brick_id);
            }
        }
    }

    #[test]
    fn test_new_session_is_idle_with_wall() {
        let session = small_session();
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.active_row_count(), 2);
        assert_eq!(session.rows().len(), 2);
        assert!(!session.is_in_play());
        assert!(session.attached_ball().is_none());
    }

    #[test]
    fn test_start_game_resets_state() {
        let mut session = small_session();
        assert!(session.start_game());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.level(), 1);
        assert_eq!(session.ball_speed(), 16.0);
        assert!(session.is_in_play());
        assert!(session.attached_ball().is_some());
        // Not valid while playing
        assert!(!session.start_game());
    }

    #[test]
    fn test_rows_stack_by_height() {
        let session = small_session();
        let top_row = &session.rows()[0];
        let second = &session.rows()[1];
        assert!((top_row.bricks[0].center.y - 9.5).abs() < 1e-5);
        assert!((second.bricks[0].center.y - 8.5).abs() < 1e-5);
    }

    #[test]
    fn test_lives_scenario_ends_in_game_over() {
        let mut session = small_session();
        session.start_game();
        session.drain_events();

        let mut phases = Vec::new();
        for _ in 0..3 {
            lose_ball(&mut session);
            phases.push(session.phase());
        }
        assert_eq!(
            phases,
            vec![GamePhase::Playing, GamePhase::Playing, GamePhase::GameOver]
        );

        let lives: Vec<u8> = session
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::LivesChanged(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(lives, vec![2, 1, 0]);
        assert!(!session.is_in_play());
    }

    #[test]
    fn test_game_over_entered_once() {
        let mut session = small_session();
        session.start_game();
        for _ in 0..3 {
            lose_ball(&mut session);
        }
        // A stray loss report after game over changes nothing
        session.on_ball_lost(999);
        let overs = session
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::GameOver)
            .count();
        assert_eq!(overs, 1);
        assert_eq!(session.lives(), 0);
    }

    #[test]
    fn test_brick_destruction_awards_points() {
        let mut session = small_session();
        session.start_game();
        let row = &session.rows()[1];
        let (row_id, brick_id) = (row.id, row.bricks[0].id);

        session.hit_brick(row_id, brick_id);
        assert_eq!(session.score(), 0);
        session.hit_brick(row_id, brick_id);
        assert_eq!(session.score(), 10);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::BrickWeakened { brick_id, stage: 1 }));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::BrickDestroyed { brick_id: id, .. } if *id == brick_id)));
    }

    #[test]
    fn test_clearing_wall_schedules_one_level_build() {
        let mut session = small_session();
        session.start_game();
        clear_all_rows(&mut session);

        assert_eq!(session.active_row_count(), 0);
        assert_eq!(session.level(), 2);
        assert_eq!(session.phase(), GamePhase::LevelTransition);
        assert_eq!(session.ball_speed(), 16.0 + 4.0 + 2.0);
        assert_eq!(session.scheduler.pending(), 1);

        let announced = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelAnnounced(2)))
            .count();
        assert_eq!(announced, 1);
    }

    #[test]
    fn test_level_build_fires_after_delay() {
        let mut session = small_session();
        session.start_game();
        clear_all_rows(&mut session);
        assert!(session.rows().is_empty());

        let ticks = secs_to_ticks(session.tuning.level_announce_delay_secs);
        for _ in 0..ticks {
            for action in session.scheduler.advance(session.generation) {
                session.fire_timer(action);
            }
        }
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.active_row_count(), 2);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn test_free_ball_reattached_on_rebuild() {
        let mut session = small_session();
        session.start_game();
        session.launch_ball();
        assert!(session.ball().is_some());
        session.build_bricks(1);
        assert!(session.ball().is_none());
        let ball = session.attached_ball().unwrap();
        assert!(!ball.in_play());
    }

    #[test]
    fn test_game_over_drop_does_not_level_up() {
        let mut session = small_session();
        session.start_game();
        for _ in 0..3 {
            lose_ball(&mut session);
        }
        let fallen: Vec<(u32, u32)> = session
            .rows
            .iter()
            .flat_map(|r| r.bricks.iter().map(move |b| (r.id, b.id)))
            .collect();
        for (row_id, brick_id) in fallen {
            session.brick_fell(row_id, brick_id);
        }
        assert_eq!(session.active_row_count(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.scheduler.pending(), 1); // only play-again
    }

    #[test]
    fn test_high_score_survives_reset() {
        let tuning = Tuning {
            rows: vec![RowTemplate::new(1, 1, 1200, 1.0, 0.0), RowTemplate::new(1, 1, 1, 1.0, 0.0)],
            ..Default::default()
        };
        let mut session = GameSession::new(tuning, Some(0), 1);
        session.start_game();
        let row = &session.rows()[0];
        let (row_id, brick_id) = (row.id, row.bricks[0].id);
        session.hit_brick(row_id, brick_id);
        assert_eq!(session.score(), 1200);
        assert_eq!(session.high_score(), 1200);

        for _ in 0..3 {
            lose_ball(&mut session);
        }
        session.fire_timer(TimerAction::ShowPlayAgain);
        assert!(session.play_again());
        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score(), 1200);
    }

    #[test]
    fn test_displayed_score_animation() {
        let mut session = small_session();
        session.start_game();
        session.add_score(3);
        session.animate_score();
        assert_eq!(session.displayed_score(), 1);
        session.animate_score();
        session.animate_score();
        assert_eq!(session.displayed_score(), 3);
        session.animate_score();
        assert_eq!(session.displayed_score(), 3);

        // Reset snaps down at once
        session.score = 0;
        session.animate_score();
        assert_eq!(session.displayed_score(), 0);
    }

    #[test]
    fn test_second_shrink_is_silent() {
        let mut session = small_session();
        session.start_game();
        session.on_top_wall_hit();
        session.on_top_wall_hit();
        let shrinks = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::PaddleShrunk { .. }))
            .count();
        assert_eq!(shrinks, 1);
        assert_eq!(session.paddle().size, PaddleSize::Shrunk);

        // New game restores the default size
        for _ in 0..3 {
            lose_ball(&mut session);
        }
        session.start_game();
        assert_eq!(session.paddle().size, PaddleSize::Default);
    }

    #[test]
    fn test_play_again_needs_delay() {
        let mut session = small_session();
        session.start_game();
        for _ in 0..3 {
            lose_ball(&mut session);
        }
        assert!(!session.play_again());
        let ticks = secs_to_ticks(session.tuning.play_again_delay_secs);
        for _ in 0..ticks {
            for action in session.scheduler.advance(session.generation) {
                session.fire_timer(action);
            }
        }
        assert!(session.play_again_available());
        assert!(session.play_again());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(session.drain_events().contains(&GameEvent::MessagesCleared));
    }

    #[test]
    fn test_empty_level_moves_on() {
        let catalog = FixedCatalog::new(Vec::new());
        let mut session = GameSession::with_catalog(Tuning::default(), Box::new(catalog), None, 9);
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.level(), 1);
        assert_eq!(session.scheduler.pending(), 0);

        session.start_game();
        assert_eq!(session.level(), 2);
        assert_eq!(session.phase(), GamePhase::LevelTransition);

        let ticks = secs_to_ticks(session.tuning.level_announce_delay_secs);
        for _ in 0..ticks {
            for action in session.scheduler.advance(session.generation) {
                session.fire_timer(action);
            }
        }
        assert_eq!(session.level(), 3);
        assert_eq!(session.phase(), GamePhase::LevelTransition);
    }

    #[test]
    fn test_empty_templates_are_skipped() {
        let catalog = FixedCatalog::new(vec![
            RowTemplate::new(0, 1, 1, 1.0, 1.0),
            RowTemplate::new(4, 1, 1, 1.0, 1.0),
        ]);
        let session = GameSession::with_catalog(Tuning::default(), Box::new(catalog), None, 9);
        assert_eq!(session.active_row_count(), 1);
    }
}
