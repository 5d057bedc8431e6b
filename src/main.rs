//! Breakout headless entry point
//!
//! Runs the simulation at a fixed timestep with the autopilot at the paddle,
//! logging presentation events, then saves the high score.
//!
//! Environment:
//! - `BREAKOUT_TUNING`: path to a tuning JSON file (defaults otherwise)
//! - `BREAKOUT_SEED`: RNG seed
//! - `BREAKOUT_HIGHSCORE`: high score file path
//! - `BREAKOUT_GAMES`: number of games to play

use breakout::consts::SIM_DT;
use breakout::platform::{AutoPilot, InputSource, LogSink, dispatch};
use breakout::sim::{GamePhase, GameSession, tick};
use breakout::{FileHighScores, HighScoreStore, Tuning};

const DEFAULT_SEED: u64 = 0x5eed_b10c;
/// Ten simulated minutes per game
const MAX_TICKS_PER_GAME: u64 = 30_000;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}

fn load_tuning() -> Tuning {
    let Ok(path) = std::env::var("BREAKOUT_TUNING") else {
        return Tuning::default();
    };
    match Tuning::load(&path) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::warn!("Failed to load tuning from {}: {}, using defaults", path, e);
            Tuning::default()
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Breakout (headless) starting...");

    let tuning = load_tuning();
    let seed = env_parse("BREAKOUT_SEED").unwrap_or(DEFAULT_SEED);
    let games: u32 = env_parse("BREAKOUT_GAMES").unwrap_or(1);
    let highscore_path =
        std::env::var("BREAKOUT_HIGHSCORE").unwrap_or_else(|_| FileHighScores::FILE_NAME.to_string());

    let mut store = FileHighScores::open(&highscore_path);
    let mut session = GameSession::new(tuning, store.get_high_score(), seed);
    let mut pilot = AutoPilot::new();
    let mut sink = LogSink::default();
    dispatch(&session.drain_events(), &mut sink);

    for game in 1..=games {
        let started = if game == 1 {
            session.start_game()
        } else {
            session.play_again() || session.start_game()
        };
        if !started {
            log::warn!("Could not start game {}", game);
            break;
        }

        let mut ticks = 0u64;
        while session.phase() != GamePhase::GameOver && ticks < MAX_TICKS_PER_GAME {
            let input = pilot.poll(&session);
            tick(&mut session, &input, SIM_DT);
            dispatch(&session.drain_events(), &mut sink);
            ticks += 1;
        }
        if session.phase() != GamePhase::GameOver {
            log::info!("Game {} stopped after {} ticks (level {})", game, ticks, session.level());
        }

        // Let the play-again timer come due before the next game
        while game < games && !session.play_again_available() && session.phase() == GamePhase::GameOver {
            tick(&mut session, &Default::default(), SIM_DT);
            dispatch(&session.drain_events(), &mut sink);
        }

        log::info!(
            "Game {} finished: score {}, level {}, high score {}",
            game,
            session.score(),
            session.level(),
            session.high_score()
        );
    }

    session.save_high_score(&mut store);
    if let Err(e) = store.flush() {
        log::error!("Failed to save high score: {}", e);
    }
}
