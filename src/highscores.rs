//! High score persistence
//!
//! The game keeps a single best score across runs. The session reads it at
//! startup and hands it back on exit; the store decides where it lives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError};

/// Persistent home of the high score
pub trait HighScoreStore {
    fn get_high_score(&self) -> Option<u64>;
    fn set_high_score(&mut self, score: u64);
    /// Write pending changes out
    fn flush(&mut self) -> Result<(), PersistError>;
}

/// In-process store (tests, runs without a save file)
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScores {
    score: Option<u64>,
}

impl MemoryHighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u64) -> Self {
        Self { score: Some(score) }
    }
}

impl HighScoreStore for MemoryHighScores {
    fn get_high_score(&self) -> Option<u64> {
        self.score
    }

    fn set_high_score(&mut self, score: u64) {
        self.score = Some(score);
    }

    fn flush(&mut self) -> Result<(), PersistError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u64,
}

/// High score kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileHighScores {
    path: PathBuf,
    score: Option<u64>,
    dirty: bool,
}

impl FileHighScores {
    /// Default file name next to the working directory
    pub const FILE_NAME: &'static str = "breakout_highscore.json";

    /// Open the store, reading any saved score
    ///
    /// A corrupt file is logged and treated as empty; it is replaced on the
    /// next flush.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let score = match persistence::load::<HighScoreRecord>(&path) {
            Ok(Some(record)) => {
                log::info!("Loaded high score {}", record.high_score);
                Some(record.high_score)
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                None
            }
            Err(e) => {
                log::warn!("Ignoring unreadable high score file {}: {}", path.display(), e);
                None
            }
        };
        Self {
            path,
            score,
            dirty: false,
        }
    }
}

impl HighScoreStore for FileHighScores {
    fn get_high_score(&self) -> Option<u64> {
        self.score
    }

    fn set_high_score(&mut self, score: u64) {
        if self.score != Some(score) {
            self.score = Some(score);
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> Result<(), PersistError> {
        let Some(high_score) = self.score else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        persistence::save(&self.path, &HighScoreRecord { high_score })?;
        self.dirty = false;
        log::info!("High score {} saved to {}", high_score, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameSession;
    use crate::tuning::Tuning;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("breakout_hs_{}_{name}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryHighScores::new();
        assert_eq!(store.get_high_score(), None);
        store.set_high_score(1200);
        assert_eq!(store.get_high_score(), Some(1200));
        assert!(store.flush().is_ok());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = temp_path("reopen.json");
        let mut store = FileHighScores::open(&path);
        assert_eq!(store.get_high_score(), None);
        store.set_high_score(4321);
        store.flush().unwrap();

        let reopened = FileHighScores::open(&path);
        assert_eq!(reopened.get_high_score(), Some(4321));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, "garbage").unwrap();
        let store = FileHighScores::open(&path);
        assert_eq!(store.get_high_score(), None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_session_round_trip_through_store() {
        let store = MemoryHighScores::with_score(700);
        let session = GameSession::new(Tuning::default(), store.get_high_score(), 1);
        assert_eq!(session.high_score(), 700);

        let mut out = MemoryHighScores::new();
        session.save_high_score(&mut out);
        assert_eq!(out.get_high_score(), Some(700));
    }
}
