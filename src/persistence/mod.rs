//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic writes (tmp → save)
//! - Missing file is not an error; corrupt or future-version files are

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope format version
pub const SAVE_VERSION: u32 = 1;

/// Errors reading or writing a save file
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("save file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Versioned wrapper around a saved payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub payload: T,
}

/// Load a payload; `Ok(None)` if the file does not exist
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let envelope: Envelope<T> = serde_json::from_str(&text)?;
    if envelope.version > SAVE_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: envelope.version,
            supported: SAVE_VERSION,
        });
    }
    Ok(Some(envelope.payload))
}

/// Save a payload, writing a temp file first and renaming it into place
pub fn save<T: Serialize>(path: &Path, payload: &T) -> Result<(), PersistError> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        payload,
    };
    let json = serde_json::to_string_pretty(&envelope)?;

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
