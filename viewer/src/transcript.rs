use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine_log::{EngineLog, LogEntry};

/// A saved copy of the engine log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub engine: Option<String>,
    pub fen: String,
    pub saved_at_unix: u64,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Failed to create directory {0}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error("Failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write transcript file {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),
}

impl Transcript {
    pub fn from_log(log: &EngineLog, engine: Option<&str>, fen: &str) -> Self {
        let saved_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            engine: engine.map(str::to_string),
            fen: fen.to_string(),
            saved_at_unix,
            entries: log.entries().cloned().collect(),
        }
    }
}

/// Write `transcript` as pretty JSON into `dir`, returning the file path.
pub fn save_transcript(transcript: &Transcript, dir: &Path) -> Result<PathBuf, TranscriptError> {
    std::fs::create_dir_all(dir).map_err(|e| TranscriptError::CreateDir(dir.to_path_buf(), e))?;

    let path = unique_path(dir, transcript.saved_at_unix);
    let json = serde_json::to_string_pretty(transcript)?;
    std::fs::write(&path, json).map_err(|e| TranscriptError::Write(path.clone(), e))?;

    tracing::info!("Saved engine transcript to {}", path.display());
    Ok(path)
}

fn unique_path(dir: &Path, stamp: u64) -> PathBuf {
    let mut path = dir.join(format!("transcript-{}.json", stamp));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("transcript-{}-{}.json", stamp, n));
        n += 1;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_log::Direction;
    use tempfile::TempDir;

    fn sample_log() -> EngineLog {
        let mut log = EngineLog::default();
        log.push(Direction::ToEngine, "uci");
        log.push(Direction::FromEngine, "id name Stub");
        log.push(Direction::FromEngine, "uciok");
        log
    }

    #[test]
    fn test_save_transcript_writes_json() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("transcripts");
        let transcript = Transcript::from_log(&sample_log(), Some("Stub"), board::STARTPOS_FEN);

        let path = save_transcript(&transcript, &dir).unwrap();
        assert!(path.starts_with(&dir));

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: Transcript = serde_json::from_str(&contents).unwrap();
        assert_eq!(loaded, transcript);
        assert!(contents.contains("\"to_engine\""));
        assert_eq!(loaded.entries.len(), 3);
    }

    #[test]
    fn test_repeated_saves_do_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let transcript = Transcript::from_log(&sample_log(), None, board::STARTPOS_FEN);

        let first = save_transcript(&transcript, temp_dir.path()).unwrap();
        let second = save_transcript(&transcript, temp_dir.path()).unwrap();
        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }
}
