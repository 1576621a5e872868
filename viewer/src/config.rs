//! Runtime configuration for the viewer.
//!
//! Every tunable has a compile-time default that can be overridden by an
//! environment variable. Command-line flags (see `main.rs`) take precedence
//! over both.

use std::path::PathBuf;
use std::time::Duration;

/// Default engine executable, relative to the working directory.
const DEFAULT_ENGINE_PATH: &str = "./engine";

/// Default bound on the startup handshake (in milliseconds).
const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 5000;

/// Default interval between handshake polls (in milliseconds).
const DEFAULT_HANDSHAKE_POLL_INTERVAL_MS: u64 = 100;

/// Default time the engine gets to exit after `quit` (in milliseconds).
const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5000;

/// Default UI tick interval (in milliseconds).
const DEFAULT_TICK_MS: u64 = 50;

/// Default `go movetime` in milliseconds. Zero sends a bare `go`.
const DEFAULT_GO_MOVETIME_MS: u64 = 1000;

/// Default directory for rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// How to launch the engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLaunch {
    pub path: PathBuf,
    pub args: Vec<String>,
}

/// Resolved viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// `None` runs the viewer without an engine.
    pub engine: Option<EngineLaunch>,
    pub fen: String,
    pub handshake_timeout: Duration,
    pub handshake_poll_interval: Duration,
    pub shutdown_grace: Duration,
    pub tick: Duration,
    pub go_movetime_ms: Option<u64>,
    pub log_dir: PathBuf,
    pub transcript_dir: PathBuf,
}

impl Default for ViewerConfig {
    /// Defaults with environment overrides applied.
    fn default() -> Self {
        Self {
            engine: Some(EngineLaunch {
                path: get_engine_path(),
                args: Vec::new(),
            }),
            fen: board::STARTPOS_FEN.to_string(),
            handshake_timeout: Duration::from_millis(get_handshake_timeout_ms()),
            handshake_poll_interval: Duration::from_millis(DEFAULT_HANDSHAKE_POLL_INTERVAL_MS),
            shutdown_grace: Duration::from_millis(get_shutdown_grace_ms()),
            tick: Duration::from_millis(get_tick_ms()),
            go_movetime_ms: movetime_from_ms(get_go_movetime_ms()),
            log_dir: get_log_dir(),
            transcript_dir: get_transcript_dir(),
        }
    }
}

/// Zero means "no movetime".
pub fn movetime_from_ms(ms: u64) -> Option<u64> {
    (ms > 0).then_some(ms)
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", name, value);
            default
        }),
        Err(_) => default,
    }
}

/// Get the engine executable path.
///
/// Priority:
/// 1. `LOTR_ENGINE_PATH` env variable if set
/// 2. `./engine` as fallback
pub fn get_engine_path() -> PathBuf {
    if let Ok(path) = std::env::var("LOTR_ENGINE_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_ENGINE_PATH)
}

/// Get the handshake timeout in milliseconds (`LOTR_HANDSHAKE_TIMEOUT_MS`).
pub fn get_handshake_timeout_ms() -> u64 {
    env_u64("LOTR_HANDSHAKE_TIMEOUT_MS", DEFAULT_HANDSHAKE_TIMEOUT_MS)
}

/// Get the shutdown grace period in milliseconds (`LOTR_SHUTDOWN_GRACE_MS`).
pub fn get_shutdown_grace_ms() -> u64 {
    env_u64("LOTR_SHUTDOWN_GRACE_MS", DEFAULT_SHUTDOWN_GRACE_MS)
}

/// Get the UI tick interval in milliseconds (`LOTR_TICK_MS`).
///
/// A zero tick would spin the loop, so it is raised to 1 ms.
pub fn get_tick_ms() -> u64 {
    env_u64("LOTR_TICK_MS", DEFAULT_TICK_MS).max(1)
}

/// Get the `go movetime` in milliseconds (`LOTR_GO_MOVETIME_MS`).
pub fn get_go_movetime_ms() -> u64 {
    env_u64("LOTR_GO_MOVETIME_MS", DEFAULT_GO_MOVETIME_MS)
}

/// Get the log directory.
///
/// Priority:
/// 1. `LOTR_LOG_DIR` env variable if set
/// 2. `logs` as fallback
pub fn get_log_dir() -> PathBuf {
    if let Ok(path) = std::env::var("LOTR_LOG_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}

/// Get the directory transcripts are written to: `~/.lotr-chess/transcripts`.
pub fn get_transcript_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lotr-chess")
        .join("transcripts")
}
