use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use crate::session::SessionState;

/// Errors from the line channel wrapping the engine's pipes.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("failed to write to engine: {0}")]
    Write(#[source] std::io::Error),
    #[error("engine input is closed")]
    InputClosed,
    #[error("command must be a single line: {0:?}")]
    InvalidCommand(String),
    #[error("no engine output available")]
    WouldBlock,
    #[error("engine output closed")]
    Closed,
}

/// Errors surfaced by [`EngineSession`](crate::EngineSession).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to spawn engine {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write to engine: {0}")]
    Write(#[source] std::io::Error),
    #[error("engine exited unexpectedly{}", describe_status(.status))]
    EngineExited { status: Option<ExitStatus> },
    #[error("engine did not send {token:?} within {timeout:?}")]
    HandshakeTimeout { token: String, timeout: Duration },
    #[error("command must be a single line: {0:?}")]
    InvalidCommand(String),
    #[error("engine is not running (state: {0})")]
    NotRunning(SessionState),
    #[error("engine is already running")]
    AlreadyRunning,
    #[error("engine has no {0}")]
    MissingPipe(&'static str),
    #[error("no engine output available")]
    WouldBlock,
}

fn describe_status(status: &Option<ExitStatus>) -> String {
    match status {
        Some(status) => format!(" ({})", status),
        None => String::new(),
    }
}

impl From<ChannelError> for EngineError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Write(e) => EngineError::Write(e),
            ChannelError::InputClosed => EngineError::Write(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "engine input is closed",
            )),
            ChannelError::InvalidCommand(cmd) => EngineError::InvalidCommand(cmd),
            ChannelError::WouldBlock => EngineError::WouldBlock,
            ChannelError::Closed => EngineError::EngineExited { status: None },
        }
    }
}
