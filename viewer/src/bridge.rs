//! Glue between the UI loop and the engine session.
//!
//! The UI calls [`UiBridge::on_user_action`] from its input handlers and
//! [`UiBridge::on_tick`] once per loop iteration. Neither waits for an
//! engine response: actions only write a line, ticks only read what is
//! already buffered.

use std::time::Duration;

use board::{Square, STARTPOS_FEN};
use engine::uci::{format_uci_move, parse_uci_message};
use engine::{
    EngineError, EngineInfo, EngineSession, PollState, SessionState, ShutdownOutcome, UciMessage,
    HANDSHAKE_TOKEN,
};

use crate::config::EngineLaunch;
use crate::engine_log::{Direction, EngineLog};

/// Most engine lines one tick consumes; the rest wait for later ticks.
pub const DEFAULT_MAX_LINES_PER_TICK: usize = 256;

/// Something the user asked the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Uci,
    IsReady,
    NewGame,
    SetPosition { fen: String },
    Go { movetime_ms: Option<u64> },
    Stop,
    Quit,
    Raw(String),
}

impl UserAction {
    /// The single protocol line this action sends.
    pub fn to_command(&self) -> String {
        match self {
            UserAction::Uci => "uci".to_string(),
            UserAction::IsReady => "isready".to_string(),
            UserAction::NewGame => "ucinewgame".to_string(),
            UserAction::SetPosition { fen } => {
                if fen == STARTPOS_FEN || fen == "startpos" {
                    "position startpos".to_string()
                } else {
                    format!("position fen {}", fen)
                }
            }
            UserAction::Go { movetime_ms: Some(ms) } => format!("go movetime {}", ms),
            UserAction::Go { movetime_ms: None } => "go".to_string(),
            UserAction::Stop => "stop".to_string(),
            UserAction::Quit => "quit".to_string(),
            UserAction::Raw(line) => line.clone(),
        }
    }
}

/// What the engine has told us that the board and panels display.
#[derive(Debug, Clone, Default)]
pub struct EngineAnnotations {
    pub engine_name: Option<String>,
    pub best_move: Option<(Square, Square)>,
    pub info: Option<EngineInfo>,
    pub status: Option<String>,
}

pub struct UiBridge<'s> {
    session: &'s mut EngineSession,
    log: EngineLog,
    annotations: EngineAnnotations,
    engine_available: bool,
    max_lines_per_tick: usize,
}

impl<'s> UiBridge<'s> {
    pub fn new(session: &'s mut EngineSession) -> Self {
        let engine_available = session.state() == SessionState::Ready;
        Self {
            session,
            log: EngineLog::default(),
            annotations: EngineAnnotations::default(),
            engine_available,
            max_lines_per_tick: DEFAULT_MAX_LINES_PER_TICK,
        }
    }

    /// Cap the lines a single [`on_tick`](Self::on_tick) consumes.
    pub fn with_max_lines_per_tick(mut self, max_lines: usize) -> Self {
        self.max_lines_per_tick = max_lines.max(1);
        self
    }

    pub fn log(&self) -> &EngineLog {
        &self.log
    }

    pub fn annotations(&self) -> &EngineAnnotations {
        &self.annotations
    }

    /// Whether engine-dependent actions are enabled.
    pub fn engine_available(&self) -> bool {
        self.engine_available
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Record a viewer-side message in the log and status line.
    pub fn notice(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.annotations.status = Some(message.clone());
        self.log.push(Direction::Notice, message);
    }

    /// Spawn the engine and complete the `uci` handshake.
    ///
    /// Runs before the UI is interactive, or on an explicit retry. Failures
    /// are logged and leave engine actions disabled.
    pub async fn connect(
        &mut self,
        launch: &EngineLaunch,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        self.engine_available = false;
        self.annotations = EngineAnnotations::default();
        self.notice(format!("Starting engine {}", launch.path.display()));

        let result = self.start_and_handshake(launch, timeout).await;
        match &result {
            Ok(()) => {
                self.engine_available = true;
                let name = self
                    .annotations
                    .engine_name
                    .clone()
                    .unwrap_or_else(|| "engine".to_string());
                self.notice(format!("Connected to {}", name));
            }
            Err(e) => self.fail(e),
        }
        result
    }

    async fn start_and_handshake(
        &mut self,
        launch: &EngineLaunch,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        self.session
            .start_with_args(&launch.path, &launch.args)
            .await?;
        self.send_logged("uci").await?;
        self.session.await_handshake(HANDSHAKE_TOKEN, timeout).await?;
        // Surface the identification lines read during the handshake.
        self.on_tick().await;
        Ok(())
    }

    /// Forward a user action as zero or one command.
    ///
    /// Returns the command line that was written, if any. The engine's
    /// answer arrives through later ticks.
    pub async fn on_user_action(&mut self, action: UserAction) -> Option<String> {
        let command = action.to_command();
        if !self.engine_available {
            self.notice(format!(
                "Engine unavailable ({}), not sent: {}",
                self.session.state(),
                command
            ));
            return None;
        }

        if matches!(action, UserAction::Go { .. }) {
            self.annotations.best_move = None;
            self.annotations.info = None;
        }

        match self.send_logged(&command).await {
            Ok(()) => Some(command),
            Err(e) => {
                self.fail(&e);
                None
            }
        }
    }

    /// Drain what the engine has written since the last tick.
    ///
    /// Never waits on the pipe and consumes at most the per-tick cap; later
    /// ticks pick up the rest. Returns the number of lines consumed.
    pub async fn on_tick(&mut self) -> usize {
        if self.session.state() == SessionState::Unstarted {
            return 0;
        }

        let mut drained = 0;
        match self.session.poll_readable(Duration::ZERO).await {
            PollState::Readable => {
                while drained < self.max_lines_per_tick {
                    let Ok(line) = self.session.read_line() else {
                        break;
                    };
                    self.record_line(line);
                    drained += 1;
                }
            }
            PollState::Pending => {}
            PollState::Closed => {
                if self.engine_available {
                    self.engine_available = false;
                    let status = self
                        .session
                        .exit_status()
                        .map(|s| format!(" ({})", s))
                        .unwrap_or_default();
                    self.notice(format!("Engine exited{}", status));
                }
            }
        }
        drained
    }

    /// Stop the engine, waiting up to `grace` before it is killed.
    pub async fn shutdown(&mut self, grace: Duration) -> ShutdownOutcome {
        self.engine_available = false;
        if self.session.state().accepts_commands() {
            self.log.push(Direction::ToEngine, "quit");
        }

        let outcome = self.session.shutdown(grace).await;
        match outcome {
            ShutdownOutcome::NotRunning => {}
            ShutdownOutcome::Exited(status) => self.notice(format!("Engine stopped ({})", status)),
            ShutdownOutcome::Killed => self.notice("Engine did not quit in time and was killed"),
        }
        outcome
    }

    async fn send_logged(&mut self, command: &str) -> Result<(), EngineError> {
        self.session.send_command(command).await?;
        self.log.push(Direction::ToEngine, command.trim_end());
        Ok(())
    }

    fn fail(&mut self, err: &EngineError) {
        tracing::warn!("Engine link error: {}", err);
        if !self.session.state().accepts_commands() {
            self.engine_available = false;
        }
        self.notice(format!("Engine error: {}", err));
    }

    fn record_line(&mut self, line: String) {
        match parse_uci_message(&line) {
            Ok(UciMessage::Id { name, value }) if name == "name" => {
                self.annotations.engine_name = Some(value);
            }
            Ok(UciMessage::UciOk) => {
                self.annotations.status = Some("Engine identified (uciok)".to_string());
            }
            Ok(UciMessage::ReadyOk) => {
                self.annotations.status = Some("Engine ready (readyok)".to_string());
            }
            Ok(UciMessage::BestMove { mv: Some(mv), .. }) => {
                self.annotations.best_move = Some((mv.from.into(), mv.to.into()));
                self.annotations.status = Some(format!("Best move: {}", format_uci_move(&mv)));
            }
            Ok(UciMessage::BestMove { mv: None, .. }) => {
                self.annotations.best_move = None;
                self.annotations.status = Some("Engine has no move".to_string());
            }
            Ok(UciMessage::Info(info)) => {
                if info.depth.is_some() || info.score.is_some() {
                    self.annotations.info = Some(info);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::trace!("Uninterpreted engine line: {}", e),
        }
        self.log.push(Direction::FromEngine, line);
    }
}
