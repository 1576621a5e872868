//! Engine subprocess lifecycle: spawn, handshake, command dispatch, shutdown.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, ChildStdin, Command};
use tokio::time::Instant;

use crate::channel::{LineChannel, PollState};
use crate::error::{ChannelError, EngineError};

/// Default interval between handshake polls.
pub const DEFAULT_HANDSHAKE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default bound on a single command write, for engines that stop reading.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifecycle of an [`EngineSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    Starting,
    HandshakeWait,
    Ready,
    ShuttingDown,
    Terminated,
}

impl SessionState {
    /// Whether commands may be written in this state.
    pub fn accepts_commands(self) -> bool {
        matches!(self, Self::HandshakeWait | Self::Ready)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unstarted => "unstarted",
            Self::Starting => "starting",
            Self::HandshakeWait => "waiting for handshake",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting down",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// How the engine process ended after [`EngineSession::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// There was no process to stop.
    NotRunning,
    /// The process exited on its own within the grace period.
    Exited(ExitStatus),
    /// The process had to be killed.
    Killed,
}

/// One engine subprocess and the pipes connected to it.
///
/// The session exclusively owns the child and both pipe ends. It is not
/// `Clone`; hand out `&mut` borrows instead.
pub struct EngineSession {
    state: SessionState,
    child: Option<Child>,
    channel: Option<LineChannel<ChildStdin>>,
    backlog: VecDeque<String>,
    pid: Option<u32>,
    exit_status: Option<ExitStatus>,
    poll_interval: Duration,
    write_timeout: Duration,
}

impl Default for EngineSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSession {
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_HANDSHAKE_POLL_INTERVAL)
    }

    /// Create a session whose handshake loop polls at `poll_interval`.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            state: SessionState::Unstarted,
            child: None,
            channel: None,
            backlog: VecDeque::new(),
            pid: None,
            exit_status: None,
            poll_interval,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Bound each command write by `write_timeout` instead of the default.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// OS process id of the most recently started engine.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Exit status of the most recent engine, once it has been reaped.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    /// Whether a child process is currently alive.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Spawn the engine at `path` with no arguments.
    pub async fn start(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        self.start_with_args(path, &[]).await
    }

    /// Spawn the engine and connect its pipes.
    ///
    /// Allowed from `Unstarted` and `Terminated`, so a failed handshake can
    /// be retried. On success the session waits for the handshake.
    #[tracing::instrument(skip_all)]
    pub async fn start_with_args(
        &mut self,
        path: impl AsRef<Path>,
        args: &[String],
    ) -> Result<(), EngineError> {
        let path = path.as_ref();
        if !matches!(
            self.state,
            SessionState::Unstarted | SessionState::Terminated
        ) {
            return Err(EngineError::AlreadyRunning);
        }

        self.state = SessionState::Starting;
        self.backlog.clear();
        self.channel = None;
        self.pid = None;
        self.exit_status = None;

        tracing::info!("Spawning engine at {:?} (args: {:?})", path, args);
        let mut child = match Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                tracing::error!("Failed to spawn engine {:?}: {}", path, source);
                self.state = SessionState::Terminated;
                return Err(EngineError::Spawn {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            (stdin, _) => {
                let missing = if stdin.is_none() { "stdin" } else { "stdout" };
                tracing::error!("Engine spawned without {}", missing);
                let _ = child.kill().await;
                self.state = SessionState::Terminated;
                return Err(EngineError::MissingPipe(missing));
            }
        };

        self.pid = child.id();
        self.channel = Some(LineChannel::new(stdin, stdout));
        self.child = Some(child);
        self.state = SessionState::HandshakeWait;
        tracing::info!(pid = ?self.pid, "Engine spawned, waiting for handshake");
        Ok(())
    }

    /// Write one command line to the engine.
    ///
    /// The session does not interpret commands beyond line framing.
    pub async fn send_command(&mut self, cmd: &str) -> Result<(), EngineError> {
        if !self.state.accepts_commands() {
            return Err(EngineError::NotRunning(self.state));
        }
        let channel = self
            .channel
            .as_mut()
            .ok_or(EngineError::NotRunning(self.state))?;

        tracing::debug!("Sending engine command: {}", cmd.trim_end());
        let write_timeout = self.write_timeout;
        match tokio::time::timeout(write_timeout, channel.write_line(cmd)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(ChannelError::InvalidCommand(cmd))) => Err(EngineError::InvalidCommand(cmd)),
            Ok(Err(e)) => {
                tracing::warn!("Engine write failed, terminating session: {}", e);
                self.reap_now().await;
                Err(e.into())
            }
            Err(_) => {
                // A partial line may be in the pipe; the link cannot recover.
                tracing::warn!("Engine stopped reading input, killing it");
                self.kill_now().await;
                Err(EngineError::Write(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("engine did not accept input within {:?}", write_timeout),
                )))
            }
        }
    }

    /// Send `uci` and wait for `token`.
    pub async fn handshake(&mut self, token: &str, timeout: Duration) -> Result<(), EngineError> {
        self.send_command("uci").await?;
        self.await_handshake(token, timeout).await
    }

    /// Read lines until one equals `expected_token` or `timeout` elapses.
    ///
    /// Polls with a short bounded wait per round, never past the deadline.
    /// Every line read here, the token included, stays queued for
    /// [`read_line`](Self::read_line) so nothing is lost from the transcript.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn await_handshake(
        &mut self,
        expected_token: &str,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        match self.state {
            SessionState::HandshakeWait => {}
            SessionState::Ready => return Ok(()),
            state => return Err(EngineError::NotRunning(state)),
        }

        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!("No {:?} from engine within {:?}", expected_token, timeout);
                self.kill_now().await;
                return Err(EngineError::HandshakeTimeout {
                    token: expected_token.to_string(),
                    timeout,
                });
            }

            let wait = self.poll_interval.min(deadline - now);
            let Some(channel) = self.channel.as_mut() else {
                return Err(EngineError::NotRunning(self.state));
            };

            match channel.poll_readable(wait).await {
                PollState::Readable => {
                    while let Ok(line) = channel.read_line() {
                        let matched = line == expected_token;
                        self.backlog.push_back(line);
                        if matched {
                            tracing::info!("Handshake complete");
                            self.state = SessionState::Ready;
                            return Ok(());
                        }
                    }
                }
                PollState::Pending => {}
                PollState::Closed => {
                    tracing::warn!("Engine exited before handshake");
                    self.reap_now().await;
                    return Err(EngineError::EngineExited {
                        status: self.exit_status,
                    });
                }
            }
        }
    }

    /// Check for engine output, waiting at most `timeout`.
    ///
    /// Observing end of stream while the engine is alive terminates the
    /// session.
    pub async fn poll_readable(&mut self, timeout: Duration) -> PollState {
        if !self.backlog.is_empty() {
            return PollState::Readable;
        }
        let Some(channel) = self.channel.as_mut() else {
            return PollState::Closed;
        };

        let state = channel.poll_readable(timeout).await;
        if state == PollState::Closed && self.child.is_some() {
            tracing::warn!("Engine output closed unexpectedly");
            self.reap_now().await;
        }
        state
    }

    /// Next line of engine output, oldest first.
    pub fn read_line(&mut self) -> Result<String, EngineError> {
        if let Some(line) = self.backlog.pop_front() {
            return Ok(line);
        }
        match self.channel.as_mut() {
            Some(channel) => channel.read_line().map_err(EngineError::from),
            None => Err(EngineError::NotRunning(self.state)),
        }
    }

    /// Ask the engine to quit and wait up to `grace` before killing it.
    ///
    /// The child is not running when this returns.
    pub async fn shutdown(&mut self, grace: Duration) -> ShutdownOutcome {
        if self.child.is_none() {
            self.state = SessionState::Terminated;
            return ShutdownOutcome::NotRunning;
        }

        tracing::info!("Shutting down engine (grace {:?})", grace);
        self.state = SessionState::ShuttingDown;
        if let Some(channel) = self.channel.as_mut() {
            let bound = self.write_timeout.min(grace);
            match tokio::time::timeout(bound, channel.write_line("quit")).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!("quit not delivered: {}", e),
                Err(_) => tracing::debug!("quit not delivered: engine is not reading input"),
            }
            channel.close_input();
        }

        let outcome = self.reap(grace).await;
        tracing::info!("Engine terminated: {:?}", outcome);
        outcome
    }

    /// Kill the child immediately, if any.
    async fn kill_now(&mut self) {
        self.reap(Duration::ZERO).await;
    }

    /// Collect an exited child without waiting; kill it if it is somehow
    /// still alive.
    async fn reap_now(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if let Ok(Some(status)) = child.try_wait() {
                self.exit_status = Some(status);
                self.child = None;
                self.finish();
                return;
            }
        }
        self.kill_now().await;
    }

    async fn reap(&mut self, grace: Duration) -> ShutdownOutcome {
        let Some(mut child) = self.child.take() else {
            self.finish();
            return ShutdownOutcome::NotRunning;
        };

        let exited = if grace.is_zero() {
            child.try_wait().ok().flatten()
        } else {
            match tokio::time::timeout(grace, child.wait()).await {
                Ok(Ok(status)) => Some(status),
                Ok(Err(e)) => {
                    tracing::warn!("Failed to wait for engine: {}", e);
                    None
                }
                Err(_) => None,
            }
        };

        let outcome = match exited {
            Some(status) => {
                self.exit_status = Some(status);
                ShutdownOutcome::Exited(status)
            }
            None => {
                tracing::warn!(pid = ?self.pid, "Killing engine");
                if let Err(e) = child.kill().await {
                    tracing::error!("Failed to kill engine: {}", e);
                }
                self.exit_status = child.wait().await.ok();
                ShutdownOutcome::Killed
            }
        };

        self.finish();
        outcome
    }

    fn finish(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            channel.close_input();
        }
        self.state = SessionState::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unstarted_rejects_commands() {
        let mut session = EngineSession::new();
        assert_eq!(session.state(), SessionState::Unstarted);
        assert!(matches!(
            session.send_command("uci").await,
            Err(EngineError::NotRunning(SessionState::Unstarted))
        ));
        assert_eq!(
            session.poll_readable(Duration::ZERO).await,
            PollState::Closed
        );
    }

    #[tokio::test]
    async fn test_spawn_error_terminates() {
        let mut session = EngineSession::new();
        let result = session.start("/nonexistent/lotr-engine").await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_shutdown_without_child() {
        let mut session = EngineSession::new();
        assert_eq!(
            session.shutdown(Duration::from_millis(10)).await,
            ShutdownOutcome::NotRunning
        );
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn test_accepting_states() {
        assert!(SessionState::HandshakeWait.accepts_commands());
        assert!(SessionState::Ready.accepts_commands());
        assert!(!SessionState::ShuttingDown.accepts_commands());
        assert!(!SessionState::Terminated.accepts_commands());
    }
}
