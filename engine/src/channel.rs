//! Non-blocking, line-oriented duplex channel over an engine's pipes.
//!
//! A reader task drains the engine's stdout into an unbounded FIFO queue so
//! that the owner can check for output without ever awaiting the pipe
//! itself. Writes go straight to stdin and are flushed per line.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::ChildStdin;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::error::ChannelError;

/// Result of a readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// At least one line can be read without waiting.
    Readable,
    /// Nothing buffered yet; the stream is still open.
    Pending,
    /// The stream has ended and every buffered line has been consumed.
    Closed,
}

pub struct LineChannel<W = ChildStdin> {
    writer: Option<W>,
    lines: mpsc::UnboundedReceiver<String>,
    peeked: Option<String>,
    reader: JoinHandle<()>,
}

impl<W> LineChannel<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wrap a writer/reader pair. Must be called inside a tokio runtime.
    pub fn new<R>(writer: W, reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(forward_lines(reader, tx));
        Self {
            writer: Some(writer),
            lines: rx,
            peeked: None,
            reader,
        }
    }

    /// Write one line and flush it. A missing trailing newline is added; an
    /// embedded newline is rejected before anything is written.
    pub async fn write_line(&mut self, text: &str) -> Result<(), ChannelError> {
        let line = frame_line(text)?;
        let writer = self.writer.as_mut().ok_or(ChannelError::InputClosed)?;

        writer
            .write_all(line.as_bytes())
            .await
            .map_err(ChannelError::Write)?;
        writer.flush().await.map_err(ChannelError::Write)?;

        tracing::trace!("UCI >> {}", line.trim_end());
        Ok(())
    }

    /// Check whether a line is available, waiting at most `timeout`.
    ///
    /// A zero timeout only inspects what is already buffered and returns
    /// without yielding to the pipe.
    pub async fn poll_readable(&mut self, timeout: Duration) -> PollState {
        if self.peeked.is_some() {
            return PollState::Readable;
        }

        match self.lines.try_recv() {
            Ok(line) => {
                self.peeked = Some(line);
                return PollState::Readable;
            }
            Err(TryRecvError::Disconnected) => return PollState::Closed,
            Err(TryRecvError::Empty) => {}
        }

        if timeout.is_zero() {
            return PollState::Pending;
        }

        match tokio::time::timeout(timeout, self.lines.recv()).await {
            Ok(Some(line)) => {
                self.peeked = Some(line);
                PollState::Readable
            }
            Ok(None) => PollState::Closed,
            Err(_) => PollState::Pending,
        }
    }

    /// Take the next buffered line.
    ///
    /// Callers are expected to poll first; with nothing buffered this fails
    /// with [`ChannelError::WouldBlock`] rather than waiting.
    pub fn read_line(&mut self) -> Result<String, ChannelError> {
        if let Some(line) = self.peeked.take() {
            return Ok(line);
        }

        match self.lines.try_recv() {
            Ok(line) => Ok(line),
            Err(TryRecvError::Empty) => Err(ChannelError::WouldBlock),
            Err(TryRecvError::Disconnected) => Err(ChannelError::Closed),
        }
    }

    /// Drop the write half so the engine sees end of input.
    pub fn close_input(&mut self) {
        self.writer.take();
    }
}

impl<W> Drop for LineChannel<W> {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Normalise `text` into exactly one newline-terminated line.
pub(crate) fn frame_line(text: &str) -> Result<String, ChannelError> {
    let body = text
        .strip_suffix('\n')
        .map(|t| t.strip_suffix('\r').unwrap_or(t))
        .unwrap_or(text);

    if body.contains(['\n', '\r']) {
        return Err(ChannelError::InvalidCommand(text.to_string()));
    }

    let mut line = String::with_capacity(body.len() + 1);
    line.push_str(body);
    line.push('\n');
    Ok(line)
}

async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                tracing::debug!("Engine stdout EOF");
                break;
            }
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                tracing::trace!("UCI << {}", line);

                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Error reading engine stdout: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_frame_line() {
        assert_eq!(frame_line("uci").unwrap(), "uci\n");
        assert_eq!(frame_line("go\n").unwrap(), "go\n");
        assert_eq!(frame_line("quit\r\n").unwrap(), "quit\n");
        assert_eq!(frame_line("").unwrap(), "\n");
        assert!(matches!(
            frame_line("go\nquit"),
            Err(ChannelError::InvalidCommand(_))
        ));
        assert!(matches!(
            frame_line("go\n\n"),
            Err(ChannelError::InvalidCommand(_))
        ));
    }

    #[tokio::test]
    async fn test_lines_arrive_in_order() {
        let (mut engine_out, gui_in) = duplex(256);
        let (gui_out, _engine_in) = duplex(256);
        let mut channel = LineChannel::new(gui_out, gui_in);

        engine_out.write_all(b"a\nb\r\nc\n").await.unwrap();

        let mut seen = Vec::new();
        while seen.len() < 3 {
            assert_ne!(
                channel.poll_readable(Duration::from_secs(1)).await,
                PollState::Closed
            );
            while let Ok(line) = channel.read_line() {
                seen.push(line);
            }
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_read_without_data_would_block() {
        let (_engine_out, gui_in) = duplex(64);
        let (gui_out, _engine_in) = duplex(64);
        let mut channel = LineChannel::new(gui_out, gui_in);

        assert_eq!(channel.poll_readable(Duration::ZERO).await, PollState::Pending);
        assert!(matches!(channel.read_line(), Err(ChannelError::WouldBlock)));
    }

    #[tokio::test]
    async fn test_partial_line_is_not_readable() {
        let (mut engine_out, gui_in) = duplex(64);
        let (gui_out, _engine_in) = duplex(64);
        let mut channel = LineChannel::new(gui_out, gui_in);

        engine_out.write_all(b"uci").await.unwrap();
        assert_eq!(
            channel.poll_readable(Duration::from_millis(50)).await,
            PollState::Pending
        );

        engine_out.write_all(b"ok\n").await.unwrap();
        assert_eq!(
            channel.poll_readable(Duration::from_secs(1)).await,
            PollState::Readable
        );
        assert_eq!(channel.read_line().unwrap(), "uciok");
    }

    #[tokio::test]
    async fn test_closed_after_buffered_lines_drain() {
        let (mut engine_out, gui_in) = duplex(64);
        let (gui_out, _engine_in) = duplex(64);
        let mut channel = LineChannel::new(gui_out, gui_in);

        engine_out.write_all(b"bye\n").await.unwrap();
        drop(engine_out);

        assert_eq!(
            channel.poll_readable(Duration::from_secs(1)).await,
            PollState::Readable
        );
        assert_eq!(channel.read_line().unwrap(), "bye");
        assert_eq!(
            channel.poll_readable(Duration::from_secs(1)).await,
            PollState::Closed
        );
        assert!(matches!(channel.read_line(), Err(ChannelError::Closed)));
    }

    #[tokio::test]
    async fn test_write_line_frames_commands() {
        let (_engine_out, gui_in) = duplex(64);
        let (gui_out, mut engine_in) = duplex(64);
        let mut channel = LineChannel::new(gui_out, gui_in);

        channel.write_line("uci").await.unwrap();
        channel.write_line("isready\n").await.unwrap();
        assert!(matches!(
            channel.write_line("go\nstop").await,
            Err(ChannelError::InvalidCommand(_))
        ));
        channel.close_input();
        assert!(matches!(
            channel.write_line("quit").await,
            Err(ChannelError::InputClosed)
        ));

        let mut received = String::new();
        engine_in.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "uci\nisready\n");
    }
}
