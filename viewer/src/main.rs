//! `lotr-chess`: terminal board viewer with an attached UCI engine.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use board::Board;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use viewer::config::{movetime_from_ms, ViewerConfig};

/// Command-line overrides. Anything left unset falls back to the
/// environment, then to built-in defaults.
#[derive(Parser)]
#[command(name = "lotr-chess", about = "LOTR Chess board viewer with engine link")]
struct Cli {
    /// Engine executable (env: LOTR_ENGINE_PATH).
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Extra argument passed to the engine. Repeatable.
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Position to show, as FEN or `startpos`.
    #[arg(long, default_value = "startpos")]
    fen: String,

    /// Bound on the `uci` handshake (env: LOTR_HANDSHAKE_TIMEOUT_MS).
    #[arg(long)]
    handshake_timeout_ms: Option<u64>,

    /// Time the engine gets to exit after `quit` (env: LOTR_SHUTDOWN_GRACE_MS).
    #[arg(long)]
    shutdown_grace_ms: Option<u64>,

    /// UI tick interval (env: LOTR_TICK_MS).
    #[arg(long)]
    tick_ms: Option<u64>,

    /// `go movetime` for the go key, 0 for a bare `go` (env: LOTR_GO_MOVETIME_MS).
    #[arg(long)]
    movetime_ms: Option<u64>,

    /// Directory for rolling log files (env: LOTR_LOG_DIR).
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Run the board without starting an engine.
    #[arg(long)]
    no_engine: bool,
}

impl Cli {
    fn into_config(self) -> ViewerConfig {
        let mut config = ViewerConfig::default();

        if self.no_engine {
            config.engine = None;
        } else if let Some(launch) = config.engine.as_mut() {
            if let Some(path) = self.engine {
                launch.path = path;
            }
            launch.args = self.engine_args;
        }

        config.fen = self.fen;
        if let Some(ms) = self.handshake_timeout_ms {
            config.handshake_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.shutdown_grace_ms {
            config.shutdown_grace = Duration::from_millis(ms);
        }
        if let Some(ms) = self.tick_ms {
            config.tick = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = self.movetime_ms {
            config.go_movetime_ms = movetime_from_ms(ms);
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = dir;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config();

    // Log to files: stdout belongs to the terminal UI.
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "lotr-chess");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let board = Board::from_fen(&config.fen)
        .with_context(|| format!("Invalid FEN {:?}", config.fen))?;

    tracing::info!("LOTR Chess viewer starting up");
    tracing::debug!("Configuration: {:?}", config);

    viewer::ui::run_app(config, board).await?;

    tracing::info!("LOTR Chess viewer shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_engine_flag() {
        let config = Cli::parse_from(["lotr-chess", "--no-engine"]).into_config();
        assert!(config.engine.is_none());
    }

    #[test]
    fn test_flag_overrides() {
        let config = Cli::parse_from([
            "lotr-chess",
            "--engine",
            "/usr/bin/stockfish",
            "--engine-arg",
            "--threads=2",
            "--fen",
            "4k3/8/8/8/8/8/8/4K3 b - - 0 1",
            "--handshake-timeout-ms",
            "250",
            "--tick-ms",
            "0",
            "--movetime-ms",
            "0",
        ])
        .into_config();

        let launch = config.engine.unwrap();
        assert_eq!(launch.path, PathBuf::from("/usr/bin/stockfish"));
        assert_eq!(launch.args, vec!["--threads=2".to_string()]);
        assert_eq!(config.fen, "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(config.handshake_timeout, Duration::from_millis(250));
        assert_eq!(config.tick, Duration::from_millis(1));
        assert_eq!(config.go_movetime_ms, None);
    }
}
