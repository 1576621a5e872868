use std::io;

use board::Board;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use engine::{EngineSession, SessionState};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::time::MissedTickBehavior;

use crate::app::{Input, ViewerState};
use crate::bridge::UiBridge;
use crate::config::ViewerConfig;
use crate::geometry::{BoardGeometry, RANK_LABEL_WIDTH};
use crate::transcript::{save_transcript, Transcript};
use crate::ui::widgets::{BoardWidget, ControlsPanel, EngineLogPanel, InfoPanel};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Board plus labels plus borders.
const BOARD_PANEL_WIDTH: u16 = BoardGeometry::WIDTH + RANK_LABEL_WIDTH + 2;
const BOARD_PANEL_HEIGHT: u16 = BoardGeometry::HEIGHT + 1 + 2;

/// Run the viewer until the user quits.
///
/// Owns the engine session for the whole run: the engine is connected once
/// the first frame is up and is shut down before the terminal is restored.
pub async fn run_app(config: ViewerConfig, board: Board) -> anyhow::Result<()> {
    let mut session = EngineSession::with_poll_interval(config.handshake_poll_interval);
    let mut bridge = UiBridge::new(&mut session);
    let mut state = ViewerState::new(board, config.go_movetime_ms);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut state, &mut bridge, &config).await;

    let outcome = bridge.shutdown(config.shutdown_grace).await;
    tracing::info!("Engine shutdown: {:?}", outcome);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Tui,
    state: &mut ViewerState,
    bridge: &mut UiBridge<'_>,
    config: &ViewerConfig,
) -> anyhow::Result<()> {
    terminal.draw(|f| draw(f, state, bridge))?;
    connect(bridge, config).await;

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal.draw(|f| draw(f, state, bridge))?;

        tokio::select! {
            _ = ticker.tick() => {
                bridge.on_tick().await;
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    let input = state.map_key(key);
                    if input == Input::Quit {
                        state.status = Some("Shutting down engine...".to_string());
                        terminal.draw(|f| draw(f, state, bridge))?;
                        return Ok(());
                    }
                    handle_input(input, state, bridge, config).await;
                }
                Some(Ok(Event::Mouse(mouse))) => {
                    state.handle_mouse(mouse);
                }
                // Resize and focus changes only need the redraw above.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}

async fn connect(bridge: &mut UiBridge<'_>, config: &ViewerConfig) {
    match &config.engine {
        Some(launch) => {
            // Failures are already on the log panel and status line.
            let _ = bridge.connect(launch, config.handshake_timeout).await;
        }
        None => bridge.notice("Engine disabled; board only"),
    }
}

async fn handle_input(
    input: Input,
    state: &mut ViewerState,
    bridge: &mut UiBridge<'_>,
    config: &ViewerConfig,
) {
    match input {
        Input::Engine(actions) => {
            for action in actions {
                if bridge.on_user_action(action).await.is_none() {
                    break;
                }
            }
        }
        Input::Flip => state.flip(),
        Input::ClearSelection => state.clear_selection(),
        Input::SaveTranscript => {
            let transcript = Transcript::from_log(
                bridge.log(),
                bridge.annotations().engine_name.as_deref(),
                state.board.fen(),
            );
            state.status = Some(match save_transcript(&transcript, &config.transcript_dir) {
                Ok(path) => format!("Transcript saved to {}", path.display()),
                Err(e) => {
                    tracing::error!("Failed to save transcript: {}", e);
                    format!("Transcript not saved: {}", e)
                }
            });
        }
        Input::Reconnect => {
            if bridge.engine_available() {
                bridge.notice("Engine already connected");
                return;
            }
            if !matches!(
                bridge.session_state(),
                SessionState::Unstarted | SessionState::Terminated
            ) {
                bridge.shutdown(config.shutdown_grace).await;
            }
            connect(bridge, config).await;
        }
        Input::Quit | Input::None => {}
    }
}

/// Lay out and render one frame, recording where the board landed.
pub fn draw(f: &mut Frame, state: &mut ViewerState, bridge: &UiBridge<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(BOARD_PANEL_HEIGHT), Constraint::Min(5)])
        .split(f.area());

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BOARD_PANEL_WIDTH), Constraint::Min(30)])
        .split(rows[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(6)])
        .split(top[1]);

    let annotations = bridge.annotations();

    state.geometry = Some(BoardWidget::geometry(top[0], state.flipped));
    let board_widget = BoardWidget::new(&state.board, state.flipped)
        .selected(state.selection.selected())
        .best_move(annotations.best_move);
    f.render_widget(board_widget, top[0]);

    f.render_widget(ControlsPanel::new(bridge.engine_available()), side[0]);

    let info_panel = InfoPanel {
        board: &state.board,
        selected: state.selection.selected(),
        annotations,
        session_state: bridge.session_state(),
        status: state.status.as_deref(),
    };
    f.render_widget(info_panel, side[1]);

    f.render_widget(EngineLogPanel::new(bridge.log()), rows[1]);
}
