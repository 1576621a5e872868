use board::{Board, Selection, Square};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::bridge::UserAction;
use crate::geometry::BoardGeometry;

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Send these actions to the engine, in order.
    Engine(Vec<UserAction>),
    Flip,
    ClearSelection,
    SaveTranscript,
    Reconnect,
    Quit,
    None,
}

/// Viewer-side state, independent of the engine link.
#[derive(Debug)]
pub struct ViewerState {
    pub board: Board,
    pub selection: Selection,
    pub flipped: bool,
    /// Where the board was last drawn. Unknown until the first frame.
    pub geometry: Option<BoardGeometry>,
    pub go_movetime_ms: Option<u64>,
    pub status: Option<String>,
}

impl ViewerState {
    pub fn new(board: Board, go_movetime_ms: Option<u64>) -> Self {
        Self {
            board,
            selection: Selection::default(),
            flipped: false,
            geometry: None,
            go_movetime_ms,
            status: None,
        }
    }

    fn position(&self) -> UserAction {
        UserAction::SetPosition {
            fen: self.board.fen().to_string(),
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Input {
        if key.kind != KeyEventKind::Press {
            return Input::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Input::Quit;
        }

        match key.code {
            KeyCode::Char('q') => Input::Quit,
            KeyCode::Char('u') => Input::Engine(vec![UserAction::Uci]),
            KeyCode::Char('r') => Input::Engine(vec![UserAction::IsReady]),
            KeyCode::Char('n') => Input::Engine(vec![UserAction::NewGame, self.position()]),
            KeyCode::Char('p') => Input::Engine(vec![self.position()]),
            KeyCode::Char('g') => Input::Engine(vec![UserAction::Go {
                movetime_ms: self.go_movetime_ms,
            }]),
            KeyCode::Char('s') => Input::Engine(vec![UserAction::Stop]),
            KeyCode::Char('c') => Input::Reconnect,
            KeyCode::Char('f') => Input::Flip,
            KeyCode::Char('w') => Input::SaveTranscript,
            KeyCode::Esc => Input::ClearSelection,
            _ => Input::None,
        }
    }

    /// Apply a mouse event. Returns the clicked square for left clicks on
    /// the board.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Square> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let square = self.geometry?.square_at(mouse.column, mouse.row)?;
        self.click(square);
        Some(square)
    }

    pub fn click(&mut self, square: Square) {
        match self.selection.click(&self.board, square) {
            Some(selected) => {
                let piece = self.board.piece_at(selected);
                self.status = Some(match piece {
                    Some(piece) => format!(
                        "Selected {} {:?} on {}",
                        piece.color.as_str(),
                        piece.kind,
                        selected
                    ),
                    None => format!("Selected {}", selected),
                });
            }
            None => self.status = Some(format!("Nothing to select on {}", square)),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.status = Some("Selection cleared".to_string());
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
        // Geometry is refreshed on the next draw.
        if let Some(geometry) = self.geometry.as_mut() {
            geometry.flipped = self.flipped;
        }
        self.status = Some(if self.flipped {
            "Black at the bottom".to_string()
        } else {
            "White at the bottom".to_string()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn state() -> ViewerState {
        let mut state = ViewerState::new(Board::startpos(), Some(500));
        state.geometry = Some(BoardGeometry {
            origin_x: 0,
            origin_y: 0,
            flipped: false,
        });
        state
    }

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_engine_keys() {
        let state = state();
        assert_eq!(
            state.map_key(press(KeyCode::Char('u'))),
            Input::Engine(vec![UserAction::Uci])
        );
        assert_eq!(
            state.map_key(press(KeyCode::Char('g'))),
            Input::Engine(vec![UserAction::Go {
                movetime_ms: Some(500)
            }])
        );
        assert_eq!(
            state.map_key(press(KeyCode::Char('n'))),
            Input::Engine(vec![
                UserAction::NewGame,
                UserAction::SetPosition {
                    fen: board::STARTPOS_FEN.to_string()
                }
            ])
        );
    }

    #[test]
    fn test_viewer_keys() {
        let state = state();
        assert_eq!(state.map_key(press(KeyCode::Char('q'))), Input::Quit);
        assert_eq!(
            state.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Input::Quit
        );
        assert_eq!(state.map_key(press(KeyCode::Char('c'))), Input::Reconnect);
        assert_eq!(state.map_key(press(KeyCode::Char('f'))), Input::Flip);
        assert_eq!(state.map_key(press(KeyCode::Esc)), Input::ClearSelection);
        assert_eq!(state.map_key(press(KeyCode::Char('x'))), Input::None);
    }

    #[test]
    fn test_key_release_ignored() {
        let state = state();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(state.map_key(release), Input::None);
    }

    #[test]
    fn test_click_selects_side_to_move() {
        let mut state = state();
        // e2 sits in column 4, row 6 when white is at the bottom.
        let clicked = state.handle_mouse(left_click(4 * 6 + 1, 6 * 3 + 1));
        assert_eq!(clicked, Some(sq("e2")));
        assert_eq!(state.selection.selected(), Some(sq("e2")));

        // A black piece cannot be selected with white to move.
        state.handle_mouse(left_click(4 * 6, 1));
        assert_eq!(state.selection.selected(), None);
    }

    #[test]
    fn test_click_outside_board_is_ignored() {
        let mut state = state();
        state.click(sq("e2"));
        assert_eq!(state.handle_mouse(left_click(200, 1)), None);
        assert_eq!(state.selection.selected(), Some(sq("e2")));
    }

    #[test]
    fn test_click_before_first_draw_is_ignored() {
        let mut state = ViewerState::new(Board::startpos(), None);
        assert_eq!(state.handle_mouse(left_click(1, 1)), None);
    }

    #[test]
    fn test_flip_changes_click_mapping() {
        let mut state = state();
        state.flip();
        assert!(state.flipped);
        // Top-left is h1 once flipped.
        assert_eq!(state.handle_mouse(left_click(0, 0)), Some(sq("h1")));
        assert_eq!(state.selection.selected(), Some(sq("h1")));

        state.clear_selection();
        assert_eq!(state.selection.selected(), None);
    }
}
