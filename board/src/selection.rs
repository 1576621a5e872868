//! Click-to-select state for the side to move.

use crate::board::Board;
use crate::square::Square;

/// The currently selected square, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Square>,
}

impl Selection {
    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// Apply a click. A square holding a piece of the side to move becomes
    /// selected; any other square clears the selection.
    pub fn click(&mut self, board: &Board, square: Square) -> Option<Square> {
        self.selected = board.is_selectable(square).then_some(square);
        self.selected
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
