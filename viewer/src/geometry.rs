//! Mapping between terminal cells and board squares.

use board::Square;
use ratatui::layout::Rect;

pub const SQUARE_WIDTH: u16 = 6;
pub const SQUARE_HEIGHT: u16 = 3;

/// Columns reserved left of the board for rank labels.
pub const RANK_LABEL_WIDTH: u16 = 2;

/// Where the 8x8 grid sits on screen and which way up it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    pub origin_x: u16,
    pub origin_y: u16,
    /// Black at the bottom when set.
    pub flipped: bool,
}

impl BoardGeometry {
    pub const WIDTH: u16 = SQUARE_WIDTH * 8;
    pub const HEIGHT: u16 = SQUARE_HEIGHT * 8;

    /// Place the grid inside `area`, leaving room for rank labels.
    pub fn within(area: Rect, flipped: bool) -> Self {
        Self {
            origin_x: area.x + RANK_LABEL_WIDTH,
            origin_y: area.y,
            flipped,
        }
    }

    /// Square under the terminal cell at (`column`, `row`), if any.
    pub fn square_at(&self, column: u16, row: u16) -> Option<Square> {
        let dx = column.checked_sub(self.origin_x)?;
        let dy = row.checked_sub(self.origin_y)?;
        let col = dx / SQUARE_WIDTH;
        let row = dy / SQUARE_HEIGHT;
        if col >= 8 || row >= 8 {
            return None;
        }
        let (file, rank) = if self.flipped {
            (7 - col, row)
        } else {
            (col, 7 - row)
        };
        Square::new(file as u8, rank as u8)
    }

    /// Top-left cell of `square`.
    pub fn cell_of(&self, square: Square) -> (u16, u16) {
        let (col, row) = if self.flipped {
            (7 - square.file() as u16, square.rank() as u16)
        } else {
            (square.file() as u16, 7 - square.rank() as u16)
        };
        (
            self.origin_x + col * SQUARE_WIDTH,
            self.origin_y + row * SQUARE_HEIGHT,
        )
    }
}
