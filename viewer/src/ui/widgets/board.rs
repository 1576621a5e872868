use board::{Board, Piece, PieceColor, PieceKind, Square};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::geometry::{BoardGeometry, SQUARE_HEIGHT, SQUARE_WIDTH};

pub struct BoardWidget<'a> {
    pub board: &'a Board,
    pub selected: Option<Square>,
    pub best_move: Option<(Square, Square)>,
    pub flipped: bool,
}

impl<'a> BoardWidget<'a> {
    pub fn new(board: &'a Board, flipped: bool) -> Self {
        Self {
            board,
            selected: None,
            best_move: None,
            flipped,
        }
    }

    pub fn selected(mut self, selected: Option<Square>) -> Self {
        self.selected = selected;
        self
    }

    pub fn best_move(mut self, best_move: Option<(Square, Square)>) -> Self {
        self.best_move = best_move;
        self
    }

    /// Where the squares land when rendered into `area`.
    pub fn geometry(area: Rect, flipped: bool) -> BoardGeometry {
        BoardGeometry::within(board_block().inner(area), flipped)
    }
}

fn board_block() -> Block<'static> {
    Block::default()
        .title("♟ LOTR Chess ♟")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

impl Widget for BoardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = board_block();
        let inner = block.inner(area);
        block.render(area, buf);

        let geometry = BoardGeometry::within(inner, self.flipped);
        let label_style = Style::default().fg(Color::Yellow);

        // Rank labels on the left, file labels underneath
        for rank in 0..8u8 {
            if let Some(square) = Square::new(0, rank) {
                let (_, y) = geometry.cell_of(square);
                let y = y + SQUARE_HEIGHT / 2;
                if y < inner.bottom() {
                    buf.set_string(inner.x, y, format!("{}", rank + 1), label_style);
                }
            }
        }
        for file in 0..8u8 {
            if let Some(square) = Square::new(file, 0) {
                let (x, _) = geometry.cell_of(square);
                let x = x + SQUARE_WIDTH / 2;
                let y = geometry.origin_y + BoardGeometry::HEIGHT;
                if x < inner.right() && y < inner.bottom() {
                    buf.set_string(x, y, format!("{}", (b'a' + file) as char), label_style);
                }
            }
        }

        for square in Square::all() {
            let (x, y) = geometry.cell_of(square);

            let is_selected = self.selected == Some(square);
            let is_best_move = self
                .best_move
                .map(|(from, to)| from == square || to == square)
                .unwrap_or(false);

            let bg_color = if is_selected {
                Color::Yellow
            } else if is_best_move {
                Color::Blue
            } else if square.is_light() {
                Color::Rgb(240, 217, 181)
            } else {
                Color::Rgb(181, 136, 99)
            };

            render_square(buf, x, y, bg_color, inner);

            if let Some(piece) = self.board.piece_at(square) {
                render_piece(buf, x, y, piece, bg_color, inner);
            }
        }
    }
}

fn render_square(buf: &mut Buffer, x: u16, y: u16, bg_color: Color, bounds: Rect) {
    let style = Style::default().bg(bg_color);

    for dy in 0..SQUARE_HEIGHT {
        for dx in 0..SQUARE_WIDTH {
            let px = x + dx;
            let py = y + dy;
            if px < bounds.right() && py < bounds.bottom() {
                buf[(px, py)].set_style(style);
            }
        }
    }
}

fn render_piece(buf: &mut Buffer, x: u16, y: u16, piece: Piece, bg_color: Color, bounds: Rect) {
    let fg_color = match piece.color {
        PieceColor::White => Color::White,
        PieceColor::Black => Color::Black,
    };
    let style = Style::default()
        .bg(bg_color)
        .fg(fg_color)
        .add_modifier(Modifier::BOLD);

    for (dy, line) in piece_art(piece).iter().enumerate() {
        let py = y + dy as u16;
        if py < bounds.bottom() && x < bounds.right() {
            // Clip to the remaining width so a narrow terminal never wraps.
            let width = (bounds.right() - x).min(SQUARE_WIDTH) as usize;
            buf.set_stringn(x, py, line, width, style);
        }
    }
}

/// Three rows of art, each fitting a square's width.
fn piece_art(piece: Piece) -> [&'static str; 3] {
    let top = match (piece.color, piece.kind) {
        (_, PieceKind::King) => "  ╋   ",
        (PieceColor::White, PieceKind::Queen) => " ♕♕♕  ",
        (PieceColor::Black, PieceKind::Queen) => " ♛♛♛  ",
        (_, PieceKind::Rook) => " ┌┬┐  ",
        (_, PieceKind::Bishop) => "  △   ",
        (_, PieceKind::Knight) => " ∩╗   ",
        (_, PieceKind::Pawn) => "  ●   ",
    };
    let mid = match piece.kind {
        PieceKind::Rook => " │R│  ",
        PieceKind::King => " ║K║  ",
        PieceKind::Queen => " ║Q║  ",
        PieceKind::Bishop => " ║B║  ",
        PieceKind::Knight => " ║N║  ",
        PieceKind::Pawn => " ║P║  ",
    };
    let bot = match piece.kind {
        PieceKind::Rook => " └─┘  ",
        _ => " ╚═╝  ",
    };
    [top, mid, bot]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(widget: BoardWidget<'_>, area: Rect) -> Buffer {
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    #[test]
    fn test_pieces_land_where_clicks_map() {
        let board = Board::startpos();
        let area = Rect::new(0, 0, 60, 30);
        let buf = render(BoardWidget::new(&board, false), area);
        let geometry = BoardWidget::geometry(area, false);

        // White king art sits in the e1 cell.
        let (x, y) = geometry.cell_of("e1".parse().unwrap());
        assert_eq!(buf[(x + 2, y + 1)].symbol(), "K");
        assert_eq!(geometry.square_at(x + 2, y + 1), Some("e1".parse().unwrap()));
    }

    #[test]
    fn test_selection_and_best_move_highlight() {
        let board = Board::startpos();
        let area = Rect::new(0, 0, 60, 30);
        let e2: Square = "e2".parse().unwrap();
        let e4: Square = "e4".parse().unwrap();
        let widget = BoardWidget::new(&board, true)
            .selected(Some(e2))
            .best_move(Some((e2, e4)));
        let buf = render(widget, area);
        let geometry = BoardWidget::geometry(area, true);

        let (x, y) = geometry.cell_of(e2);
        assert_eq!(buf[(x, y)].bg, Color::Yellow);
        let (x, y) = geometry.cell_of(e4);
        assert_eq!(buf[(x, y)].bg, Color::Blue);
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let board = Board::startpos();
        render(BoardWidget::new(&board, false), Rect::new(0, 0, 10, 5));
    }
}
