//! Position decoded from FEN for rendering and selection.
//!
//! Only the piece placement and side-to-move fields are interpreted. Castling
//! rights, en passant and clocks are carried along in the original string but
//! never validated: rules belong to the engine.

use crate::square::Square;
use crate::types::{Piece, PieceColor};

/// FEN of the standard starting position.
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// An 8x8 board for display, indexed by [`Square`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; Square::COUNT],
    side_to_move: PieceColor,
    fen: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN string")]
    Empty,
    #[error("Expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),
    #[error("Rank {rank} describes {files} files")]
    RankWidth { rank: u8, files: usize },
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
    #[error("Missing side-to-move field")]
    MissingSideToMove,
    #[error("Invalid side to move: {0}")]
    InvalidSideToMove(String),
}

impl Board {
    /// Parse a FEN string. The literal `startpos` is accepted as an alias
    /// for the standard starting position.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fen = fen.trim();
        let fen = if fen == "startpos" { STARTPOS_FEN } else { fen };

        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::Empty)?;
        let side = fields.next().ok_or(FenError::MissingSideToMove)?;

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        let mut squares = [None; Square::COUNT];
        for (row, rank_str) in ranks.iter().enumerate() {
            // First FEN rank is rank 8.
            let rank = 7 - row as u8;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                let square = Square::new(file as u8, rank).ok_or(FenError::RankWidth {
                    rank: rank + 1,
                    files: file + 1,
                })?;
                squares[square.index() as usize] = Some(piece);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::RankWidth {
                    rank: rank + 1,
                    files: file,
                });
            }
        }

        let side_to_move = match side {
            "w" => PieceColor::White,
            "b" => PieceColor::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        Ok(Self {
            squares,
            side_to_move,
            fen: fen.to_string(),
        })
    }

    pub fn startpos() -> Self {
        Self {
            squares: STARTPOS_SQUARES,
            side_to_move: PieceColor::White,
            fen: STARTPOS_FEN.to_string(),
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index() as usize]
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.side_to_move
    }

    /// The FEN this board was built from (`startpos` expanded).
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// True if `square` holds a piece belonging to the side to move.
    pub fn is_selectable(&self, square: Square) -> bool {
        self.piece_at(square)
            .is_some_and(|piece| piece.color == self.side_to_move)
    }

    /// Rows in display order: rank 8 first, files a..h within a row.
    pub fn grid(&self) -> [[Option<Piece>; 8]; 8] {
        let mut grid = [[None; 8]; 8];
        for square in Square::all() {
            grid[7 - square.rank() as usize][square.file() as usize] = self.piece_at(square);
        }
        grid
    }

    /// Re-encode the piece placement field.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(64);
        for (row, cells) in self.grid().iter().enumerate() {
            if row > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for cell in cells {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

const STARTPOS_SQUARES: [Option<Piece>; Square::COUNT] = {
    use crate::types::PieceKind::{Bishop, King, Knight, Pawn, Queen, Rook};
    const BACK: [crate::types::PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

    let mut squares = [None; Square::COUNT];
    let mut file = 0;
    while file < 8 {
        squares[file] = Some(Piece::new(BACK[file], PieceColor::White));
        squares[8 + file] = Some(Piece::new(Pawn, PieceColor::White));
        squares[48 + file] = Some(Piece::new(Pawn, PieceColor::Black));
        squares[56 + file] = Some(Piece::new(BACK[file], PieceColor::Black));
        file += 1;
    }
    squares
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_starting_position() {
        let board = Board::from_fen(STARTPOS_FEN).unwrap();
        assert_eq!(
            board.piece_at(sq("a1")),
            Some(Piece::new(PieceKind::Rook, PieceColor::White))
        );
        assert_eq!(
            board.piece_at(sq("e1")),
            Some(Piece::new(PieceKind::King, PieceColor::White))
        );
        assert_eq!(
            board.piece_at(sq("d8")),
            Some(Piece::new(PieceKind::Queen, PieceColor::Black))
        );
        assert_eq!(board.piece_at(sq("e5")), None);
        assert_eq!(board.side_to_move(), PieceColor::White);
    }

    #[test]
    fn test_startpos_alias_matches_parsed() {
        assert_eq!(Board::from_fen("startpos").unwrap(), Board::startpos());
        assert_eq!(Board::from_fen(STARTPOS_FEN).unwrap(), Board::default());
    }

    #[test]
    fn test_black_to_move() {
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(board.side_to_move(), PieceColor::Black);
        assert_eq!(
            board.piece_at(sq("e4")),
            Some(Piece::new(PieceKind::Pawn, PieceColor::White))
        );
        assert_eq!(board.piece_at(sq("e2")), None);
        assert!(board.is_selectable(sq("e7")));
        assert!(!board.is_selectable(sq("e4")));
        assert!(!board.is_selectable(sq("e5")));
    }

    #[test]
    fn test_grid_rows_start_at_rank_eight() {
        let grid = Board::startpos().grid();
        assert_eq!(grid[0][0], Some(Piece::new(PieceKind::Rook, PieceColor::Black)));
        assert_eq!(grid[7][4], Some(Piece::new(PieceKind::King, PieceColor::White)));
        assert!(grid[3].iter().all(Option::is_none));
    }

    #[test]
    fn test_placement_reencodes() {
        let fen = "r3k2r/8/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.placement(), "r3k2r/8/8/3pP3/8/8/8/R3K2R");
        assert_eq!(board.fen(), fen);
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Board::from_fen(""), Err(FenError::Empty));
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankCount(7))
        );
        assert_eq!(
            Board::from_fen("9/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankWidth { rank: 8, files: 9 })
        );
        assert_eq!(
            Board::from_fen("ppppppppp/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankWidth { rank: 8, files: 9 })
        );
        assert_eq!(
            Board::from_fen("7/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankWidth { rank: 8, files: 7 })
        );
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/7x w - - 0 1"),
            Err(FenError::InvalidPiece('x'))
        );
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/8"),
            Err(FenError::MissingSideToMove)
        );
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/8 x"),
            Err(FenError::InvalidSideToMove("x".to_string()))
        );
    }
}
