//! Board collaborator for the LOTR Chess viewer.
//!
//! Decodes FEN into a display grid, maps squares to and from a linear
//! `0..64` index, and applies the click-selection rule. No move legality is
//! modelled here; that is the engine's business.

pub mod board;
pub mod selection;
pub mod square;
pub mod types;

pub use board::{Board, FenError, STARTPOS_FEN};
pub use selection::Selection;
pub use square::{ParseSquareError, Square};
pub use types::{Piece, PieceColor, PieceKind};
