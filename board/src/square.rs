//! Linear square indexing.
//!
//! Squares are numbered `0..64` rank-major from the white side: `a1 = 0`,
//! `h1 = 7`, `a8 = 56`, `h8 = 63`. All conversions are plain arithmetic.

use std::fmt;
use std::str::FromStr;

/// One of the 64 board squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const COUNT: usize = 64;

    /// Build a square from its linear index, `None` if out of range.
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < Self::COUNT as u8 {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Build a square from zero-based file (`a = 0`) and rank (`1 = 0`).
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self(rank * 8 + file))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// a1 is dark.
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    /// Every square in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::COUNT as u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid square: {0}")]
pub struct ParseSquareError(pub String);

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseSquareError(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| ParseSquareError(s.to_string()))
    }
}

impl From<cozy_chess::Square> for Square {
    fn from(sq: cozy_chess::Square) -> Self {
        Self(sq.rank() as u8 * 8 + sq.file() as u8)
    }
}

impl From<Square> for cozy_chess::Square {
    fn from(sq: Square) -> Self {
        cozy_chess::Square::new(
            cozy_chess::File::index(sq.file() as usize),
            cozy_chess::Rank::index(sq.rank() as usize),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_corner_squares() {
        assert_eq!(Square::new(0, 0).unwrap().index(), 0);
        assert_eq!(Square::new(7, 0).unwrap().index(), 7);
        assert_eq!(Square::new(0, 7).unwrap().index(), 56);
        assert_eq!(Square::new(7, 7).unwrap().index(), 63);
        assert_eq!(Square::from_index(63).unwrap().to_string(), "h8");
        assert!(Square::from_index(64).is_none());
        assert!(Square::new(8, 0).is_none());
    }

    #[test]
    fn test_parse_square() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(e4.file(), 4);
        assert_eq!(e4.rank(), 3);
        assert_eq!(e4.index(), 28);
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_colors() {
        assert!(!"a1".parse::<Square>().unwrap().is_light());
        assert!("h1".parse::<Square>().unwrap().is_light());
        assert!(!"h8".parse::<Square>().unwrap().is_light());
    }

    #[test]
    fn test_cozy_conversion_matches_index() {
        for sq in Square::all() {
            let cozy: cozy_chess::Square = sq.into();
            assert_eq!(Square::from(cozy), sq);
            assert_eq!(cozy.to_string(), sq.to_string());
        }
    }

    proptest! {
        #[test]
        fn index_and_coordinates_agree(index in 0u8..64) {
            let sq = Square::from_index(index).unwrap();
            prop_assert_eq!(Square::new(sq.file(), sq.rank()), Some(sq));
            prop_assert_eq!(sq.to_string().parse::<Square>().unwrap(), sq);
        }
    }
}
