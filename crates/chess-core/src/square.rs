//! Board square representation.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A square on the board as seen by the client: `row` counts down from the
/// top (row 0 is rank 8) and `col` counts right from the a-file.
///
/// The coordinates are not validated on construction, since moves arrive
/// from clients and an out-of-range coordinate is a rejected move rather than
/// a malformed one. Use [`GridSquare::is_on_board`] before interpreting it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSquare {
    pub row: u8,
    pub col: u8,
}

impl GridSquare {
    /// Creates a square from row and column.
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        GridSquare { row, col }
    }

    /// Returns true if both coordinates are in 0-7.
    #[inline]
    pub const fn is_on_board(self) -> bool {
        self.row < 8 && self.col < 8
    }

    /// Returns the rank index (0 for rank 1, 7 for rank 8).
    ///
    /// Returns `None` for squares off the board.
    #[inline]
    pub const fn rank_index(self) -> Option<u8> {
        if self.is_on_board() {
            Some(7 - self.row)
        } else {
            None
        }
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    pub fn from_algebraic(s: &str) -> Result<Self, CoreError> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(CoreError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(CoreError::InvalidSquare(s.to_string()));
        }
        Ok(GridSquare {
            row: 7 - (rank - b'1'),
            col: file - b'a',
        })
    }

    /// Returns the algebraic notation for this square, or `None` if it is
    /// off the board.
    pub fn to_algebraic(self) -> Option<String> {
        let rank = self.rank_index()?;
        Some(format!("{}{}", (b'a' + self.col) as char, (b'1' + rank) as char))
    }
}

impl fmt::Debug for GridSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_algebraic() {
            Some(name) => write!(f, "GridSquare({},{} {})", self.row, self.col, name),
            None => write!(f, "GridSquare({},{} off-board)", self.row, self.col),
        }
    }
}

impl fmt::Display for GridSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_algebraic() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "({},{})", self.row, self.col),
        }
    }
}
