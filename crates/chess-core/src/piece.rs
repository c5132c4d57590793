//! Promotion piece representation.

use crate::CoreError;
use serde::{Deserialize, Serialize};

/// The four pieces a pawn may promote to.
///
/// Serialized as the uppercase letter clients send ("Q", "R", "B", "N");
/// lowercase letters are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionPiece {
    #[serde(rename = "Q", alias = "q")]
    Queen,
    #[serde(rename = "R", alias = "r")]
    Rook,
    #[serde(rename = "B", alias = "b")]
    Bishop,
    #[serde(rename = "N", alias = "n")]
    Knight,
}

impl PromotionPiece {
    /// All promotion pieces in order.
    pub const ALL: [PromotionPiece; 4] = [
        PromotionPiece::Queen,
        PromotionPiece::Rook,
        PromotionPiece::Bishop,
        PromotionPiece::Knight,
    ];

    /// Parses a promotion letter, case-insensitively.
    pub fn from_letter(c: char) -> Result<Self, CoreError> {
        match c.to_ascii_uppercase() {
            'Q' => Ok(PromotionPiece::Queen),
            'R' => Ok(PromotionPiece::Rook),
            'B' => Ok(PromotionPiece::Bishop),
            'N' => Ok(PromotionPiece::Knight),
            _ => Err(CoreError::InvalidPromotion(c)),
        }
    }

    /// Returns the uppercase letter used by clients.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PromotionPiece::Queen => 'Q',
            PromotionPiece::Rook => 'R',
            PromotionPiece::Bishop => 'B',
            PromotionPiece::Knight => 'N',
        }
    }

    /// Returns the lowercase suffix used in UCI notation.
    #[inline]
    pub const fn uci_char(self) -> char {
        self.letter().to_ascii_lowercase()
    }
}

impl std::fmt::Display for PromotionPiece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}
