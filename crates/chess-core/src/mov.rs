//! Move representation.

use crate::{Color, CoreError, GridSquare, PromotionPiece};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A move without a color tag.
///
/// This is the shape the engine bridge reports: it only knows which squares
/// changed. The caller supplies the color with [`CompactMove::with_color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompactMove {
    pub from: GridSquare,
    pub to: GridSquare,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}

impl CompactMove {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: GridSquare, to: GridSquare) -> Self {
        CompactMove {
            from,
            to,
            promotion: None,
        }
    }

    /// Parses a move from UCI notation (e.g., "e2e4", "e7e8q").
    pub fn from_uci(s: &str) -> Result<Self, CoreError> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return Err(CoreError::InvalidMove(s.to_string()));
        }
        let from = GridSquare::from_algebraic(&s[0..2])
            .map_err(|_| CoreError::InvalidMove(s.to_string()))?;
        let to = GridSquare::from_algebraic(&s[2..4])
            .map_err(|_| CoreError::InvalidMove(s.to_string()))?;
        let promotion = match s.chars().nth(4) {
            Some(c) => Some(PromotionPiece::from_letter(c)?),
            None => None,
        };
        Ok(CompactMove {
            from,
            to,
            promotion,
        })
    }

    /// Returns the UCI notation for this move, or `None` if either square is
    /// off the board.
    pub fn to_uci(&self) -> Option<String> {
        let mut s = self.from.to_algebraic()?;
        s.push_str(&self.to.to_algebraic()?);
        if let Some(p) = self.promotion {
            s.push(p.uci_char());
        }
        Some(s)
    }

    /// Tags this move with the color claiming to make it.
    #[inline]
    pub const fn with_color(self, color: Color) -> MoveRecord {
        MoveRecord {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
            color,
        }
    }
}

impl fmt::Display for CompactMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_uci() {
            Some(uci) => write!(f, "{}", uci),
            None => write!(f, "{}-{}", self.from, self.to),
        }
    }
}

/// A move as submitted to a match: squares, optional promotion letter, and
/// the color the mover claims to be playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: GridSquare,
    pub to: GridSquare,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
    pub color: Color,
}

impl MoveRecord {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: GridSquare, to: GridSquare, color: Color) -> Self {
        MoveRecord {
            from,
            to,
            promotion: None,
            color,
        }
    }

    /// Returns a copy of this move with the given promotion letter.
    #[inline]
    pub const fn promoting(mut self, piece: PromotionPiece) -> Self {
        self.promotion = Some(piece);
        self
    }

    /// Parses a UCI move and tags it with a color.
    pub fn from_uci(s: &str, color: Color) -> Result<Self, CoreError> {
        Ok(CompactMove::from_uci(s)?.with_color(color))
    }

    /// Drops the color tag.
    #[inline]
    pub const fn compact(&self) -> CompactMove {
        CompactMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    /// Returns the UCI notation for this move, or `None` if either square is
    /// off the board.
    pub fn to_uci(&self) -> Option<String> {
        self.compact().to_uci()
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.compact())
    }
}
