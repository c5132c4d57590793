//! Parse errors for core notation.

use thiserror::Error;

/// Errors that can occur when parsing squares, moves or promotion letters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move notation: {0}")]
    InvalidMove(String),

    #[error("invalid promotion letter: '{0}'")]
    InvalidPromotion(char),
}
