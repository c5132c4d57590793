//! Core types for chess matches.
//!
//! This crate provides the value types shared by the match state machine,
//! the engine bridge and the transport layer:
//! - [`Color`] for seats and side to move
//! - [`GridSquare`] for board coordinates (row 0 is rank 8)
//! - [`PromotionPiece`] for promotion letters
//! - [`MoveRecord`] and [`CompactMove`] for moves, with UCI square notation

mod color;
mod error;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use error::CoreError;
pub use mov::{CompactMove, MoveRecord};
pub use piece::PromotionPiece;
pub use square::GridSquare;
