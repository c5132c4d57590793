//! Move validation against the rules library.
//!
//! Every check works on a borrowed position and the only way forward is the
//! position returned by [`try_apply`], so a rejected move can never leave a
//! half-applied board behind.

use crate::MatchError;
use chess_core::{Color, GridSquare, MoveRecord};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, File, Position, Rank, Role, Square};

/// Converts a client grid square to a rules-library square.
///
/// Returns `None` for squares off the board.
pub fn to_square(sq: GridSquare) -> Option<Square> {
    let rank = sq.rank_index()?;
    Some(Square::from_coords(
        File::new(u32::from(sq.col)),
        Rank::new(u32::from(rank)),
    ))
}

pub(crate) fn to_rules_color(color: Color) -> shakmaty::Color {
    match color {
        Color::White => shakmaty::Color::White,
        Color::Black => shakmaty::Color::Black,
    }
}

pub(crate) fn from_rules_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

/// Checks `mv` against `position` and returns the position after it.
///
/// The checks run in order: coordinates in range and distinct, claimed color
/// is the side to move, a piece of that color on the source square, the
/// promotion letter present exactly when a pawn reaches its last row, and
/// finally full legality on a clone of the position. Any failure after the
/// color check is reported as [`MatchError::InvalidPosition`].
pub fn try_apply(position: &Chess, mv: &MoveRecord) -> Result<Chess, MatchError> {
    let (Some(from), Some(to)) = (to_square(mv.from), to_square(mv.to)) else {
        return Err(MatchError::InvalidPosition);
    };
    if from == to {
        return Err(MatchError::InvalidPosition);
    }

    if to_rules_color(mv.color) != position.turn() {
        return Err(MatchError::NotYourTurn);
    }

    let piece = position
        .board()
        .piece_at(from)
        .filter(|p| p.color == position.turn())
        .ok_or(MatchError::InvalidPosition)?;

    let reaches_last_row = piece.role == Role::Pawn && mv.to.row == mv.color.promotion_row();
    if reaches_last_row != mv.promotion.is_some() {
        return Err(MatchError::InvalidPosition);
    }

    let uci: UciMove = mv
        .to_uci()
        .and_then(|s| s.parse().ok())
        .ok_or(MatchError::InvalidPosition)?;
    let legal = uci
        .to_move(position)
        .map_err(|_| MatchError::InvalidPosition)?;

    position
        .clone()
        .play(&legal)
        .map_err(|_| MatchError::InvalidPosition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::PromotionPiece;
    use shakmaty::fen::Fen;
    use shakmaty::{CastlingMode, Piece};

    fn sq(name: &str) -> GridSquare {
        GridSquare::from_algebraic(name).unwrap()
    }

    fn from_fen(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn piece_on(pos: &Chess, name: &str) -> Option<Piece> {
        pos.board().piece_at(to_square(sq(name)).unwrap())
    }

    // White pawn on a7, kings far apart
    const LONE_PAWN: &str = "8/P7/8/8/8/8/8/k6K w - - 0 1";

    #[test]
    fn grid_to_square() {
        assert_eq!(to_square(GridSquare::new(6, 4)), Some(Square::E2));
        assert_eq!(to_square(GridSquare::new(0, 0)), Some(Square::A8));
        assert_eq!(to_square(GridSquare::new(7, 7)), Some(Square::H1));
        assert_eq!(to_square(GridSquare::new(8, 7)), None);
    }

    #[test]
    fn opening_pawn_push() {
        let pos = Chess::default();
        let mv = MoveRecord::new(GridSquare::new(6, 4), GridSquare::new(4, 4), Color::White);
        let next = try_apply(&pos, &mv).unwrap();
        assert_eq!(next.turn(), shakmaty::Color::Black);
        assert_eq!(piece_on(&next, "e4").map(|p| p.role), Some(Role::Pawn));
        assert_eq!(piece_on(&next, "e2"), None);
    }

    #[test]
    fn out_of_range_and_null_moves() {
        let pos = Chess::default();
        let off = MoveRecord::new(GridSquare::new(6, 4), GridSquare::new(8, 4), Color::White);
        assert_eq!(try_apply(&pos, &off).err(), Some(MatchError::InvalidPosition));
        let null = MoveRecord::new(sq("e2"), sq("e2"), Color::White);
        assert_eq!(try_apply(&pos, &null).err(), Some(MatchError::InvalidPosition));
    }

    #[test]
    fn wrong_color_claim() {
        let pos = Chess::default();
        let mv = MoveRecord::new(sq("e7"), sq("e5"), Color::Black);
        assert_eq!(try_apply(&pos, &mv).err(), Some(MatchError::NotYourTurn));
    }

    #[test]
    fn empty_square_and_enemy_piece() {
        let pos = Chess::default();
        let empty = MoveRecord::new(sq("e4"), sq("e5"), Color::White);
        assert_eq!(try_apply(&pos, &empty).err(), Some(MatchError::InvalidPosition));
        let enemy = MoveRecord::new(sq("e7"), sq("e5"), Color::White);
        assert_eq!(try_apply(&pos, &enemy).err(), Some(MatchError::InvalidPosition));
    }

    #[test]
    fn illegal_geometry() {
        let pos = Chess::default();
        let mv = MoveRecord::new(sq("e2"), sq("e5"), Color::White);
        assert_eq!(try_apply(&pos, &mv).err(), Some(MatchError::InvalidPosition));
        let blocked = MoveRecord::new(sq("f1"), sq("c4"), Color::White);
        assert_eq!(try_apply(&pos, &blocked).err(), Some(MatchError::InvalidPosition));
    }

    #[test]
    fn promotion_required_on_last_row() {
        let pos = from_fen(LONE_PAWN);
        let bare = MoveRecord::new(sq("a7"), sq("a8"), Color::White);
        assert_eq!(try_apply(&pos, &bare).err(), Some(MatchError::InvalidPosition));
    }

    #[test]
    fn each_promotion_piece_lands() {
        let pos = from_fen(LONE_PAWN);
        for (piece, role) in [
            (PromotionPiece::Queen, Role::Queen),
            (PromotionPiece::Rook, Role::Rook),
            (PromotionPiece::Bishop, Role::Bishop),
            (PromotionPiece::Knight, Role::Knight),
        ] {
            let mv = MoveRecord::new(sq("a7"), sq("a8"), Color::White).promoting(piece);
            let next = try_apply(&pos, &mv).unwrap();
            assert_eq!(
                piece_on(&next, "a8"),
                Some(Piece {
                    color: shakmaty::Color::White,
                    role
                })
            );
        }
    }

    #[test]
    fn promotion_letter_rejected_elsewhere() {
        let pos = Chess::default();
        let mv = MoveRecord::new(sq("e2"), sq("e4"), Color::White).promoting(PromotionPiece::Queen);
        assert_eq!(try_apply(&pos, &mv).err(), Some(MatchError::InvalidPosition));

        // A knight reaching the last row is not a promotion
        let pos = from_fen("8/8/1N6/8/8/8/8/k6K w - - 0 1");
        let knight = MoveRecord::new(sq("b6"), sq("c8"), Color::White);
        assert!(try_apply(&pos, &knight).is_ok());
        let promoted = knight.promoting(PromotionPiece::Queen);
        assert_eq!(try_apply(&pos, &promoted).err(), Some(MatchError::InvalidPosition));
    }

    #[test]
    fn black_promotes_on_row_seven() {
        let pos = from_fen("k6K/8/8/8/8/8/p7/8 b - - 0 1");
        let mv = MoveRecord::new(sq("a2"), sq("a1"), Color::Black).promoting(PromotionPiece::Knight);
        let next = try_apply(&pos, &mv).unwrap();
        assert_eq!(piece_on(&next, "a1").map(|p| p.role), Some(Role::Knight));
    }

    #[test]
    fn castling_by_king_squares() {
        let pos = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let mv = MoveRecord::new(sq("e1"), sq("g1"), Color::White);
        let next = try_apply(&pos, &mv).unwrap();
        assert_eq!(piece_on(&next, "g1").map(|p| p.role), Some(Role::King));
        assert_eq!(piece_on(&next, "f1").map(|p| p.role), Some(Role::Rook));
    }

    #[test]
    fn rejection_leaves_position_untouched() {
        let pos = Chess::default();
        let before = pos.clone();
        let mv = MoveRecord::new(sq("d1"), sq("h5"), Color::White);
        assert!(try_apply(&pos, &mv).is_err());
        assert_eq!(pos.board(), before.board());
        assert_eq!(pos.turn(), before.turn());
    }
}
