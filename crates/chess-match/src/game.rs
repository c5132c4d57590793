//! The match state machine.
//!
//! A [`ChessMatch`] owns seating, readiness, the move log and the game
//! result. Every operation either succeeds completely or returns an error
//! and leaves the match untouched.

use crate::validator::{from_rules_color, try_apply};
use crate::{MatchError, Occupant};
use chess_core::{Color, MoveRecord};
use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};
use std::collections::HashMap;

/// Identifier of a match within one orchestrator.
pub type MatchId = u64;

/// Half-moves without capture or pawn move after which the game is drawn.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    WaitingForPlayers,
    WaitingToStart,
    InProgress,
    Over,
}

/// Why a drawn game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    SeventyFiveMoveRule,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Checkmate,
    /// The other side left mid-game.
    Forfeit,
    Draw(DrawReason),
}

/// The result of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// `None` for draws.
    pub winner: Option<Occupant>,
    pub reason: EndReason,
}

/// A read-only view of a match for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: MatchId,
    pub white: Option<Occupant>,
    pub black: Option<Occupant>,
    pub status: MatchStatus,
    pub white_ready: bool,
    pub black_ready: bool,
    /// Moves played so far in UCI notation.
    pub moves: Vec<String>,
    pub fen: String,
    pub side_to_move: Color,
    pub outcome: Option<Outcome>,
}

/// One chess match between two seats.
#[derive(Debug, Clone)]
pub struct ChessMatch {
    id: MatchId,
    seats: [Option<Occupant>; 2],
    ready: [bool; 2],
    status: MatchStatus,
    moves: Vec<MoveRecord>,
    first_to_move: Color,
    outcome: Option<Outcome>,
    /// Replay of `moves`; only ever advanced together with a log append.
    position: Chess,
    /// Occurrences of each position key, for repetition.
    seen: HashMap<String, u8>,
}

impl ChessMatch {
    /// Creates an empty match waiting for two players.
    pub fn new(id: MatchId) -> Self {
        let mut m = ChessMatch {
            id,
            seats: [None, None],
            ready: [false, false],
            status: MatchStatus::WaitingForPlayers,
            moves: Vec::new(),
            first_to_move: Color::White,
            outcome: None,
            position: Chess::default(),
            seen: HashMap::new(),
        };
        m.reset_board();
        m
    }

    /// Creates a match against the engine that is already in progress.
    ///
    /// `player` sits at `color`, the bot takes the other seat, and both are
    /// ready.
    pub fn against_bot(id: MatchId, player: Occupant, color: Color) -> Self {
        let mut m = ChessMatch::new(id);
        m.seats[color.index()] = Some(player);
        m.seats[color.opposite().index()] = Some(Occupant::Bot);
        m.ready = [true, true];
        m.status = MatchStatus::InProgress;
        m
    }

    #[inline]
    pub fn id(&self) -> MatchId {
        self.id
    }

    #[inline]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Occupant of the given seat.
    pub fn seat(&self, color: Color) -> Option<&Occupant> {
        self.seats[color.index()].as_ref()
    }

    /// The seat held by `occupant`, if any.
    pub fn seat_of(&self, occupant: &Occupant) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|c| self.seats[c.index()].as_ref() == Some(occupant))
    }

    pub fn is_ready(&self, color: Color) -> bool {
        self.ready[color.index()]
    }

    /// Returns true if one of the seats is held by the engine.
    pub fn is_bot_match(&self) -> bool {
        self.seat_of(&Occupant::Bot).is_some()
    }

    /// The move log in play order.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The current position.
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// The color whose turn it is, counted from the first mover.
    pub fn side_to_move(&self) -> Color {
        if self.moves.len() % 2 == 0 {
            self.first_to_move
        } else {
            self.first_to_move.opposite()
        }
    }

    /// FEN of the current position.
    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// Rebuilds the position from the initial position and the move log.
    pub fn replay(&self) -> Result<Chess, MatchError> {
        self.moves
            .iter()
            .try_fold(Chess::default(), |pos, mv| try_apply(&pos, mv))
    }

    /// Seats `occupant` in the first open seat, white first.
    pub fn join(&mut self, occupant: Occupant) -> Result<Color, MatchError> {
        if self.seat_of(&occupant).is_some() {
            return Err(MatchError::PlayerAlreadySeated);
        }
        let color = Color::ALL
            .into_iter()
            .find(|c| self.seats[c.index()].is_none())
            .ok_or(MatchError::GameFull)?;

        self.seats[color.index()] = Some(occupant);
        if self.status == MatchStatus::WaitingForPlayers && self.seats.iter().all(Option::is_some)
        {
            self.status = MatchStatus::WaitingToStart;
        }
        Ok(color)
    }

    /// Marks the caller's seat ready.
    ///
    /// Returns true when this call started the game.
    pub fn start(&mut self, occupant: &Occupant) -> Result<bool, MatchError> {
        if self.status != MatchStatus::WaitingToStart {
            return Err(MatchError::GameNotStartable);
        }
        let color = self.seat_of(occupant).ok_or(MatchError::NotSeated)?;

        self.ready[color.index()] = true;
        if self.ready.iter().all(|&r| r) {
            self.first_to_move = Color::White;
            self.reset_board();
            self.outcome = None;
            self.status = MatchStatus::InProgress;
            return Ok(true);
        }
        Ok(false)
    }

    /// Plays a move for `occupant`.
    ///
    /// Returns the game result if this move ended the game.
    pub fn apply_move(
        &mut self,
        occupant: &Occupant,
        mv: MoveRecord,
    ) -> Result<Option<&Outcome>, MatchError> {
        if self.status != MatchStatus::InProgress {
            return Err(MatchError::GameNotInProgress);
        }
        let color = self.seat_of(occupant).ok_or(MatchError::NotSeated)?;

        let to_move = self.side_to_move();
        if from_rules_color(self.position.turn()) != to_move {
            // Log parity and board disagree; nothing can be trusted to move.
            return Err(MatchError::InvalidPosition);
        }
        if color != to_move {
            return Err(MatchError::NotYourTurn);
        }

        let next = try_apply(&self.position, &mv)?;
        self.moves.push(mv);
        self.position = next;
        let key = self.position_key();
        *self.seen.entry(key).or_insert(0) += 1;

        if let Some(reason) = self.terminal_reason() {
            let winner = match reason {
                EndReason::Checkmate => Some(occupant.clone()),
                _ => None,
            };
            self.finish(Outcome { winner, reason });
        }
        Ok(self.outcome.as_ref())
    }

    /// Removes `occupant` from its seat.
    ///
    /// Mid-game the remaining occupant wins by forfeit. Before the game has
    /// started, or after it is over, the match goes back to waiting for
    /// players and both seats lose their ready flag.
    pub fn leave(&mut self, occupant: &Occupant) -> Result<(), MatchError> {
        let color = self.seat_of(occupant).ok_or(MatchError::NotSeated)?;
        self.seats[color.index()] = None;

        if self.status == MatchStatus::InProgress {
            let winner = self.seats[color.opposite().index()].clone();
            self.finish(Outcome {
                winner,
                reason: EndReason::Forfeit,
            });
        } else {
            self.status = MatchStatus::WaitingForPlayers;
            self.ready = [false, false];
        }
        Ok(())
    }

    /// A copy of the client-visible state.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            id: self.id,
            white: self.seats[Color::White.index()].clone(),
            black: self.seats[Color::Black.index()].clone(),
            status: self.status,
            white_ready: self.ready[Color::White.index()],
            black_ready: self.ready[Color::Black.index()],
            moves: self.moves.iter().filter_map(MoveRecord::to_uci).collect(),
            fen: self.fen(),
            side_to_move: self.side_to_move(),
            outcome: self.outcome.clone(),
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.status = MatchStatus::Over;
        self.ready = [false, false];
    }

    fn reset_board(&mut self) {
        self.moves.clear();
        self.position = Chess::default();
        self.seen.clear();
        let key = self.position_key();
        self.seen.insert(key, 1);
    }

    /// Placement, side to move, castling rights and en passant square.
    fn position_key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn terminal_reason(&self) -> Option<EndReason> {
        let pos = &self.position;
        if pos.is_checkmate() {
            return Some(EndReason::Checkmate);
        }
        if pos.is_stalemate() {
            return Some(EndReason::Draw(DrawReason::Stalemate));
        }
        if pos.is_insufficient_material() {
            return Some(EndReason::Draw(DrawReason::InsufficientMaterial));
        }
        if self.seen.get(&self.position_key()).copied().unwrap_or(0) >= 3 {
            return Some(EndReason::Draw(DrawReason::ThreefoldRepetition));
        }
        if pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            return Some(EndReason::Draw(DrawReason::SeventyFiveMoveRule));
        }
        None
    }
}
