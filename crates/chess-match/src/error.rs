//! Error types for matches and the engine bridge.

use std::time::Duration;
use thiserror::Error;

/// User-facing validation errors.
///
/// None of these are fatal: a command that fails leaves the match exactly as
/// it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    #[error("both seats are taken")]
    GameFull,
    #[error("already seated in this match")]
    PlayerAlreadySeated,
    #[error("not seated in this match")]
    NotSeated,
    #[error("game cannot be started now")]
    GameNotStartable,
    #[error("game is not in progress")]
    GameNotInProgress,
    #[error("match id does not refer to the active match")]
    MatchIdMismatch,
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid position")]
    InvalidPosition,
    #[error("invalid command")]
    InvalidCommand,
}

impl MatchError {
    /// Stable machine-readable code sent to clients.
    pub const fn code(self) -> &'static str {
        match self {
            MatchError::GameFull => "GAME_FULL",
            MatchError::PlayerAlreadySeated => "PLAYER_ALREADY_SEATED",
            MatchError::NotSeated => "NOT_SEATED",
            MatchError::GameNotStartable => "GAME_NOT_STARTABLE",
            MatchError::GameNotInProgress => "GAME_NOT_IN_PROGRESS",
            MatchError::MatchIdMismatch => "MATCH_ID_MISMATCH",
            MatchError::NotYourTurn => "NOT_YOUR_TURN",
            MatchError::InvalidPosition => "INVALID_POSITION",
            MatchError::InvalidCommand => "INVALID_COMMAND",
        }
    }
}

/// Failures talking to an engine subprocess.
///
/// These stay internal: a bot move that fails this way is simply never made.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("failed to spawn engine `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("empty engine command")]
    EmptyCommand,
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine session closed")]
    Closed,
    #[error("engine did not answer `{awaiting}` within {after:?}")]
    Timeout {
        awaiting: &'static str,
        after: Duration,
    },
    #[error("malformed engine reply: {0}")]
    Malformed(String),
    #[error("engine has no move in this position")]
    NoMove,
}
