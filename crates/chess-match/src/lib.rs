//! Chess matches between players and against a UCI engine.
//!
//! This crate provides:
//! - [`ChessMatch`]: seating, readiness, move application and game end
//! - [`try_apply`]: move validation on top of the `shakmaty` rules
//! - [`EngineSession`]: one engine subprocess driven over UCI
//! - [`BotController`]: an engine opponent at a given difficulty
//! - [`orchestrator`]: the single task that owns the active match

mod bot;
mod bridge;
mod command;
mod error;
mod events;
mod game;
mod occupant;
pub mod orchestrator;
mod tally;
mod validator;

pub use bot::{BotController, BotSettings, DepthTable, Difficulty};
pub use bridge::{EngineSession, EngineSettings};
pub use command::{Command, Reply};
pub use error::{BridgeError, MatchError};
pub use events::{create_broadcast, EventSender, MatchEvent};
pub use game::{ChessMatch, DrawReason, EndReason, MatchId, MatchSnapshot, MatchStatus, Outcome};
pub use occupant::Occupant;
pub use orchestrator::OrchestratorHandle;
pub use tally::{Record, Scoreboard, Standing};
pub use validator::{to_square, try_apply};
