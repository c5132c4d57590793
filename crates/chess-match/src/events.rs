//! Match events for the broadcast layer.

use crate::game::{MatchId, Outcome};
use crate::Occupant;
use chess_core::{Color, MoveRecord};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Something that happened to the active match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MatchEvent {
    MatchCreated {
        match_id: MatchId,
        bot: bool,
    },
    PlayerJoined {
        match_id: MatchId,
        occupant: Occupant,
        color: Color,
    },
    PlayerReady {
        match_id: MatchId,
        color: Color,
    },
    GameStarted {
        match_id: MatchId,
    },
    MoveApplied {
        match_id: MatchId,
        #[serde(rename = "move")]
        mv: MoveRecord,
        fen: String,
    },
    PlayerLeft {
        match_id: MatchId,
        occupant: Occupant,
        color: Color,
    },
    GameOver {
        match_id: MatchId,
        outcome: Outcome,
    },
    /// Replaced by a new match before it finished. Nothing is tallied.
    MatchAbandoned {
        match_id: MatchId,
    },
}

impl MatchEvent {
    pub fn match_id(&self) -> MatchId {
        match self {
            MatchEvent::MatchCreated { match_id, .. }
            | MatchEvent::PlayerJoined { match_id, .. }
            | MatchEvent::PlayerReady { match_id, .. }
            | MatchEvent::GameStarted { match_id }
            | MatchEvent::MoveApplied { match_id, .. }
            | MatchEvent::PlayerLeft { match_id, .. }
            | MatchEvent::GameOver { match_id, .. }
            | MatchEvent::MatchAbandoned { match_id } => *match_id,
        }
    }
}

/// Broadcast channel sender for match events.
pub type EventSender = broadcast::Sender<MatchEvent>;

/// Creates the event channel. Slow subscribers lose the oldest events once
/// 100 are buffered.
pub fn create_broadcast() -> EventSender {
    let (tx, _) = broadcast::channel(100);
    tx
}
