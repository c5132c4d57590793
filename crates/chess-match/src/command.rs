//! The command and reply vocabulary.

use crate::game::{MatchId, MatchSnapshot};
use crate::tally::Standing;
use crate::{Difficulty, MatchError};
use chess_core::{Color, MoveRecord};
use serde::{Deserialize, Serialize};

/// A command from a connected player.
///
/// On the wire this is a JSON object tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    JoinGame,
    JoinBotGame {
        color: Color,
        difficulty: Difficulty,
    },
    StartGame {
        match_id: MatchId,
    },
    GameMove {
        match_id: MatchId,
        #[serde(rename = "move")]
        mv: MoveRecord,
    },
    LeaveGame {
        match_id: MatchId,
    },
    GetState,
    GetScoreboard,
}

impl Command {
    /// Parses a JSON command. Anything unrecognized is
    /// [`MatchError::InvalidCommand`].
    pub fn from_json(text: &str) -> Result<Self, MatchError> {
        serde_json::from_str(text).map_err(|_| MatchError::InvalidCommand)
    }

    /// The match a command is aimed at, if it names one.
    pub fn match_id(&self) -> Option<MatchId> {
        match self {
            Command::StartGame { match_id }
            | Command::GameMove { match_id, .. }
            | Command::LeaveGame { match_id } => Some(*match_id),
            _ => None,
        }
    }
}

/// The answer to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Seated in the given match.
    Joined { match_id: MatchId, color: Color },
    Ok,
    State { snapshot: Option<MatchSnapshot> },
    Scoreboard { standings: Vec<Standing> },
    Error { code: String, message: String },
}

impl From<MatchError> for Reply {
    fn from(err: MatchError) -> Self {
        Reply::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::GridSquare;

    #[test]
    fn parse_commands() {
        assert_eq!(
            Command::from_json(r#"{"type":"JoinGame"}"#),
            Ok(Command::JoinGame)
        );
        assert_eq!(
            Command::from_json(r#"{"type":"JoinBotGame","color":"black","difficulty":"EASY"}"#),
            Ok(Command::JoinBotGame {
                color: Color::Black,
                difficulty: Difficulty::Easy
            })
        );
        let mv = Command::from_json(
            r#"{"type":"GameMove","match_id":4,"move":{"from":{"row":6,"col":4},"to":{"row":4,"col":4},"color":"white"}}"#,
        )
        .unwrap();
        assert_eq!(
            mv,
            Command::GameMove {
                match_id: 4,
                mv: MoveRecord::new(GridSquare::new(6, 4), GridSquare::new(4, 4), Color::White),
            }
        );
        assert_eq!(mv.match_id(), Some(4));
    }

    #[test]
    fn unknown_commands_are_invalid() {
        assert_eq!(
            Command::from_json(r#"{"type":"ClaimVictory"}"#),
            Err(MatchError::InvalidCommand)
        );
        assert_eq!(
            Command::from_json(r#"{"type":"StartGame"}"#),
            Err(MatchError::InvalidCommand)
        );
        assert_eq!(Command::from_json("not json"), Err(MatchError::InvalidCommand));
    }

    #[test]
    fn error_reply_carries_code() {
        let reply = Reply::from(MatchError::NotYourTurn);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "NOT_YOUR_TURN");
    }
}
