//! Seat occupants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whoever sits in a seat: a connected player or the engine opponent.
///
/// The bot is a variant of its own, so no player id can ever collide with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Occupant {
    Player(String),
    Bot,
}

impl Occupant {
    /// Shorthand for a player occupant.
    pub fn player(id: impl Into<String>) -> Self {
        Occupant::Player(id.into())
    }

    #[inline]
    pub fn is_bot(&self) -> bool {
        matches!(self, Occupant::Bot)
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Player(id) => write!(f, "{}", id),
            Occupant::Bot => write!(f, "<bot>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_never_equals_a_player() {
        assert_ne!(Occupant::player("<bot>"), Occupant::Bot);
        assert_ne!(Occupant::player("bot"), Occupant::Bot);
        assert!(Occupant::Bot.is_bot());
    }

    #[test]
    fn json_shape() {
        assert_eq!(
            serde_json::to_string(&Occupant::player("alice")).unwrap(),
            r#"{"kind":"player","id":"alice"}"#
        );
        assert_eq!(
            serde_json::to_string(&Occupant::Bot).unwrap(),
            r#"{"kind":"bot"}"#
        );
    }
}
