//! The engine opponent.

use crate::bridge::{EngineSession, EngineSettings};
use crate::BridgeError;
use chess_core::CompactMove;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// How hard the engine plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "EASY")]
    Easy,
    #[serde(alias = "MEDIUM")]
    Medium,
    #[serde(alias = "HARD")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

/// Search depth for each difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthTable {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl Default for DepthTable {
    fn default() -> Self {
        DepthTable {
            easy: 2,
            medium: 8,
            hard: 16,
        }
    }
}

impl DepthTable {
    pub fn depth(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Everything needed to field an engine opponent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotSettings {
    pub engine: EngineSettings,
    pub depths: DepthTable,
}

/// The engine opponent of one bot match.
///
/// Clones share the engine process.
#[derive(Clone)]
pub struct BotController {
    difficulty: Difficulty,
    depth: u32,
    session: EngineSession,
}

impl BotController {
    /// Starts an engine for a new bot match.
    pub fn spawn(settings: &BotSettings, difficulty: Difficulty) -> Result<Self, BridgeError> {
        let session = EngineSession::spawn(&settings.engine)?;
        let depth = settings.depths.depth(difficulty);
        info!(%difficulty, depth, "bot ready");
        Ok(BotController {
            difficulty,
            depth,
            session,
        })
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Asks the engine for a move in the position given as FEN.
    ///
    /// The reply comes back in board coordinates, promotion as its piece
    /// letter, ready to be tagged with the bot's color.
    pub async fn get_best_move(&self, fen: &str) -> Result<CompactMove, BridgeError> {
        let reply = self.session.best_move(fen, self.depth).await?;
        CompactMove::from_uci(&reply).map_err(|_| BridgeError::Malformed(reply))
    }

    /// Releases the engine. A pending [`BotController::get_best_move`] fails
    /// and its result is never observed by the match.
    pub fn quit(&self) {
        info!(difficulty = %self.difficulty, "bot quit");
        self.session.quit();
    }
}
