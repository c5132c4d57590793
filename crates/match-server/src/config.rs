//! Configuration loading for match-server.

use chess_match::{BotSettings, DepthTable, EngineSettings};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub engine: EngineConfig,
    pub difficulty: DepthTable,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 9999,
            engine: EngineConfig::default(),
            difficulty: DepthTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Program and arguments.
    pub command: String,
    pub handshake_timeout_ms: u64,
    pub reply_timeout_ms: u64,
    pub quit_grace_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        EngineConfig {
            command: engine.command,
            handshake_timeout_ms: engine.handshake_timeout.as_millis() as u64,
            reply_timeout_ms: engine.reply_timeout.as_millis() as u64,
            quit_grace_ms: engine.quit_grace.as_millis() as u64,
        }
    }
}

impl Config {
    /// Reads `path`, or returns the defaults if there is no such file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn bot_settings(&self) -> BotSettings {
        BotSettings {
            engine: EngineSettings {
                command: self.engine.command.clone(),
                handshake_timeout: Duration::from_millis(self.engine.handshake_timeout_ms),
                reply_timeout: Duration::from_millis(self.engine.reply_timeout_ms),
                quit_grace: Duration::from_millis(self.engine.quit_grace_ms),
            },
            depths: self.difficulty,
        }
    }
}
