//! UCI (Universal Chess Interface) protocol library.
//!
//! This crate provides types, parsing and rendering for both directions of
//! the UCI line protocol: the GUI side (used by the match engine bridge to
//! drive an engine subprocess) and the engine side (used by the bundled bot).
//!
//! # Commands used by the bridge
//!
//! - `uci` / `uciok` - Handshake
//! - `isready` / `readyok` - Synchronization
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go depth <d>` - Start search, answered by `bestmove <move>`
//! - `quit` - Exit engine

mod command;

pub use command::{GoOptions, GuiCommand};

use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Input closed")]
    Closed,
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information, kept as the raw text after `info`.
    Info(String),
    /// Best move found. `mv` is `(none)` or `0000` when the side to move has
    /// no legal move.
    BestMove { mv: String, ponder: Option<String> },
    /// Any line this crate does not model (options, copyright banners, ...).
    Other(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    ///
    /// Never fails: unknown lines become [`EngineMessage::Other`] so that a
    /// chatty engine cannot break the reader.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut parts = line.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();

        match head {
            "uciok" => EngineMessage::UciOk,
            "readyok" => EngineMessage::ReadyOk,
            "info" => EngineMessage::Info(rest.to_string()),
            "id" => {
                if let Some(name) = rest.strip_prefix("name ") {
                    EngineMessage::Id {
                        name: Some(name.trim().to_string()),
                        author: None,
                    }
                } else if let Some(author) = rest.strip_prefix("author ") {
                    EngineMessage::Id {
                        name: None,
                        author: Some(author.trim().to_string()),
                    }
                } else {
                    EngineMessage::Other(line.to_string())
                }
            }
            "bestmove" => {
                let mut tokens = rest.split_whitespace();
                match tokens.next() {
                    Some(mv) => {
                        let ponder = match (tokens.next(), tokens.next()) {
                            (Some("ponder"), Some(p)) => Some(p.to_string()),
                            _ => None,
                        };
                        EngineMessage::BestMove {
                            mv: mv.to_string(),
                            ponder,
                        }
                    }
                    None => EngineMessage::Other(line.to_string()),
                }
            }
            _ => EngineMessage::Other(line.to_string()),
        }
    }

    /// Format message for output.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::Id { name, author } => {
                let mut parts = Vec::new();
                if let Some(n) = name {
                    parts.push(format!("id name {}", n));
                }
                if let Some(a) = author {
                    parts.push(format!("id author {}", a));
                }
                parts.join("\n")
            }
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(info) => format!("info {}", info),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("bestmove {} ponder {}", mv, p),
                None => format!("bestmove {}", mv),
            },
            EngineMessage::Other(line) => line.clone(),
        }
    }

    /// Returns true if this is a `bestmove` that carries no move.
    pub fn is_null_move(&self) -> bool {
        matches!(self, EngineMessage::BestMove { mv, .. } if mv == "(none)" || mv == "0000")
    }
}

/// Simple UCI engine wrapper for writing bots.
pub struct UciEngine<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> UciEngine<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read and parse the next command from GUI.
    ///
    /// Returns [`UciError::Closed`] once the GUI closes its end of the pipe.
    pub fn read_command(&mut self) -> Result<GuiCommand, UciError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(UciError::Closed);
        }
        GuiCommand::parse(&line)
    }

    /// Send a message to the GUI.
    pub fn send(&mut self, msg: &EngineMessage) -> Result<(), UciError> {
        writeln!(self.writer, "{}", msg.to_uci())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Send engine identification.
    pub fn send_id(&mut self, name: &str, author: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::Id {
            name: Some(name.to_string()),
            author: Some(author.to_string()),
        })
    }

    /// Send uciok.
    pub fn send_uciok(&mut self) -> Result<(), UciError> {
        self.send(&EngineMessage::UciOk)
    }

    /// Send readyok.
    pub fn send_readyok(&mut self) -> Result<(), UciError> {
        self.send(&EngineMessage::ReadyOk)
    }

    /// Send best move.
    pub fn send_bestmove(&mut self, mv: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::BestMove {
            mv: mv.to_string(),
            ponder: None,
        })
    }
}

/// Create a UCI engine using stdin/stdout.
pub fn stdio_engine() -> UciEngine<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
    UciEngine::new(std::io::BufReader::new(std::io::stdin()), std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handshake_acks() {
        assert_eq!(EngineMessage::parse("uciok"), EngineMessage::UciOk);
        assert_eq!(EngineMessage::parse("readyok\r\n"), EngineMessage::ReadyOk);
    }

    #[test]
    fn parse_id() {
        assert_eq!(
            EngineMessage::parse("id name Stockfish 16"),
            EngineMessage::Id {
                name: Some("Stockfish 16".to_string()),
                author: None
            }
        );
        assert_eq!(
            EngineMessage::parse("id author the Stockfish developers"),
            EngineMessage::Id {
                name: None,
                author: Some("the Stockfish developers".to_string())
            }
        );
    }

    #[test]
    fn parse_bestmove() {
        assert_eq!(
            EngineMessage::parse("bestmove e2e4 ponder e7e5"),
            EngineMessage::BestMove {
                mv: "e2e4".to_string(),
                ponder: Some("e7e5".to_string())
            }
        );
        assert_eq!(
            EngineMessage::parse("bestmove e7e8q"),
            EngineMessage::BestMove {
                mv: "e7e8q".to_string(),
                ponder: None
            }
        );
        assert!(EngineMessage::parse("bestmove (none)").is_null_move());
        assert!(!EngineMessage::parse("bestmove a2a3").is_null_move());
    }

    #[test]
    fn bare_bestmove_is_other() {
        assert_eq!(
            EngineMessage::parse("bestmove"),
            EngineMessage::Other("bestmove".to_string())
        );
    }

    #[test]
    fn unknown_lines_are_other() {
        assert_eq!(
            EngineMessage::parse("option name Hash type spin default 16"),
            EngineMessage::Other("option name Hash type spin default 16".to_string())
        );
        assert!(matches!(
            EngineMessage::parse("info depth 3 score cp 20 pv e2e4"),
            EngineMessage::Info(ref s) if s.starts_with("depth 3")
        ));
    }

    #[test]
    fn render_roundtrip() {
        for line in ["uciok", "readyok", "bestmove g1f3", "bestmove e2e4 ponder e7e5"] {
            assert_eq!(EngineMessage::parse(line).to_uci(), line);
        }
    }

    #[test]
    fn engine_reads_until_closed() {
        let input = b"uci\nisready\n" as &[u8];
        let mut out = Vec::new();
        let mut engine = UciEngine::new(input, &mut out);
        assert_eq!(engine.read_command().unwrap(), GuiCommand::Uci);
        assert_eq!(engine.read_command().unwrap(), GuiCommand::IsReady);
        assert!(matches!(engine.read_command(), Err(UciError::Closed)));
        engine.send_readyok().unwrap();
        engine.send_bestmove("e2e4").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "readyok\nbestmove e2e4\n");
    }
}
