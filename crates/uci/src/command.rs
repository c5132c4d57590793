//! UCI command parsing and rendering.

use crate::UciError;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// Reset engine state between games.
    UciNewGame,
    /// Set up position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
    /// Unknown command (for forward compatibility).
    Unknown(String),
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search to this depth.
    pub depth: Option<u32>,
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search indefinitely until `stop`.
    pub infinite: bool,
}

impl GoOptions {
    /// A depth-limited search.
    pub fn depth(depth: u32) -> Self {
        GoOptions {
            depth: Some(depth),
            ..Default::default()
        }
    }
}

impl GuiCommand {
    /// Parse a UCI command string.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        let cmd = parts.next().unwrap_or("");

        match cmd {
            "uci" => Ok(GuiCommand::Uci),
            "isready" => Ok(GuiCommand::IsReady),
            "ucinewgame" => Ok(GuiCommand::UciNewGame),
            "stop" => Ok(GuiCommand::Stop),
            "quit" => Ok(GuiCommand::Quit),
            "position" => Self::parse_position(parts),
            "go" => Self::parse_go(parts),
            "" => Ok(GuiCommand::Unknown(String::new())),
            _ => Ok(GuiCommand::Unknown(input.to_string())),
        }
    }

    /// Render the command as the line written to the engine's stdin.
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
            GuiCommand::Position { fen, moves } => {
                let mut line = match fen {
                    Some(f) => format!("position fen {}", f),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            GuiCommand::Go(opts) => {
                let mut line = "go".to_string();
                if let Some(d) = opts.depth {
                    line.push_str(&format!(" depth {}", d));
                }
                if let Some(t) = opts.movetime {
                    line.push_str(&format!(" movetime {}", t));
                }
                if opts.infinite {
                    line.push_str(" infinite");
                }
                line
            }
            GuiCommand::Unknown(s) => s.clone(),
        }
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let mut fen = None;
        let mut moves = Vec::new();

        match parts.next() {
            Some("startpos") => {}
            Some("fen") => {
                // FEN fields run until "moves" or the end of the line
                let mut fen_parts = Vec::new();
                let mut saw_moves = false;
                for part in parts.by_ref() {
                    if part == "moves" {
                        saw_moves = true;
                        break;
                    }
                    fen_parts.push(part);
                }
                if fen_parts.is_empty() {
                    return Err(UciError::ParseError("Empty FEN".to_string()));
                }
                fen = Some(fen_parts.join(" "));
                if saw_moves {
                    moves = parts.map(|s| s.to_string()).collect();
                }
                return Ok(GuiCommand::Position { fen, moves });
            }
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "Expected 'startpos' or 'fen', got '{}'",
                    other
                )));
            }
            None => {
                return Err(UciError::ParseError(
                    "Expected 'startpos' or 'fen'".to_string(),
                ));
            }
        }

        let remaining: Vec<&str> = parts.collect();
        if let Some(idx) = remaining.iter().position(|&s| s == "moves") {
            moves = remaining[idx + 1..].iter().map(|s| s.to_string()).collect();
        }

        Ok(GuiCommand::Position { fen, moves })
    }

    fn parse_go<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let mut opts = GoOptions::default();
        let parts: Vec<&str> = parts.collect();
        let mut i = 0;

        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    i += 1;
                    if i < parts.len() {
                        opts.depth = parts[i].parse().ok();
                    }
                }
                "movetime" => {
                    i += 1;
                    if i < parts.len() {
                        opts.movetime = parts[i].parse().ok();
                    }
                }
                "infinite" => {
                    opts.infinite = true;
                }
                _ => {}
            }
            i += 1;
        }

        Ok(GuiCommand::Go(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    #[test]
    fn parse_uci() {
        assert_eq!(GuiCommand::parse("uci").unwrap(), GuiCommand::Uci);
    }

    #[test]
    fn parse_isready() {
        assert_eq!(GuiCommand::parse("isready").unwrap(), GuiCommand::IsReady);
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let cmd = GuiCommand::parse("position startpos moves e2e4 e7e5").unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()]
            }
        );
    }

    #[test]
    fn parse_position_fen() {
        let cmd = GuiCommand::parse(&format!("position fen {}", AFTER_E4)).unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: Some(AFTER_E4.to_string()),
                moves: vec![]
            }
        );
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let cmd = GuiCommand::parse(&format!("position fen {} moves e7e5", AFTER_E4)).unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: Some(AFTER_E4.to_string()),
                moves: vec!["e7e5".to_string()]
            }
        );
    }

    #[test]
    fn parse_position_rejects_garbage() {
        assert!(GuiCommand::parse("position").is_err());
        assert!(GuiCommand::parse("position somewhere").is_err());
        assert!(GuiCommand::parse("position fen").is_err());
    }

    #[test]
    fn parse_go_depth() {
        let cmd = GuiCommand::parse("go depth 10").unwrap();
        assert_eq!(cmd, GuiCommand::Go(GoOptions::depth(10)));
    }

    #[test]
    fn parse_go_ignores_clock_fields() {
        let cmd = GuiCommand::parse("go wtime 1000 btime 1000 movetime 50").unwrap();
        if let GuiCommand::Go(opts) = cmd {
            assert_eq!(opts.movetime, Some(50));
            assert_eq!(opts.depth, None);
        } else {
            panic!("Expected Go command");
        }
    }

    #[test]
    fn render_bridge_commands() {
        assert_eq!(GuiCommand::Uci.to_uci(), "uci");
        assert_eq!(GuiCommand::IsReady.to_uci(), "isready");
        assert_eq!(GuiCommand::Quit.to_uci(), "quit");
        assert_eq!(GuiCommand::Go(GoOptions::depth(8)).to_uci(), "go depth 8");
        assert_eq!(
            GuiCommand::Position {
                fen: Some(AFTER_E4.to_string()),
                moves: vec![]
            }
            .to_uci(),
            format!("position fen {}", AFTER_E4)
        );
    }

    #[test]
    fn render_then_parse() {
        let cmds = [
            GuiCommand::Position {
                fen: None,
                moves: vec!["d2d4".to_string()],
            },
            GuiCommand::Go(GoOptions::depth(3)),
            GuiCommand::UciNewGame,
        ];
        for cmd in cmds {
            assert_eq!(GuiCommand::parse(&cmd.to_uci()).unwrap(), cmd);
        }
    }
}
