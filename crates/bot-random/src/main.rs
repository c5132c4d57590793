//! Random move bot - plays a random legal move.
//!
//! The bundled opponent for bot matches when no stronger engine is
//! configured. It speaks just enough UCI for the match bridge: `uci`,
//! `isready`, `ucinewgame`, `position`, `go` and `quit`.

use rand::seq::SliceRandom;
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Position};
use uci::{stdio_engine, GuiCommand, UciError};

fn main() {
    if let Err(e) = run() {
        eprintln!("bot-random: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), UciError> {
    let mut engine = stdio_engine();
    let mut position = Chess::default();

    loop {
        let cmd = match engine.read_command() {
            Ok(cmd) => cmd,
            Err(UciError::Closed) => return Ok(()),
            Err(e) => {
                eprintln!("Error reading command: {}", e);
                continue;
            }
        };

        match cmd {
            GuiCommand::Uci => {
                engine.send_id("RandomBot", "Chess Devtools")?;
                engine.send_uciok()?;
            }

            GuiCommand::IsReady => engine.send_readyok()?,

            GuiCommand::UciNewGame => position = Chess::default(),

            GuiCommand::Position { fen, moves } => {
                position = setup_position(fen.as_deref(), &moves);
            }

            GuiCommand::Go(_opts) => match pick_move(&position) {
                Some(uci) => engine.send_bestmove(&uci)?,
                // No legal moves - game over
                None => engine.send_bestmove("0000")?,
            },

            // Nothing to stop for instant moves
            GuiCommand::Stop => {}

            GuiCommand::Quit => return Ok(()),

            GuiCommand::Unknown(_) => {}
        }
    }
}

/// Builds the position named by a `position` command.
///
/// An unreadable FEN falls back to the initial position; moves that are not
/// legal in sequence are skipped.
fn setup_position(fen: Option<&str>, moves: &[String]) -> Chess {
    let mut position: Chess = fen
        .and_then(|f| f.parse::<Fen>().ok())
        .and_then(|f| f.into_position(CastlingMode::Standard).ok())
        .unwrap_or_default();

    for mv_str in moves {
        let Ok(uci) = mv_str.parse::<UciMove>() else {
            continue;
        };
        let Ok(mv) = uci.to_move(&position) else {
            continue;
        };
        if let Ok(next) = position.clone().play(&mv) {
            position = next;
        }
    }
    position
}

fn pick_move(position: &Chess) -> Option<String> {
    let legal_moves = position.legal_moves();
    let mv = legal_moves.choose(&mut rand::thread_rng())?;
    Some(mv.to_uci(CastlingMode::Standard).to_string())
}
