//! Drives the bundled engine through the match bridge.

use chess_core::CompactMove;
use chess_match::{BridgeError, EngineSession, EngineSettings};
use std::time::Duration;

fn settings() -> EngineSettings {
    EngineSettings {
        command: env!("CARGO_BIN_EXE_bot-random").to_string(),
        handshake_timeout: Duration::from_secs(5),
        reply_timeout: Duration::from_secs(5),
        quit_grace: Duration::from_millis(50),
    }
}

#[tokio::test]
async fn plays_from_the_start_position() {
    let session = EngineSession::spawn(&settings()).unwrap();
    let reply = session
        .best_move(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            2,
        )
        .await
        .unwrap();
    let mv = CompactMove::from_uci(&reply).unwrap();
    // Every opening move starts on one of the two back rows
    assert!(mv.from.row == 6 || mv.from.row == 7);
    session.quit();
}

#[tokio::test]
async fn only_move_is_found() {
    let session = EngineSession::spawn(&settings()).unwrap();
    // King boxed in by the queen, a-pawn blocked after one step
    let reply = session
        .best_move("7k/8/8/8/p7/6q1/P7/7K w - - 0 1", 2)
        .await;
    assert_eq!(reply.unwrap(), "a2a3");
}

#[tokio::test]
async fn mated_side_has_no_move() {
    let session = EngineSession::spawn(&settings()).unwrap();
    let reply = session
        .best_move(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            2,
        )
        .await;
    assert!(matches!(reply, Err(BridgeError::NoMove)));
}
