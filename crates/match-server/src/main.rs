//! WebSocket server for chess matches.
//!
//! Each connection is one player session. Clients send JSON commands
//! (`{"type":"JoinGame"}`, `{"type":"GameMove","match_id":1,"move":{...}}`,
//! ...) and receive JSON replies plus every match event as it happens.

mod config;

use anyhow::Context;
use chess_match::{orchestrator, Command, MatchId, OrchestratorHandle, Reply};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(name = "match-server")]
#[command(about = "Serves chess matches over WebSocket")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "match.toml")]
    config: PathBuf,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let port = cli.port.unwrap_or(config.port);

    let handle = orchestrator::spawn(config.bot_settings());

    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(engine = %config.engine.command, "Match server listening on ws://{}", addr);

    while let Ok((stream, peer)) = listener.accept().await {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, handle).await {
                tracing::warn!("Connection error from {}: {}", peer, e);
            }
        });
    }

    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handle: OrchestratorHandle,
) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let session = uuid::Uuid::new_v4().to_string();
    tracing::info!(%session, "New connection from {}", peer);

    // Everything bound for the client goes through one channel
    let (out_tx, mut out_rx) = mpsc::channel::<String>(100);
    let forward_task = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut events = handle.subscribe();
    let events_tx = out_tx.clone();
    let events_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let msg = serde_json::json!({ "type": "event", "event": event });
                    if events_tx.send(msg.to_string()).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!(skipped = n, "event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let hello = serde_json::json!({ "type": "session", "id": session });
    out_tx.send(hello.to_string()).await.ok();

    let mut joined: Option<MatchId> = None;
    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(%session, "WebSocket error: {}", e);
                break;
            }
        };

        let reply = respond(&handle, &session, &text, &mut joined).await;
        let body = serde_json::to_string(&reply)?;
        if out_tx.send(body).await.is_err() {
            break;
        }
    }

    // Dropping the connection counts as leaving
    if let Some(match_id) = joined {
        if let Err(e) = handle
            .execute(&session, Command::LeaveGame { match_id })
            .await
        {
            tracing::debug!(%session, code = e.code(), "leave on disconnect ignored");
        }
    }

    events_task.abort();
    forward_task.abort();
    tracing::info!(%session, "Connection closed from {}", peer);
    Ok(())
}

/// Runs one client message and remembers which match the session joined.
async fn respond(
    handle: &OrchestratorHandle,
    session: &str,
    text: &str,
    joined: &mut Option<MatchId>,
) -> Reply {
    let command = match Command::from_json(text) {
        Ok(command) => command,
        Err(e) => return Reply::from(e),
    };
    match handle.execute(session, command).await {
        Ok(reply) => {
            if let Reply::Joined { match_id, .. } = reply {
                *joined = Some(match_id);
            }
            reply
        }
        Err(e) => Reply::from(e),
    }
}
