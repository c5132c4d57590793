//! Routes commands into the active match.
//!
//! All match mutation happens on one task. Commands arrive on a channel,
//! and bot replies computed on spawned tasks come back through the same
//! channel, so nothing else ever touches a match.

use crate::bot::{BotController, BotSettings};
use crate::command::{Command, Reply};
use crate::events::{create_broadcast, EventSender, MatchEvent};
use crate::game::{ChessMatch, MatchId, MatchStatus};
use crate::tally::Scoreboard;
use crate::{BridgeError, Difficulty, MatchError, Occupant};
use chess_core::{Color, CompactMove, MoveRecord};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

enum Message {
    Command {
        caller: Occupant,
        command: Command,
        reply: oneshot::Sender<Result<Reply, MatchError>>,
    },
    BotMove {
        match_id: MatchId,
        result: Result<CompactMove, BridgeError>,
    },
}

/// Cheap handle to a running orchestrator.
#[derive(Clone)]
pub struct OrchestratorHandle {
    tx: mpsc::Sender<Message>,
    events: EventSender,
}

impl OrchestratorHandle {
    /// Runs `command` on behalf of the player with session id `caller`.
    pub async fn execute(&self, caller: &str, command: Command) -> Result<Reply, MatchError> {
        let (tx, rx) = oneshot::channel();
        let msg = Message::Command {
            caller: Occupant::player(caller),
            command,
            reply: tx,
        };
        if self.tx.send(msg).await.is_err() {
            error!("orchestrator is gone");
            return Err(MatchError::InvalidCommand);
        }
        rx.await.unwrap_or(Err(MatchError::InvalidCommand))
    }

    /// Subscribes to match events.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }
}

/// Starts the orchestrator on the current runtime.
///
/// It runs until every handle is dropped.
pub fn spawn(settings: BotSettings) -> OrchestratorHandle {
    let (tx, rx) = mpsc::channel(64);
    let events = create_broadcast();
    let orchestrator = Orchestrator {
        active: None,
        next_id: 1,
        settings,
        events: events.clone(),
        scoreboard: Scoreboard::new(),
        inbox: tx.downgrade(),
    };
    tokio::spawn(orchestrator.run(rx));
    OrchestratorHandle { tx, events }
}

struct ActiveMatch {
    game: ChessMatch,
    bot: Option<BotController>,
}

struct Orchestrator {
    active: Option<ActiveMatch>,
    next_id: MatchId,
    settings: BotSettings,
    events: EventSender,
    scoreboard: Scoreboard,
    /// Where bot tasks deliver their moves. Weak so that the loop still ends
    /// when the last handle goes away.
    inbox: mpsc::WeakSender<Message>,
}

impl Orchestrator {
    async fn run(mut self, mut rx: mpsc::Receiver<Message>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::Command {
                    caller,
                    command,
                    reply,
                } => {
                    let result = self.handle(&caller, command);
                    if let Err(e) = &result {
                        debug!(%caller, code = e.code(), "command rejected");
                    }
                    let _ = reply.send(result);
                }
                Message::BotMove { match_id, result } => self.on_bot_move(match_id, result),
            }
        }
        if let Some(old) = self.active.take() {
            if let Some(bot) = old.bot {
                bot.quit();
            }
        }
        info!("orchestrator stopped");
    }

    fn handle(&mut self, caller: &Occupant, command: Command) -> Result<Reply, MatchError> {
        if let Some(id) = command.match_id() {
            if self.active.as_ref().map(|a| a.game.id()) != Some(id) {
                return Err(MatchError::MatchIdMismatch);
            }
        }

        match command {
            Command::JoinGame => self.join_game(caller),
            Command::JoinBotGame { color, difficulty } => {
                Ok(self.join_bot_game(caller, color, difficulty))
            }
            Command::StartGame { .. } => self.start_game(caller),
            Command::GameMove { mv, .. } => self.game_move(caller, mv),
            Command::LeaveGame { .. } => self.leave_game(caller),
            Command::GetState => Ok(Reply::State {
                snapshot: self.active.as_ref().map(|a| a.game.snapshot()),
            }),
            Command::GetScoreboard => Ok(Reply::Scoreboard {
                standings: self.scoreboard.standings(),
            }),
        }
    }

    fn join_game(&mut self, caller: &Occupant) -> Result<Reply, MatchError> {
        // A match that has produced a result is never played again, even if
        // a leave has since put it back to waiting.
        let reusable = self.active.as_ref().is_some_and(|a| {
            a.game.status() != MatchStatus::Over
                && a.game.outcome().is_none()
                && !a.game.is_bot_match()
        });
        if !reusable {
            let id = self.allocate_id();
            self.replace(ActiveMatch {
                game: ChessMatch::new(id),
                bot: None,
            });
        }

        let active = self.active.as_mut().ok_or(MatchError::InvalidCommand)?;
        let color = active.game.join(caller.clone())?;
        let match_id = active.game.id();
        self.publish(MatchEvent::PlayerJoined {
            match_id,
            occupant: caller.clone(),
            color,
        });
        Ok(Reply::Joined { match_id, color })
    }

    fn join_bot_game(&mut self, caller: &Occupant, color: Color, difficulty: Difficulty) -> Reply {
        let id = self.allocate_id();
        let bot = match BotController::spawn(&self.settings, difficulty) {
            Ok(bot) => Some(bot),
            Err(e) => {
                warn!(match_id = id, error = %e, "engine unavailable, bot will not move");
                None
            }
        };
        self.replace(ActiveMatch {
            game: ChessMatch::against_bot(id, caller.clone(), color),
            bot,
        });
        self.publish(MatchEvent::PlayerJoined {
            match_id: id,
            occupant: caller.clone(),
            color,
        });
        self.publish(MatchEvent::PlayerJoined {
            match_id: id,
            occupant: Occupant::Bot,
            color: color.opposite(),
        });
        self.publish(MatchEvent::GameStarted { match_id: id });
        self.schedule_bot_move();
        Reply::Joined {
            match_id: id,
            color,
        }
    }

    fn start_game(&mut self, caller: &Occupant) -> Result<Reply, MatchError> {
        let active = self.active.as_mut().ok_or(MatchError::MatchIdMismatch)?;
        let started = active.game.start(caller)?;
        let match_id = active.game.id();
        if let Some(color) = active.game.seat_of(caller) {
            self.publish(MatchEvent::PlayerReady { match_id, color });
        }
        if started {
            info!(match_id, "game started");
            self.publish(MatchEvent::GameStarted { match_id });
        }
        Ok(Reply::Ok)
    }

    fn game_move(&mut self, caller: &Occupant, mv: MoveRecord) -> Result<Reply, MatchError> {
        self.play(caller, mv)?;
        self.schedule_bot_move();
        Ok(Reply::Ok)
    }

    fn leave_game(&mut self, caller: &Occupant) -> Result<Reply, MatchError> {
        let active = self.active.as_mut().ok_or(MatchError::MatchIdMismatch)?;
        let color = active.game.seat_of(caller).ok_or(MatchError::NotSeated)?;
        let players = seated(&active.game);
        let was_over = active.game.status() == MatchStatus::Over;

        active.game.leave(caller)?;
        let match_id = active.game.id();
        self.publish(MatchEvent::PlayerLeft {
            match_id,
            occupant: caller.clone(),
            color,
        });
        if !was_over {
            self.settle(&players);
        }
        Ok(Reply::Ok)
    }

    /// Applies a move and settles the game if it ended.
    fn play(&mut self, mover: &Occupant, mv: MoveRecord) -> Result<(), MatchError> {
        let active = self.active.as_mut().ok_or(MatchError::MatchIdMismatch)?;
        let players = seated(&active.game);
        active.game.apply_move(mover, mv)?;
        let match_id = active.game.id();
        let fen = active.game.fen();
        debug!(match_id, %mv, "move applied");
        self.publish(MatchEvent::MoveApplied { match_id, mv, fen });
        self.settle(&players);
        Ok(())
    }

    /// Reports and tallies the active game if it has just ended, and
    /// releases its engine.
    fn settle(&mut self, players: &[Occupant]) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.game.status() != MatchStatus::Over {
            return;
        }
        let Some(outcome) = active.game.outcome().cloned() else {
            return;
        };
        let match_id = active.game.id();
        if let Some(bot) = active.bot.take() {
            bot.quit();
        }
        info!(match_id, reason = ?outcome.reason, winner = ?outcome.winner, "game over");
        self.scoreboard.record(&outcome, players);
        self.publish(MatchEvent::GameOver { match_id, outcome });
    }

    /// Starts a bot computation if the bot is to move.
    fn schedule_bot_move(&self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let Some(bot) = active.bot.clone() else {
            return;
        };
        let game = &active.game;
        if game.status() != MatchStatus::InProgress
            || game.seat(game.side_to_move()) != Some(&Occupant::Bot)
        {
            return;
        }

        let match_id = game.id();
        let fen = game.fen();
        let inbox = self.inbox.clone();
        debug!(
            match_id,
            difficulty = %bot.difficulty(),
            depth = bot.depth(),
            %fen,
            "bot thinking"
        );
        tokio::spawn(async move {
            let result = bot.get_best_move(&fen).await;
            if let Some(tx) = inbox.upgrade() {
                let _ = tx.send(Message::BotMove { match_id, result }).await;
            }
        });
    }

    fn on_bot_move(&mut self, match_id: MatchId, result: Result<CompactMove, BridgeError>) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.game.id() != match_id {
            debug!(match_id, "dropping bot move for a replaced match");
            return;
        }
        let Some(color) = active.game.seat_of(&Occupant::Bot) else {
            return;
        };

        let mv = match result {
            Ok(mv) => mv.with_color(color),
            Err(e) => {
                warn!(match_id, error = %e, "no bot move");
                return;
            }
        };
        if let Err(e) = self.play(&Occupant::Bot, mv) {
            debug!(match_id, %mv, code = e.code(), "dropping stale bot move");
        }
    }

    fn replace(&mut self, next: ActiveMatch) {
        if let Some(old) = self.active.take() {
            if let Some(bot) = old.bot {
                bot.quit();
            }
            let match_id = old.game.id();
            if old.game.outcome().is_some() {
                debug!(match_id, "match replaced");
            } else {
                info!(match_id, status = ?old.game.status(), "unfinished match abandoned");
                self.publish(MatchEvent::MatchAbandoned { match_id });
            }
        }
        let match_id = next.game.id();
        let bot = next.bot.is_some() || next.game.is_bot_match();
        info!(match_id, bot, "match created");
        self.active = Some(next);
        self.publish(MatchEvent::MatchCreated { match_id, bot });
    }

    fn allocate_id(&mut self) -> MatchId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn publish(&self, event: MatchEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn seated(game: &ChessMatch) -> Vec<Occupant> {
    Color::ALL
        .into_iter()
        .filter_map(|c| game.seat(c).cloned())
        .collect()
}
