//! Engine subprocess bridge.
//!
//! An [`EngineSession`] owns one UCI engine process. Requests are queued and
//! served one at a time by a worker task; engine output is read line by line
//! and handed to whichever pending request is waiting for it.

use crate::BridgeError;
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use uci::{EngineMessage, GoOptions, GuiCommand};

/// How to launch and talk to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Program and arguments, split on whitespace.
    pub command: String,
    /// Limit for the `uci` / `uciok` handshake.
    pub handshake_timeout: Duration,
    /// Limit for every other awaited reply.
    pub reply_timeout: Duration,
    /// Time given to the engine to exit after `quit` before it is killed.
    pub quit_grace: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            command: "bot-random".to_string(),
            handshake_timeout: Duration::from_secs(10),
            reply_timeout: Duration::from_secs(30),
            quit_grace: Duration::from_millis(100),
        }
    }
}

type LinePredicate = Box<dyn Fn(&str) -> bool + Send>;

/// A request waiting for a matching output line.
struct Resolver {
    id: u64,
    matches: LinePredicate,
    tx: oneshot::Sender<String>,
}

#[derive(Default)]
struct Pending {
    resolvers: VecDeque<Resolver>,
    closed: bool,
}

impl Pending {
    /// Hands `line` to the first resolver that wants it.
    fn offer(&mut self, line: &str) -> bool {
        match self.resolvers.iter().position(|r| (r.matches)(line)) {
            Some(idx) => {
                if let Some(r) = self.resolvers.remove(idx) {
                    let _ = r.tx.send(line.to_string());
                }
                true
            }
            None => false,
        }
    }

    fn close(&mut self) {
        self.closed = true;
        // Dropping the senders wakes every waiter with an error
        self.resolvers.clear();
    }
}

/// The write half and the resolver list of one engine process.
struct Link {
    stdin: mpsc::Sender<String>,
    pending: Arc<Mutex<Pending>>,
    next_id: AtomicU64,
}

impl Link {
    async fn send(&self, cmd: GuiCommand) -> Result<(), BridgeError> {
        let line = cmd.to_uci();
        debug!(%line, "engine <");
        self.stdin.send(line).await.map_err(|_| BridgeError::Closed)
    }

    /// Queues a resolver for the first line accepted by `matches`.
    fn expect(
        &self,
        matches: LinePredicate,
    ) -> Result<(u64, oneshot::Receiver<String>), BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().map_err(|_| BridgeError::Closed)?;
        if pending.closed {
            return Err(BridgeError::Closed);
        }
        pending.resolvers.push_back(Resolver { id, matches, tx });
        Ok((id, rx))
    }

    /// Sends `cmd` and waits for the first line accepted by `matches`.
    async fn exchange(
        &self,
        cmd: GuiCommand,
        awaiting: &'static str,
        matches: LinePredicate,
        limit: Duration,
    ) -> Result<String, BridgeError> {
        let (id, rx) = self.expect(matches)?;
        if let Err(e) = self.send(cmd).await {
            self.forget(id);
            return Err(e);
        }

        match tokio::time::timeout(limit, rx).await {
            Ok(Ok(line)) => Ok(line),
            Ok(Err(_)) => Err(BridgeError::Closed),
            Err(_) => {
                self.forget(id);
                Err(BridgeError::Timeout {
                    awaiting,
                    after: limit,
                })
            }
        }
    }

    fn forget(&self, id: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.resolvers.retain(|r| r.id != id);
        }
    }

    /// Fails every waiter and refuses new ones.
    fn close(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.close();
        }
    }

    fn is_closed(&self) -> bool {
        self.pending.lock().map(|p| p.closed).unwrap_or(true)
    }

    async fn handshake(&self, limit: Duration) -> Result<(), BridgeError> {
        self.exchange(GuiCommand::Uci, "uciok", Box::new(|l: &str| l == "uciok"), limit)
            .await
            .map(|_| ())
    }

    /// `isready`, `position fen`, then `go depth`; returns the raw move.
    async fn best_move(&self, fen: &str, depth: u32, limit: Duration) -> Result<String, BridgeError> {
        self.exchange(
            GuiCommand::IsReady,
            "readyok",
            Box::new(|l: &str| l == "readyok"),
            limit,
        )
        .await?;
        self.send(GuiCommand::Position {
            fen: Some(fen.to_string()),
            moves: Vec::new(),
        })
        .await?;
        let line = self.search(depth, limit).await?;

        let reply = EngineMessage::parse(&line);
        if reply.is_null_move() {
            return Err(BridgeError::NoMove);
        }
        match reply {
            EngineMessage::BestMove { mv, .. } => Ok(mv),
            _ => Err(BridgeError::Malformed(line)),
        }
    }

    /// `go depth` → `bestmove`.
    ///
    /// A search that overruns `limit` is sent `stop` and its `bestmove` is
    /// swallowed, so the next request starts from a quiet engine. An engine
    /// that stays silent after `stop` closes the link.
    async fn search(&self, depth: u32, limit: Duration) -> Result<String, BridgeError> {
        let (id, mut rx) = self.expect(Box::new(|l: &str| l.starts_with("bestmove")))?;
        if let Err(e) = self.send(GuiCommand::Go(GoOptions::depth(depth))).await {
            self.forget(id);
            return Err(e);
        }

        match tokio::time::timeout(limit, &mut rx).await {
            Ok(Ok(line)) => return Ok(line),
            Ok(Err(_)) => return Err(BridgeError::Closed),
            Err(_) => {}
        }

        let timeout = BridgeError::Timeout {
            awaiting: "bestmove",
            after: limit,
        };
        warn!(depth, after = ?limit, "search overran, stopping engine");
        if self.send(GuiCommand::Stop).await.is_err() {
            self.close();
            return Err(timeout);
        }
        match tokio::time::timeout(limit, rx).await {
            Ok(Ok(line)) => debug!(%line, "discarded late bestmove"),
            Ok(Err(_)) => {}
            Err(_) => {
                warn!("engine ignored stop, closing session");
                self.close();
            }
        }
        Err(timeout)
    }
}

struct Job {
    fen: String,
    depth: u32,
    reply: oneshot::Sender<Result<String, BridgeError>>,
}

/// Handle to one engine process.
///
/// Cloning shares the same process and queue. The process is shut down by
/// [`EngineSession::quit`] or once every handle is dropped.
#[derive(Clone)]
pub struct EngineSession {
    jobs: mpsc::Sender<Job>,
    busy: Arc<AtomicBool>,
    quit_tx: Arc<watch::Sender<bool>>,
}

impl EngineSession {
    /// Launches the engine and starts the `uci` handshake.
    ///
    /// Returns as soon as the process is running. Requests queue behind the
    /// handshake; if it fails, the first queued request receives the error.
    pub fn spawn(settings: &EngineSettings) -> Result<Self, BridgeError> {
        let parts: Vec<&str> = settings.command.split_whitespace().collect();
        let (program, args) = parts.split_first().ok_or(BridgeError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                command: settings.command.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::Malformed("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Malformed("engine stdout unavailable".to_string()))?;

        // Channel for sending commands to stdin
        let (stdin_tx, mut stdin_rx) = mpsc::channel::<String>(100);
        let mut stdin_writer = stdin;
        tokio::spawn(async move {
            while let Some(cmd) = stdin_rx.recv().await {
                if stdin_writer.write_all(cmd.as_bytes()).await.is_err()
                    || stdin_writer.write_all(b"\n").await.is_err()
                    || stdin_writer.flush().await.is_err()
                {
                    break;
                }
            }
        });

        let pending = Arc::new(Mutex::new(Pending::default()));
        tokio::spawn(read_lines(stdout, Arc::clone(&pending)));

        let link = Link {
            stdin: stdin_tx,
            pending,
            next_id: AtomicU64::new(0),
        };

        let (jobs_tx, jobs_rx) = mpsc::channel(16);
        let (quit_tx, quit_rx) = watch::channel(false);
        let busy = Arc::new(AtomicBool::new(false));

        info!(command = %settings.command, pid = ?child.id(), "engine spawned");
        tokio::spawn(run_worker(
            child,
            link,
            jobs_rx,
            quit_rx,
            Arc::clone(&busy),
            settings.clone(),
        ));

        Ok(EngineSession {
            jobs: jobs_tx,
            busy,
            quit_tx: Arc::new(quit_tx),
        })
    }

    /// Asks the engine for its move in `fen`, searching to `depth`.
    ///
    /// Waits behind any request already queued on this session.
    pub async fn best_move(&self, fen: &str, depth: u32) -> Result<String, BridgeError> {
        let (tx, rx) = oneshot::channel();
        let job = Job {
            fen: fen.to_string(),
            depth,
            reply: tx,
        };
        self.jobs.send(job).await.map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)?
    }

    /// Returns true while a request is being served.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Shuts the engine down: `quit`, a grace period, then kill.
    ///
    /// Safe to call at any time. A request in flight and anything queued fail
    /// with [`BridgeError::Closed`].
    pub fn quit(&self) {
        let _ = self.quit_tx.send(true);
    }
}

async fn read_lines(stdout: ChildStdout, pending: Arc<Mutex<Pending>>) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim_end();
        debug!(%line, "engine >");
        let Ok(mut pending) = pending.lock() else {
            break;
        };
        if !pending.offer(line) {
            debug!(%line, "unclaimed engine line");
        }
    }
    if let Ok(mut pending) = pending.lock() {
        pending.close();
    }
}

async fn run_worker(
    mut child: Child,
    link: Link,
    mut jobs: mpsc::Receiver<Job>,
    mut quit_rx: watch::Receiver<bool>,
    busy: Arc<AtomicBool>,
    settings: EngineSettings,
) {
    let handshake = tokio::select! {
        biased;
        _ = quit_rx.changed() => Err(BridgeError::Closed),
        r = link.handshake(settings.handshake_timeout) => r,
    };

    match handshake {
        Ok(()) => loop {
            let job = tokio::select! {
                biased;
                _ = quit_rx.changed() => break,
                job = jobs.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            busy.store(true, Ordering::Release);
            let result = tokio::select! {
                biased;
                _ = quit_rx.changed() => None,
                r = link.best_move(&job.fen, job.depth, settings.reply_timeout) => Some(r),
            };
            busy.store(false, Ordering::Release);

            match result {
                Some(r) => {
                    let _ = job.reply.send(r);
                    if link.is_closed() {
                        break;
                    }
                }
                None => {
                    let _ = job.reply.send(Err(BridgeError::Closed));
                    break;
                }
            }
        },
        Err(e) => {
            warn!(command = %settings.command, error = %e, "engine handshake failed");
            if let Ok(job) = jobs.try_recv() {
                let _ = job.reply.send(Err(e));
            }
        }
    }

    jobs.close();
    while let Ok(job) = jobs.try_recv() {
        let _ = job.reply.send(Err(BridgeError::Closed));
    }

    // Try graceful shutdown first
    let _ = link.send(GuiCommand::Quit).await;
    tokio::time::sleep(settings.quit_grace).await;
    let _ = child.kill().await;
    info!(command = %settings.command, "engine stopped");
}
