//! UCI engine driver.
//!
//! Runs an engine as a child process and speaks the text protocol over its
//! stdin/stdout:
//!
//! ```text
//! → uci                         ← id name ... / uciok
//! → setoption name N value V    (per option)
//! → isready                     ← readyok
//! → position startpos moves ..
//! → go depth 12                 ← info depth .. score cp .. pv ..
//!                               ← bestmove e2e4 ponder e7e5
//! → quit
//! ```
//!
//! The driver is async inside: each process owns a current-thread tokio
//! runtime and every blocking method is a `block_on` over the async
//! exchange, so waits are bounded with `tokio::time::timeout`. Do not call
//! it from within another tokio runtime.

use crate::config::EngineOptions;
use crate::error::EngineError;
use crate::process::EngineProcess;
use crate::search::{AnalysisInfo, InfoFlags, Limit, PlayResult, Position, Score};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::runtime::Runtime;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Time allowed for `uci` → `uciok` and `isready` → `readyok`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for `bestmove` after `stop` was sent.
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Time allowed for the process to exit after `quit`.
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Upper bound on a single search wait.
const MAX_SEARCH_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// A running UCI engine.
pub struct UciProcess {
    conn: UciConnection,
    runtime: Runtime,
}

/// The async side: pipes of one child process.
struct UciConnection {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    name: Option<String>,
    response_timeout: Duration,
}

struct SearchOutcome {
    info: AnalysisInfo,
    best_move: Option<String>,
    ponder: Option<String>,
}

impl UciProcess {
    /// Launches the engine and completes the `uci` handshake.
    ///
    /// `response_timeout` is added to the search time of every request to
    /// form its deadline.
    ///
    /// # Errors
    ///
    /// [`EngineError::SpawnFailed`] if the binary cannot be started; any
    /// handshake failure otherwise. The child is killed on failure.
    pub fn spawn(
        path: &Path,
        args: &[String],
        response_timeout: Duration,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()?;

        let conn = runtime.block_on(UciConnection::spawn(path, args, response_timeout))?;

        debug!(
            path = %path.display(),
            pid = conn.child.id(),
            name = conn.name.as_deref().unwrap_or("?"),
            "UCI engine ready"
        );
        Ok(Self { conn, runtime })
    }
}

impl UciConnection {
    async fn spawn(
        path: &Path,
        args: &[String],
        response_timeout: Duration,
    ) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::SpawnFailed {
                path: path.to_path_buf(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(EngineError::protocol("engine pipes unavailable"));
        };

        let mut conn = Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            name: None,
            response_timeout,
        };
        conn.handshake().await?;
        Ok(conn)
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        trace!(command, "uci >>");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn recv_before(&mut self, deadline: Instant, waited: Duration) -> Result<String, EngineError> {
        match tokio::time::timeout_at(deadline, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => {
                trace!(line = %line, "uci <<");
                Ok(line)
            }
            Ok(Ok(None)) => Err(EngineError::Terminated),
            Ok(Err(e)) => Err(EngineError::Io(e)),
            Err(_) => Err(EngineError::Timeout(waited)),
        }
    }

    async fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci").await?;
        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;
        loop {
            let line = self.recv_before(deadline, HANDSHAKE_TIMEOUT).await?;
            let line = line.trim();
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = Some(name.trim().to_string());
            } else if line == "uciok" {
                return Ok(());
            }
        }
    }

    async fn configure(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        for (name, value) in options {
            self.send(&format!("setoption name {name} value {value}")).await?;
        }
        self.send("isready").await?;
        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;
        loop {
            if self.recv_before(deadline, HANDSHAKE_TIMEOUT).await?.trim() == "readyok" {
                return Ok(());
            }
        }
    }

    async fn search(&mut self, position: &Position, limit: &Limit) -> Result<SearchOutcome, EngineError> {
        self.send(&position.to_uci_command()).await?;
        self.send(&limit.to_go_command()).await?;

        let budget = search_budget(limit, self.response_timeout);
        let mut deadline = Instant::now() + budget;
        let mut stopped = false;
        let mut info = AnalysisInfo::default();

        loop {
            let line = match self.recv_before(deadline, budget).await {
                Ok(line) => line,
                Err(EngineError::Timeout(_)) if !stopped => {
                    warn!(?budget, "engine search overran, sending stop");
                    self.send("stop").await?;
                    stopped = true;
                    deadline = Instant::now() + STOP_GRACE;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let line = line.trim();
            if let Some(rest) = line.strip_prefix("info ") {
                parse_info(rest, &mut info);
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                let (best_move, ponder) = parse_bestmove(rest);
                return Ok(SearchOutcome {
                    info,
                    best_move,
                    ponder,
                });
            }
        }
    }

    async fn quit(&mut self) -> Result<(), EngineError> {
        let sent = self.send("quit").await;

        match tokio::time::timeout(QUIT_GRACE, self.child.wait()).await {
            Ok(status) => {
                status?;
            }
            Err(_) => {
                debug!(pid = self.child.id(), "engine ignored quit, killing");
                self.child.kill().await?;
            }
        }
        sent
    }
}

/// Time to wait for `bestmove`: search time plus the response timeout,
/// capped so that deadlines never overflow.
fn search_budget(limit: &Limit, response_timeout: Duration) -> Duration {
    limit
        .time
        .unwrap_or_default()
        .saturating_add(response_timeout)
        .min(MAX_SEARCH_WAIT)
}

impl EngineProcess for UciProcess {
    fn name(&self) -> Option<&str> {
        self.conn.name.as_deref()
    }

    fn configure(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.runtime.block_on(self.conn.configure(options))
    }

    fn analyse(&mut self, position: &Position, limit: &Limit) -> Result<AnalysisInfo, EngineError> {
        let outcome = self.runtime.block_on(self.conn.search(position, limit))?;
        Ok(outcome.info)
    }

    fn play(
        &mut self,
        position: &Position,
        limit: &Limit,
        info: InfoFlags,
    ) -> Result<PlayResult, EngineError> {
        let outcome = self.runtime.block_on(self.conn.search(position, limit))?;
        Ok(PlayResult {
            best_move: outcome.best_move,
            ponder: outcome.ponder,
            info: (!info.is_empty()).then(|| outcome.info.filtered(info)),
        })
    }

    fn quit(&mut self) -> Result<(), EngineError> {
        self.runtime.block_on(self.conn.quit())
    }
}

impl Drop for UciProcess {
    fn drop(&mut self) {
        let running = {
            let _runtime = self.runtime.enter();
            matches!(self.conn.child.try_wait(), Ok(None))
        };
        if running {
            let child = &mut self.conn.child;
            if let Err(e) = self.runtime.block_on(child.kill()) {
                debug!(error = %e, "failed to kill engine on drop");
            }
        }
    }
}

/// Folds one `info` line into the running analysis record.
///
/// Only fields present on the line are updated; `info string` lines are
/// ignored.
pub(crate) fn parse_info(rest: &str, info: &mut AnalysisInfo) {
    let mut tokens = rest.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "string" => return,
            "depth" => {
                if let Some(depth) = tokens.next().and_then(|t| t.parse().ok()) {
                    info.depth = Some(depth);
                }
            }
            "nodes" => {
                if let Some(nodes) = tokens.next().and_then(|t| t.parse().ok()) {
                    info.nodes = Some(nodes);
                }
            }
            "score" => {
                let kind = tokens.next();
                let value = tokens.next().and_then(|t| t.parse().ok());
                info.score = match (kind, value) {
                    (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                    (Some("mate"), Some(n)) => Some(Score::Mate(n)),
                    _ => info.score,
                };
            }
            "pv" => {
                info.pv = tokens.by_ref().map(str::to_string).collect();
            }
            _ => {}
        }
    }
}

/// Parses the remainder of a `bestmove` line into (move, ponder).
pub(crate) fn parse_bestmove(rest: &str) -> (Option<String>, Option<String>) {
    let mut tokens = rest.split_whitespace();
    let best = tokens
        .next()
        .filter(|m| *m != "(none)" && *m != "0000")
        .map(str::to_string);
    let mut ponder = None;
    while let Some(token) = tokens.next() {
        if token == "ponder" {
            ponder = tokens.next().map(str::to_string);
        }
    }
    (best, ponder)
}
