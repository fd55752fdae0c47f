//! Scripted engines for tests.
//!
//! [`ScriptedSpawner`] stands in for [`UciSpawner`](crate::UciSpawner) and
//! records every interaction in a shared [`Journal`].

use crate::config::{EngineConfig, EngineOptions};
use crate::error::EngineError;
use crate::process::{EngineProcess, EngineSpawner};
use crate::search::{AnalysisInfo, InfoFlags, Limit, PlayResult, Position, Score};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// How scripted engines behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedBehavior {
    /// Every spawn fails.
    SpawnFails,
    /// Spawns succeed, every analyse/play call fails.
    CallsFail,
    /// Everything succeeds.
    Succeeds,
    /// The first `n` spawned processes fail their calls; later ones succeed.
    FailsThenSucceeds(u32),
    /// Everything succeeds except `quit`.
    QuitFails,
    /// Spawns succeed but `configure` and `quit` fail.
    ConfigureFails,
}

/// Record of everything scripted engines were asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    pub spawn_attempts: u32,
    pub spawned: u32,
    /// Options passed to `configure`, one entry per call.
    pub configured: Vec<EngineOptions>,
    /// analyse + play calls.
    pub calls: u32,
    pub quits: u32,
    /// Positions searched, in order.
    pub positions: Vec<Position>,
    in_flight: u32,
    /// Highest number of calls observed running at once.
    pub max_in_flight: u32,
}

/// Spawner producing [`ScriptedProcess`]es.
#[derive(Clone)]
pub struct ScriptedSpawner {
    behavior: ScriptedBehavior,
    best_move: String,
    journal: Arc<Mutex<Journal>>,
}

impl ScriptedSpawner {
    pub fn new(behavior: ScriptedBehavior) -> Self {
        Self {
            behavior,
            best_move: "e2e4".to_string(),
            journal: Arc::new(Mutex::new(Journal::default())),
        }
    }

    /// Move returned by `play`. Defaults to `e2e4`.
    #[must_use]
    pub fn with_best_move(mut self, uci_move: &str) -> Self {
        self.best_move = uci_move.to_string();
        self
    }

    /// Snapshot of the journal.
    pub fn journal(&self) -> Journal {
        self.journal.lock().clone()
    }
}

impl EngineSpawner for ScriptedSpawner {
    fn spawn(&self, config: &EngineConfig) -> Result<Box<dyn EngineProcess>, EngineError> {
        let path = config.validated_path()?.to_path_buf();
        let serial = {
            let mut journal = self.journal.lock();
            journal.spawn_attempts += 1;
            if self.behavior == ScriptedBehavior::SpawnFails {
                return Err(EngineError::SpawnFailed {
                    path,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted"),
                });
            }
            journal.spawned += 1;
            journal.spawned
        };

        let fails = match self.behavior {
            ScriptedBehavior::CallsFail => true,
            ScriptedBehavior::FailsThenSucceeds(n) => serial <= n,
            _ => false,
        };

        Ok(Box::new(ScriptedProcess {
            path,
            fails,
            configure_fails: self.behavior == ScriptedBehavior::ConfigureFails,
            quit_fails: matches!(
                self.behavior,
                ScriptedBehavior::QuitFails | ScriptedBehavior::ConfigureFails
            ),
            best_move: self.best_move.clone(),
            journal: Arc::clone(&self.journal),
        }))
    }
}

/// One scripted engine.
pub struct ScriptedProcess {
    path: PathBuf,
    fails: bool,
    configure_fails: bool,
    quit_fails: bool,
    best_move: String,
    journal: Arc<Mutex<Journal>>,
}

impl ScriptedProcess {
    fn call<T>(&self, position: &Position, answer: impl FnOnce() -> T) -> Result<T, EngineError> {
        {
            let mut journal = self.journal.lock();
            journal.calls += 1;
            journal.in_flight += 1;
            journal.max_in_flight = journal.max_in_flight.max(journal.in_flight);
            journal.positions.push(position.clone());
        }

        // Widen the window in which overlapping calls would be observed.
        std::thread::sleep(std::time::Duration::from_millis(2));

        self.journal.lock().in_flight -= 1;
        if self.fails {
            Err(EngineError::Terminated)
        } else {
            Ok(answer())
        }
    }

    fn analysis(&self) -> AnalysisInfo {
        AnalysisInfo {
            depth: Some(1),
            nodes: Some(20),
            score: Some(Score::Cp(0)),
            pv: vec![self.best_move.clone()],
        }
    }
}

impl EngineProcess for ScriptedProcess {
    fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    fn configure(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.journal.lock().configured.push(options.clone());
        if self.configure_fails {
            return Err(EngineError::Timeout(std::time::Duration::from_secs(10)));
        }
        Ok(())
    }

    fn analyse(&mut self, position: &Position, _limit: &Limit) -> Result<AnalysisInfo, EngineError> {
        let info = self.analysis();
        self.call(position, || info)
    }

    fn play(
        &mut self,
        position: &Position,
        _limit: &Limit,
        flags: InfoFlags,
    ) -> Result<PlayResult, EngineError> {
        let info = self.analysis();
        let best_move = self.best_move.clone();
        self.call(position, || PlayResult {
            best_move: Some(best_move),
            ponder: None,
            info: (!flags.is_empty()).then(|| info.filtered(flags)),
        })
    }

    fn quit(&mut self) -> Result<(), EngineError> {
        self.journal.lock().quits += 1;
        if self.quit_fails {
            Err(EngineError::protocol("scripted quit failure"))
        } else {
            Ok(())
        }
    }
}
