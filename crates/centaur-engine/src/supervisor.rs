//! Engine supervisor.
//!
//! Owns at most one engine process and hides its failures behind a
//! request/response contract that never errors:
//!
//! ```text
//! analyse / play
//!     │
//!     ▼
//! ┌──────────────── attempt (≤ max_attempts) ─────────────────┐
//! │ no process? ── spawn + apply stored options               │
//! │ call process ── Ok ─────────────────────────► Ready(T)    │
//! │      │                                                    │
//! │     Err ── quit (errors ignored), drop handle, backoff ───┘
//! └───────────────────────────────────────────────────────────┘
//!     │ all attempts failed
//!     ▼
//! NoResult
//! ```
//!
//! Requests are serialized: the process slot is locked for the whole
//! request including backoff, so concurrent callers queue behind it and
//! never interleave commands on the same process.

use crate::config::{EngineConfig, EngineOptions};
use crate::error::EngineError;
use crate::process::{EngineProcess, EngineSpawner, UciSpawner};
use crate::retry::{retry_bounded, RetryPolicy};
use crate::search::{AnalysisInfo, EngineReply, InfoFlags, Limit, PlayResult, Position};
use centaur_types::ErrorCode;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct EngineSlot {
    process: Option<Box<dyn EngineProcess>>,
    options: Option<EngineOptions>,
    spawned: u64,
}

/// Supervises one external engine.
///
/// Thread-safe; share as `Arc<EngineSupervisor>`.
pub struct EngineSupervisor {
    config: EngineConfig,
    spawner: Arc<dyn EngineSpawner>,
    policy: RetryPolicy,
    slot: Mutex<EngineSlot>,
}

impl EngineSupervisor {
    /// Creates a supervisor for a real UCI engine.
    ///
    /// No process is started until the first request.
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingPath`] if `config` names no executable.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_spawner(config, Arc::new(UciSpawner))
    }

    /// Creates a supervisor that launches engines through `spawner`.
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingPath`] if `config` names no executable.
    pub fn with_spawner(
        config: EngineConfig,
        spawner: Arc<dyn EngineSpawner>,
    ) -> Result<Self, EngineError> {
        config.validated_path()?;

        let options = (!config.options.is_empty()).then(|| config.options.clone());
        let policy = config.retry_policy();

        Ok(Self {
            config,
            spawner,
            policy,
            slot: Mutex::new(EngineSlot {
                options,
                ..EngineSlot::default()
            }),
        })
    }

    /// Replaces the retry policy derived from the config.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stores options to apply on the next spawn.
    ///
    /// A process that is already running keeps its current options.
    pub fn configure(&self, options: EngineOptions) {
        debug!(count = options.len(), "engine options stored");
        self.slot.lock().options = Some(options);
    }

    /// Analyses `position` within `limit`.
    pub fn analyse(&self, position: &Position, limit: &Limit) -> EngineReply<AnalysisInfo> {
        self.request("analyse", |process| process.analyse(position, limit))
    }

    /// Asks the engine for a move in `position` within `limit`.
    pub fn play(&self, position: &Position, limit: &Limit, info: InfoFlags) -> EngineReply<PlayResult> {
        self.request("play", |process| process.play(position, limit, info))
    }

    /// Terminates the current process, if any.
    ///
    /// Idempotent. Failures are logged and swallowed.
    pub fn quit(&self) {
        let process = self.slot.lock().process.take();
        if let Some(mut process) = process {
            info!(name = process.name().unwrap_or("?"), "quitting engine");
            if let Err(e) = process.quit() {
                warn!(error = %e, "engine quit failed");
            }
        }
    }

    /// True while a process handle is held.
    pub fn is_running(&self) -> bool {
        self.slot.lock().process.is_some()
    }

    /// Number of processes successfully spawned so far.
    pub fn spawn_count(&self) -> u64 {
        self.slot.lock().spawned
    }

    /// The configuration this supervisor was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn request<T>(
        &self,
        operation: &'static str,
        mut call: impl FnMut(&mut dyn EngineProcess) -> Result<T, EngineError>,
    ) -> EngineReply<T> {
        let mut slot = self.slot.lock();

        let result = retry_bounded(
            &self.policy,
            &mut *slot,
            |slot, _attempt| {
                let process = self.ensure_process(slot)?;
                call(process)
            },
            |slot, attempt, err| {
                warn!(
                    operation,
                    attempt = attempt + 1,
                    max_attempts = self.policy.max_attempts(),
                    code = err.code(),
                    error = %err,
                    "engine request failed, discarding process"
                );
                discard(slot);
            },
        );

        match result {
            Some(value) => EngineReply::Ready(value),
            None => {
                error!(
                    operation,
                    attempts = self.policy.max_attempts(),
                    "engine gave no result"
                );
                EngineReply::NoResult
            }
        }
    }

    fn ensure_process<'a>(
        &self,
        slot: &'a mut EngineSlot,
    ) -> Result<&'a mut dyn EngineProcess, EngineError> {
        if slot.process.is_none() {
            let mut process = self.spawner.spawn(&self.config)?;
            if let Some(options) = &slot.options {
                if let Err(e) = process.configure(options) {
                    if let Err(quit_err) = process.quit() {
                        debug!(error = %quit_err, "ignoring quit failure on unconfigured engine");
                    }
                    return Err(e);
                }
            }
            slot.spawned += 1;
            debug!(
                spawn = slot.spawned,
                name = process.name().unwrap_or("?"),
                "engine process started"
            );
            slot.process = Some(process);
        }

        match slot.process.as_deref_mut() {
            Some(process) => Ok(process),
            None => Err(EngineError::Terminated),
        }
    }
}

impl Drop for EngineSupervisor {
    fn drop(&mut self) {
        self.quit();
    }
}

fn discard(slot: &mut EngineSlot) {
    if let Some(mut process) = slot.process.take() {
        if let Err(e) = process.quit() {
            debug!(error = %e, "ignoring quit failure on discarded engine");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBehavior, ScriptedSpawner};
    use crate::{Backoff, OptionValue};
    use std::time::{Duration, Instant};

    fn supervisor(behavior: ScriptedBehavior) -> (EngineSupervisor, ScriptedSpawner) {
        let spawner = ScriptedSpawner::new(behavior);
        let config = EngineConfig::new("/opt/engines/scripted").with_backoff(Duration::ZERO);
        let sup = EngineSupervisor::with_spawner(config, Arc::new(spawner.clone()))
            .expect("config has a path");
        (sup, spawner)
    }

    #[test]
    fn missing_path_is_config_error() {
        let result = EngineSupervisor::with_spawner(
            EngineConfig::default(),
            Arc::new(ScriptedSpawner::new(ScriptedBehavior::Succeeds)),
        );
        assert!(matches!(result, Err(EngineError::MissingPath)));
    }

    #[test]
    fn lazy_spawn_on_first_request() {
        let (sup, spawner) = supervisor(ScriptedBehavior::Succeeds);
        assert!(!sup.is_running());
        assert_eq!(spawner.journal().spawn_attempts, 0);

        let reply = sup.analyse(&Position::startpos(), &Limit::depth(4));
        assert!(reply.is_ready());
        assert!(sup.is_running());
        assert_eq!(sup.spawn_count(), 1);

        // Second request reuses the process.
        let reply = sup.play(&Position::startpos(), &Limit::depth(4), InfoFlags::NONE);
        assert_eq!(
            reply.into_option().and_then(|r| r.best_move).as_deref(),
            Some("e2e4")
        );
        assert_eq!(spawner.journal().spawn_attempts, 1);
    }

    #[test]
    fn spawn_failure_yields_no_result_after_two_attempts() {
        let (sup, spawner) = supervisor(ScriptedBehavior::SpawnFails);
        let reply = sup.analyse(&Position::startpos(), &Limit::depth(1));

        assert!(reply.is_no_result());
        assert_eq!(spawner.journal().spawn_attempts, 2);
        assert_eq!(spawner.journal().calls, 0);
        assert!(!sup.is_running());
    }

    #[test]
    fn failing_calls_discard_and_respawn() {
        let (sup, spawner) = supervisor(ScriptedBehavior::CallsFail);
        let reply = sup.play(&Position::startpos(), &Limit::depth(1), InfoFlags::ALL);

        assert!(reply.is_no_result());
        let journal = spawner.journal();
        assert_eq!(journal.spawn_attempts, 2);
        assert_eq!(journal.calls, 2);
        assert_eq!(journal.quits, 2, "each failed process is quit");
        assert!(!sup.is_running());
    }

    #[test]
    fn recovers_with_fresh_process() {
        let (sup, spawner) = supervisor(ScriptedBehavior::FailsThenSucceeds(1));
        let reply = sup.analyse(&Position::startpos(), &Limit::depth(1));

        assert!(reply.is_ready());
        assert_eq!(spawner.journal().spawn_attempts, 2);
        assert_eq!(sup.spawn_count(), 2);
    }

    #[test]
    fn backoff_bounds_elapsed_time() {
        let spawner = ScriptedSpawner::new(ScriptedBehavior::SpawnFails);
        let backoff = Duration::from_millis(60);
        let sup = EngineSupervisor::with_spawner(
            EngineConfig::new("/opt/engines/scripted").with_backoff(backoff),
            Arc::new(spawner),
        )
        .expect("config has a path");

        let start = Instant::now();
        let reply = sup.analyse(&Position::startpos(), &Limit::depth(1));
        let elapsed = start.elapsed();

        assert!(reply.is_no_result());
        assert!(elapsed >= backoff);
        assert!(elapsed < backoff * 2, "elapsed {elapsed:?}");
    }

    #[test]
    fn configure_applies_on_next_spawn() {
        let (sup, spawner) = supervisor(ScriptedBehavior::Succeeds);
        let mut options = EngineOptions::new();
        options.insert("Skill Level".into(), OptionValue::Int(5));
        sup.configure(options.clone());

        assert!(spawner.journal().configured.is_empty(), "no immediate effect");

        let _ = sup.analyse(&Position::startpos(), &Limit::depth(1));
        assert_eq!(spawner.journal().configured, vec![options]);
    }

    #[test]
    fn config_options_applied_without_configure() {
        let spawner = ScriptedSpawner::new(ScriptedBehavior::Succeeds);
        let config = EngineConfig::new("/opt/engines/scripted").with_option("Threads", 2);
        let sup = EngineSupervisor::with_spawner(config, Arc::new(spawner.clone()))
            .expect("config has a path");

        let _ = sup.analyse(&Position::startpos(), &Limit::depth(1));
        let configured = spawner.journal().configured;
        assert_eq!(configured.len(), 1);
        assert!(configured[0].contains_key("Threads"));
    }

    #[test]
    fn quit_without_process_is_noop() {
        let (sup, spawner) = supervisor(ScriptedBehavior::Succeeds);
        sup.quit();
        sup.quit();
        assert_eq!(spawner.journal().quits, 0);
    }

    #[test]
    fn quit_is_idempotent() {
        let (sup, spawner) = supervisor(ScriptedBehavior::Succeeds);
        let _ = sup.analyse(&Position::startpos(), &Limit::depth(1));
        sup.quit();
        sup.quit();
        assert_eq!(spawner.journal().quits, 1);
        assert!(!sup.is_running());
    }

    #[test]
    fn quit_failure_is_swallowed() {
        let (sup, _spawner) = supervisor(ScriptedBehavior::QuitFails);
        let _ = sup.analyse(&Position::startpos(), &Limit::depth(1));
        sup.quit();
        assert!(!sup.is_running());
    }

    #[test]
    fn failed_configure_quits_and_gives_up() {
        let (sup, spawner) = supervisor(ScriptedBehavior::ConfigureFails);
        sup.configure(EngineOptions::from([("Hash".to_string(), OptionValue::Int(64))]));

        let reply = sup.analyse(&Position::startpos(), &Limit::depth(1));
        assert!(reply.is_no_result());

        let journal = spawner.journal();
        assert_eq!(journal.spawned, 2);
        assert_eq!(journal.configured.len(), 2);
        assert_eq!(journal.quits, 2, "each unconfigured engine is quit");
        assert_eq!(journal.calls, 0);
        assert_eq!(sup.spawn_count(), 0);
        assert!(!sup.is_running());
    }

    #[test]
    fn custom_retry_policy() {
        let (sup, spawner) = supervisor(ScriptedBehavior::SpawnFails);
        let sup = sup.with_retry_policy(RetryPolicy::new(3, Backoff::None));
        assert!(sup
            .analyse(&Position::startpos(), &Limit::depth(1))
            .is_no_result());
        assert_eq!(spawner.journal().spawn_attempts, 3);
    }

    #[test]
    fn concurrent_requests_are_serialized() {
        let (sup, spawner) = supervisor(ScriptedBehavior::Succeeds);
        let sup = Arc::new(sup);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sup = Arc::clone(&sup);
                std::thread::spawn(move || sup.analyse(&Position::startpos(), &Limit::depth(1)))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().expect("no panic").is_ready());
        }
        let journal = spawner.journal();
        assert_eq!(journal.spawn_attempts, 1);
        assert_eq!(journal.calls, 4);
        assert_eq!(journal.max_in_flight, 1);
    }
}
