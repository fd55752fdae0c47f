//! UCI driver against shell-script engines.
//!
//! Each fake engine is a `/bin/sh -c` script passed through
//! [`EngineConfig::args`], so no executable file has to be written.

#![cfg(unix)]

use centaur_engine::{
    EngineConfig, EngineError, EngineProcess, EngineSupervisor, InfoFlags, Limit, Position,
    Score, UciProcess,
};
use std::path::Path;
use std::time::{Duration, Instant};

/// Answers the handshake, logs every command to `$1`, plays e2e4.
const WELL_BEHAVED: &str = r#"
log="$1"
while read -r line; do
  echo "$line" >> "$log"
  case "$line" in
    uci) echo "id name FakeFish 1.0"; echo "option name Hash type spin default 16 min 1 max 1024"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info string thinking"
         echo "info depth 1 score cp 12 nodes 20 pv d2d4"
         echo "info depth 4 seldepth 6 score cp 31 nodes 900 nps 90000 pv e2e4 e7e5 g1f3"
         echo "bestmove e2e4 ponder e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Never answers `go` until told to stop.
const SLOW: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    stop) echo "info depth 9 score mate 2 pv h5f7"; echo "bestmove h5f7" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Dies as soon as it is asked to search.
const CRASHING: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) exit 3 ;;
  esac
done
"#;

fn sh_config(script: &str, extra: &[&str]) -> EngineConfig {
    let mut args = vec!["-c".to_string(), script.to_string(), "fake-engine".to_string()];
    args.extend(extra.iter().map(|s| (*s).to_string()));
    EngineConfig::new("/bin/sh").with_args(args)
}

fn spawn(config: &EngineConfig) -> UciProcess {
    UciProcess::spawn(
        config.validated_path().expect("path set"),
        &config.args,
        config.response_timeout(),
    )
    .expect("fake engine should start")
}

#[test]
fn handshake_records_engine_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("commands.log");
    let config = sh_config(WELL_BEHAVED, &[log.to_str().expect("utf8 path")]);

    let mut engine = spawn(&config);
    assert_eq!(engine.name(), Some("FakeFish 1.0"));
    engine.quit().expect("quit");
}

#[test]
fn analyse_keeps_last_info() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("commands.log");
    let config = sh_config(WELL_BEHAVED, &[log.to_str().expect("utf8 path")]);

    let mut engine = spawn(&config);
    let info = engine
        .analyse(&Position::startpos().with_moves(["d2d4"]), &Limit::depth(4))
        .expect("analysis");
    assert_eq!(info.depth, Some(4));
    assert_eq!(info.nodes, Some(900));
    assert_eq!(info.score, Some(Score::Cp(31)));
    assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
    engine.quit().expect("quit");

    let commands = std::fs::read_to_string(&log).expect("command log");
    assert!(commands.contains("position startpos moves d2d4"));
    assert!(commands.contains("go depth 4"));
}

#[test]
fn supervisor_applies_options_before_search() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("commands.log");
    let config = sh_config(WELL_BEHAVED, &[log.to_str().expect("utf8 path")])
        .with_option("Hash", 32)
        .with_option("Ponder", false);

    let engine = EngineSupervisor::new(config).expect("path set");
    let result = engine
        .play(&Position::startpos(), &Limit::depth(4), InfoFlags::ALL)
        .into_option()
        .expect("engine answers");
    assert_eq!(result.best_move.as_deref(), Some("e2e4"));
    assert_eq!(result.ponder.as_deref(), Some("e7e5"));
    engine.quit();

    let commands = std::fs::read_to_string(&log).expect("command log");
    let lines: Vec<&str> = commands.lines().collect();
    let hash = lines
        .iter()
        .position(|l| *l == "setoption name Hash value 32")
        .expect("Hash set");
    let ponder = lines
        .iter()
        .position(|l| *l == "setoption name Ponder value false")
        .expect("Ponder set");
    let go = lines.iter().position(|l| l.starts_with("go")).expect("searched");
    assert!(hash < go && ponder < go);
    assert_eq!(lines.last(), Some(&"quit"));
}

#[test]
fn overrunning_search_is_stopped() {
    let mut config = sh_config(SLOW, &[]);
    config.response_timeout_ms = 200;

    let mut engine = spawn(&config);
    let start = Instant::now();
    let result = engine
        .play(&Position::startpos(), &Limit::depth(30), InfoFlags::SCORE)
        .expect("stop yields a move");

    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(result.best_move.as_deref(), Some("h5f7"));
    assert_eq!(result.info.and_then(|i| i.score), Some(Score::Mate(2)));
    engine.quit().expect("quit");
}

#[test]
fn crash_mid_search_is_terminated() {
    let config = sh_config(CRASHING, &[]);
    let mut engine = spawn(&config);
    let err = engine
        .analyse(&Position::startpos(), &Limit::depth(1))
        .expect_err("engine died");
    assert!(matches!(err, EngineError::Terminated), "got {err:?}");
}

#[test]
fn supervisor_gives_up_on_crashing_engine() {
    let config = sh_config(CRASHING, &[]).with_backoff(Duration::from_millis(10));
    let engine = EngineSupervisor::new(config).expect("path set");

    let reply = engine.analyse(&Position::startpos(), &Limit::depth(1));
    assert!(reply.is_no_result());
    assert_eq!(engine.spawn_count(), 2);
    assert!(!engine.is_running());
}

#[test]
fn missing_binary_gives_no_result() {
    let engine = EngineSupervisor::new(
        EngineConfig::new(Path::new("/nonexistent/engine")).with_backoff(Duration::ZERO),
    )
    .expect("path set");

    assert!(engine
        .play(&Position::startpos(), &Limit::depth(1), InfoFlags::NONE)
        .is_no_result());
    assert_eq!(engine.spawn_count(), 0);
}

#[test]
fn huge_time_limit_still_answers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("commands.log");
    let config = sh_config(WELL_BEHAVED, &[log.to_str().expect("utf8 path")]);
    let engine = EngineSupervisor::new(config).expect("path set");

    let info = engine
        .analyse(
            &Position::startpos(),
            &Limit::time(Duration::from_secs(u64::MAX)),
        )
        .into_option()
        .expect("engine answers");
    assert_eq!(info.depth, Some(4));
    assert_eq!(engine.spawn_count(), 1);
    engine.quit();
}
