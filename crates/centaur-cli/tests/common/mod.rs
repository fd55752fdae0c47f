//! Shared helpers for `centaur` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

pub const TIMEOUT: Duration = Duration::from_secs(20);

const CENTAUR_VARS: &[&str] = &[
    "CENTAUR_DEBUG",
    "CENTAUR_ENGINE_PATH",
    "CENTAUR_ENGINE_BACKOFF_MS",
    "RUST_LOG",
];

/// Plays e2e4 at any depth; reports a mate score.
pub const FAKE_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name FakeFish"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 5 score mate 3 nodes 4242 pv e2e4 e7e5"; echo "bestmove e2e4 ponder e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Exits as soon as it is asked to search.
pub const CRASHING_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) exit 1 ;;
  esac
done
"#;

/// An isolated project: fresh HOME, empty project dir, no CENTAUR_* env.
pub struct Sandbox {
    pub home: TempDir,
    pub project: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temp home"),
            project: tempfile::tempdir().expect("create temp project"),
        }
    }

    /// A command running in this sandbox.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd: assert_cmd::Command = cargo_bin_cmd!("centaur");
        cmd.timeout(TIMEOUT);
        for var in CENTAUR_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.home.path());
        cmd.arg("-C").arg(self.project.path());
        cmd
    }

    /// Writes `<project>/.centaur/config.toml`.
    pub fn project_config(&self, content: &str) {
        write_config(self.project.path(), content);
    }

    /// Writes `~/.centaur/config.toml`.
    pub fn global_config(&self, content: &str) {
        write_config(self.home.path(), content);
    }

    /// Project config that runs `script` under `/bin/sh`.
    pub fn sh_engine(&self, script: &str, backoff_ms: u64) {
        let script = script.replace('\\', "\\\\").replace('"', "\\\"");
        let script = script.replace('\n', "\\n");
        self.project_config(&format!(
            "[engine]\npath = \"/bin/sh\"\nargs = [\"-c\", \"{script}\"]\nbackoff_ms = {backoff_ms}\n"
        ));
    }
}

fn write_config(root: &Path, content: &str) {
    let dir = root.join(".centaur");
    std::fs::create_dir_all(&dir).expect("create .centaur");
    std::fs::write(dir.join("config.toml"), content).expect("write config");
}
