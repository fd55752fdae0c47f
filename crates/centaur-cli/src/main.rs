//! `centaur` - engine check and configuration tool for Centaur plugins.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`CENTAUR_*`)
//! 3. Project config (`.centaur/config.toml` in the project directory)
//! 4. Global config (`~/.centaur/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Exit Codes
//!
//! - `0`: success
//! - `1`: configuration or usage error
//! - `2`: the engine produced no result; try again later

use anyhow::{Context, Result};
use centaur_cli::config::{CentaurConfig, ConfigLoader};
use centaur_engine::{
    AnalysisInfo, EngineReply, EngineSupervisor, InfoFlags, Limit, PlayResult, Position,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit code for "engine gave no result".
const EXIT_NO_RESULT: u8 = 2;

/// Search time when neither --depth nor --movetime is given.
const DEFAULT_MOVETIME_MS: u64 = 1000;

/// Centaur plugin tool
#[derive(Parser, Debug)]
#[command(name = "centaur")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Engine executable (overrides config and CENTAUR_ENGINE_PATH)
    #[arg(long, value_name = "PATH")]
    engine: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a position and print the engine's evaluation
    Analyse(SearchArgs),
    /// Ask the engine for a move
    Play(SearchArgs),
    /// Print the resolved configuration
    Config,
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
    /// Start position as FEN (default: standard start position)
    #[arg(long)]
    fen: Option<String>,

    /// Moves played from the start position, in UCI notation
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,

    /// Search depth in plies
    #[arg(long, conflicts_with = "movetime")]
    depth: Option<u32>,

    /// Search time in milliseconds
    #[arg(long, value_name = "MS")]
    movetime: Option<u64>,
}

impl SearchArgs {
    fn position(&self) -> Position {
        let position = match &self.fen {
            Some(fen) => Position::from_fen(fen.clone()),
            None => Position::startpos(),
        };
        position.with_moves(self.moves.iter().cloned())
    }

    fn limit(&self) -> Limit {
        match (self.depth, self.movetime) {
            (Some(depth), _) => Limit::depth(depth),
            (None, Some(ms)) => Limit::time(Duration::from_millis(ms)),
            (None, None) => Limit::time(Duration::from_millis(DEFAULT_MOVETIME_MS)),
        }
    }
}

fn resolve_config(args: &Args) -> Result<CentaurConfig> {
    let project_root = args.project.clone().unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to get current directory, using '.'");
            PathBuf::from(".")
        })
    });

    let mut config = ConfigLoader::new()
        .with_project_root(&project_root)
        .load()
        .context("Config error")?;

    // CLI args override (highest priority)
    if args.debug {
        config.debug = true;
    }
    if let Some(ref path) = args.engine {
        config.engine.path = Some(path.clone());
    }

    Ok(config)
}

fn init_tracing(args: &Args, config: &CentaurConfig) {
    // --debug > --verbose > RUST_LOG > "warn"
    let filter = if args.debug || config.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_analysis(info: &AnalysisInfo) {
    let mut line = Vec::new();
    if let Some(depth) = info.depth {
        line.push(format!("depth {depth}"));
    }
    if let Some(score) = info.score {
        line.push(format!("score {score}"));
    }
    if let Some(nodes) = info.nodes {
        line.push(format!("nodes {nodes}"));
    }
    if !info.pv.is_empty() {
        line.push(format!("pv {}", info.pv.join(" ")));
    }
    println!("{}", line.join(" "));
}

fn print_move(result: &PlayResult) {
    match (&result.best_move, &result.ponder) {
        (Some(best), Some(ponder)) => println!("bestmove {best} ponder {ponder}"),
        (Some(best), None) => println!("bestmove {best}"),
        (None, _) => println!("bestmove (none)"),
    }
}

fn finish<T>(reply: EngineReply<T>, print: impl FnOnce(&T)) -> ExitCode {
    match reply {
        EngineReply::Ready(value) => {
            print(&value);
            ExitCode::SUCCESS
        }
        EngineReply::NoResult => {
            println!("no result");
            ExitCode::from(EXIT_NO_RESULT)
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = resolve_config(&args)?;
    init_tracing(&args, &config);

    debug!(?config, "Resolved configuration");

    let search = match &args.command {
        Command::Config => {
            print!("{}", config.to_toml().context("Config error")?);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Analyse(search) | Command::Play(search) => search,
    };

    let engine = EngineSupervisor::new(config.engine.clone()).context("Config error")?;
    let position = search.position();
    let limit = search.limit();
    info!(position = %position.to_uci_command(), go = %limit.to_go_command(), "Searching");

    let code = match args.command {
        Command::Analyse(_) => finish(engine.analyse(&position, &limit), print_analysis),
        _ => finish(engine.play(&position, &limit, InfoFlags::NONE), print_move),
    };

    engine.quit();
    Ok(code)
}
