use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cave::CaveGame;
use crate::config::GameConfig;
use crate::core::engine::Engine;
use crate::core::input::InputState;
use crate::core::terminal::TerminalSession;

#[derive(Parser)]
#[command(name = "caverna")]
#[command(about = "Explore a dark cave, collect the crystals, mind the pits")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON file overriding the default cave settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Where to write logs (the terminal is busy drawing the game)
    #[arg(long, global = true, default_value = "caverna.log")]
    pub log_file: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the game (the default)
    Play {
        /// Seed for crystal placement; random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Print the effective configuration as JSON
    Config,
}

/// Sends `tracing` output to `path`, filtered by `RUST_LOG` (default `info`).
pub fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path),
        None => Ok(GameConfig::default()),
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config) => {
            let config = load_config(cli.config.as_deref())?;
            println!("{}", config.to_pretty_json()?);
        }
        Some(Commands::Play { seed }) => play(&cli.log_file, cli.config.as_deref(), seed).await?,
        None => play(&cli.log_file, cli.config.as_deref(), None).await?,
    }

    Ok(())
}

async fn play(log_file: &Path, config_path: Option<&Path>, seed: Option<u64>) -> Result<()> {
    init_logging(log_file)?;
    let config = load_config(config_path)?;
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "starting caverna");

    let game = CaveGame::new(config, seed);
    let mut session = TerminalSession::enter()?;
    let input = InputState::new(session.reports_releases());
    let result = Engine::new(game, input).run(&mut session.terminal).await;
    drop(session);

    let game = result?;
    info!(phase = ?game.phase(), "session closed");
    Ok(())
}
