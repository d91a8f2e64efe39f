mod board;
mod session;
mod ui;

use anyhow::Result;
use chesstv_ops::init_tracing;
use chesstv_types::config::{ChessTvConfig, SourceMode};
use clap::{ArgAction, Parser};
use tokio::runtime::Handle;
use tracing::info;

use crate::session::Launcher;

#[derive(Parser, Debug)]
#[command(name = "chesstv")]
#[command(about = "Watch live Lichess TV games in the terminal")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "CHESSTV_CONFIG", default_value = "configs/dev.toml")]
    config: String,

    /// Draw on the alternate screen
    #[arg(short, long, action = ArgAction::Set, default_value_t = true)]
    fullscreen: bool,

    /// Write logs to the configured log file
    #[arg(short = 'l', long)]
    enable_logging: bool,

    /// Replay games from the local fixture file instead of Lichess
    #[arg(short, long)]
    mocked: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args.config);
    if args.mocked {
        config.source.mode = SourceMode::Fixture;
    }
    init_tracing(&config.ops, args.enable_logging)?;
    info!("Starting Chess TV with {:?} source", config.source.mode);

    let source = chesstv_source::from_config(&config.source)?;
    let launcher = Launcher::new(Handle::current(), source, config.playback.clone());
    let site_url = config.source.base_url.clone();
    let fullscreen = args.fullscreen;
    tokio::task::spawn_blocking(move || ui::run(launcher, &site_url, fullscreen)).await??;

    info!("Chess TV stopped");
    Ok(())
}

fn load_config(path: &str) -> ChessTvConfig {
    match ChessTvConfig::from_file(path) {
        Ok(cfg) => {
            if let Err(err) = cfg.validate() {
                eprintln!(
                    "Invalid config in '{}': {err}. Falling back to internal defaults.",
                    path
                );
                ChessTvConfig::default()
            } else {
                cfg
            }
        }
        Err(err) => {
            eprintln!(
                "Failed to load config from '{}': {err}. Falling back to internal defaults.",
                path
            );
            ChessTvConfig::default()
        }
    }
}
