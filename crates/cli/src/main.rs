//! pm-panel CLI - drive the admin panel pipeline from a terminal

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "pm-panel")]
#[command(about = "Run admin panel exchanges against the project management API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Settings file (TOML); defaults to the platform config directory
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Session state file holding the token and API base
    #[arg(short = 's', long, global = true, env = "PM_PANEL_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_file = config::state_file_path(cli.state_file)?;
    let log_dir = if cli.no_file_log {
        None
    } else {
        state_file.parent().map(PathBuf::from)
    };
    logging::init_logging(cli.log_level.into(), log_dir)?;

    let settings = config::load_settings(cli.config.as_deref())?;
    info!(state_file = %state_file.display(), api_base = %settings.api_base, "Starting pm-panel");

    match cli.command.execute(settings, state_file).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
