use anyhow::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "cli.log";

/// Initialize logging for the CLI
///
/// Logs go to stderr, and to `cli.log` inside `log_dir` when one is given.
/// `RUST_LOG` overrides `level`.
pub fn init_logging(level: Level, log_dir: Option<PathBuf>) -> Result<()> {
    match log_dir {
        Some(dir) => init_file_logging(level, &dir),
        None => init_stderr_logging(level),
    }
}

fn env_filter(level: Level) -> EnvFilter {
    let level_str = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("pm_panel={level_str},pm_panel_core={level_str},pm_panel_http={level_str}").into()
    })
}

fn init_file_logging(level: Level, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn init_stderr_logging(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
