//! Operational helpers: file logging for the terminal app.

use std::{
    fs::{self, File, OpenOptions},
    path::Path,
    sync::Mutex,
};

use chesstv_types::{config::OpsConfig, ChessTvError, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Logs go to `config.log_file` since the
/// terminal belongs to the TV screen; when `enabled` is false nothing is
/// installed and every event is dropped.
pub fn init_tracing(config: &OpsConfig, enabled: bool) -> Result<()> {
    if !enabled {
        return Ok(());
    }
    let filter = log_filter(&config.log_level)?;
    let file = open_log_file(&config.log_file)?;

    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| ChessTvError::Ops(format!("tracing init error: {err}")))?;
    info!("Logging to {}", config.log_file);
    Ok(())
}

pub fn log_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| ChessTvError::Ops(format!("failed to create log filter: {err}")))
}

/// Open `path` for appending, creating it and its parent directory as needed.
pub fn open_log_file(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|err| {
            ChessTvError::Ops(format!("failed to create log dir {}: {err}", dir.display()))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| {
            ChessTvError::Ops(format!("failed to open log file {}: {err}", path.display()))
        })
}
