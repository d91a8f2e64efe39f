use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ChessTvError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Lichess,
    Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub mode: SourceMode,
    pub base_url: String,
    /// Lichess TV channel to pick games from (`blitz`, `rapid`, ...).
    pub channel: String,
    pub batch_size: u32,
    pub fixture_path: String,
    pub request_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Lichess,
            base_url: "https://lichess.org".into(),
            channel: "blitz".into(),
            batch_size: 30,
            fixture_path: "fixtures/mock_games.ndjson".into(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub game_start_pause_ms: u64,
    pub game_end_pause_ms: u64,
    /// Grace pause so a move played in under a second is still visible.
    pub zero_delay_pause_ms: u64,
    pub clock_tick_ms: u64,
    /// Consecutive continuation polls without new moves before giving up on a game.
    pub stale_poll_limit: u32,
    pub poll_backoff_ms: u64,
}

impl PlaybackConfig {
    pub fn game_start_pause(&self) -> Duration {
        Duration::from_millis(self.game_start_pause_ms)
    }

    pub fn game_end_pause(&self) -> Duration {
        Duration::from_millis(self.game_end_pause_ms)
    }

    pub fn zero_delay_pause(&self) -> Duration {
        Duration::from_millis(self.zero_delay_pause_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn poll_backoff(&self) -> Duration {
        Duration::from_millis(self.poll_backoff_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            game_start_pause_ms: 1000,
            game_end_pause_ms: 1000,
            zero_delay_pause_ms: 400,
            clock_tick_ms: 1000,
            stale_poll_limit: 1,
            poll_backoff_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    pub log_level: String,
    pub log_file: String,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            log_level: "debug".into(),
            log_file: "logs/chesstv.log".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChessTvConfig {
    pub source: SourceConfig,
    pub playback: PlaybackConfig,
    pub ops: OpsConfig,
}

impl ChessTvConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            ChessTvError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            ChessTvError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.is_empty() {
            return Err(ChessTvError::Configuration(
                "source.base_url must not be empty".into(),
            ));
        }
        if self.source.batch_size == 0 {
            return Err(ChessTvError::Configuration(
                "source.batch_size must be greater than zero".into(),
            ));
        }
        if self.source.mode == SourceMode::Fixture && self.source.fixture_path.is_empty() {
            return Err(ChessTvError::Configuration(
                "source.fixture_path is required in fixture mode".into(),
            ));
        }
        if self.playback.clock_tick_ms == 0 {
            return Err(ChessTvError::Configuration(
                "playback.clock_tick_ms must be greater than zero".into(),
            ));
        }
        if self.playback.stale_poll_limit == 0 {
            return Err(ChessTvError::Configuration(
                "playback.stale_poll_limit must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
