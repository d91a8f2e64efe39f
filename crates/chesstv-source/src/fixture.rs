use std::path::PathBuf;

use async_trait::async_trait;
use chesstv_types::{game::Game, ChessTvError, Result};
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    convert::{convert, decode_envelopes},
    GameSource,
};

/// Offline source that cycles through a fixed NDJSON file of recorded games.
pub struct FixtureSource {
    path: PathBuf,
    state: Mutex<FixtureState>,
}

#[derive(Default)]
struct FixtureState {
    games: Vec<Game>,
    cursor: usize,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(FixtureState::default()),
        }
    }

    async fn load(&self) -> Result<Vec<Game>> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            ChessTvError::Source(format!(
                "unable to read fixture games {}: {err}",
                self.path.display()
            ))
        })?;
        let games = decode_envelopes(&body)?
            .iter()
            .map(convert)
            .collect::<Result<Vec<_>>>()?;
        info!("Loaded {} fixture games from {:?}", games.len(), self.path);
        Ok(games)
    }
}

#[async_trait]
impl GameSource for FixtureSource {
    async fn fetch(&self, id: Option<&str>) -> Result<Game> {
        if let Some(id) = id {
            return Err(ChessTvError::Source(format!(
                "fixture source does not support queries by id ({id})"
            )));
        }
        let mut state = self.state.lock().await;
        if state.games.is_empty() {
            state.games = self.load().await?;
        }
        if state.cursor >= state.games.len() {
            state.cursor = 0;
        }
        let game = state.games.get(state.cursor).cloned().ok_or_else(|| {
            ChessTvError::Source("fixture source is misconfigured, no games available".into())
        })?;
        state.cursor += 1;
        Ok(game)
    }
}
