//! Game sources: where the games to replay come from.

pub mod convert;
pub mod fixture;
pub mod lichess;
pub mod pgn;
pub mod selection;

use std::sync::Arc;

use async_trait::async_trait;
use chesstv_types::{
    config::{SourceConfig, SourceMode},
    game::Game,
    Result,
};

pub use fixture::FixtureSource;
pub use lichess::LichessSource;

#[async_trait]
pub trait GameSource: Send + Sync {
    /// `None` picks a game worth watching; `Some(id)` fetches or refreshes that game.
    async fn fetch(&self, id: Option<&str>) -> Result<Game>;
}

#[async_trait]
impl<S> GameSource for Arc<S>
where
    S: GameSource + ?Sized,
{
    async fn fetch(&self, id: Option<&str>) -> Result<Game> {
        (**self).fetch(id).await
    }
}

/// Build the source selected by configuration.
pub fn from_config(config: &SourceConfig) -> Result<Arc<dyn GameSource>> {
    Ok(match config.mode {
        SourceMode::Lichess => Arc::new(LichessSource::new(config)?),
        SourceMode::Fixture => Arc::new(FixtureSource::new(&config.fixture_path)),
    })
}
