use std::time::Duration;

use async_trait::async_trait;
use chesstv_types::{config::SourceConfig, game::Game, ChessTvError, Result};
use reqwest::header::ACCEPT;
use tracing::{debug, info};

use crate::{
    convert::{convert, decode_envelopes, LichessGame},
    selection::{choose_game, is_valid_game},
    GameSource,
};

const USER_AGENT: &str = concat!("chesstv/", env!("CARGO_PKG_VERSION"));
const NDJSON: &str = "application/x-ndjson";
const JSON: &str = "application/json";

/// Live games from the Lichess TV channel and game export API.
pub struct LichessSource {
    client: reqwest::Client,
    base_url: String,
    channel: String,
    batch_size: u32,
}

impl LichessSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| source_error(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            channel: config.channel.clone(),
            batch_size: config.batch_size,
        })
    }

    fn batch_url(&self) -> String {
        format!(
            "{}/api/tv/{}?nb={}&pgnInJson=true&clocks=true",
            self.base_url, self.channel, self.batch_size
        )
    }

    fn export_url(&self, id: &str) -> String {
        format!(
            "{}/game/export/{}?pgnInJson=true&clocks=true",
            self.base_url, id
        )
    }

    async fn get(&self, url: &str, accept: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|err| source_error(format!("request to {url} failed: {err}")))?;
        response
            .error_for_status()
            .map_err(|err| source_error(format!("{url} answered with an error: {err}")))
    }

    async fn fetch_batch(&self) -> Result<Vec<LichessGame>> {
        let body = self
            .get(&self.batch_url(), NDJSON)
            .await?
            .text()
            .await
            .map_err(|err| source_error(format!("failed to read TV batch: {err}")))?;
        decode_envelopes(&body)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<LichessGame> {
        self.get(&self.export_url(id), JSON)
            .await?
            .json::<LichessGame>()
            .await
            .map_err(|err| source_error(format!("failed to decode game {id}: {err}")))
    }
}

#[async_trait]
impl GameSource for LichessSource {
    async fn fetch(&self, id: Option<&str>) -> Result<Game> {
        match id {
            Some(id) => convert(&self.fetch_by_id(id).await?),
            None => {
                let batch = self.fetch_batch().await?;
                let total = batch.len();
                let candidates: Vec<LichessGame> =
                    batch.into_iter().filter(is_valid_game).collect();
                info!(
                    "Choosing among {} of {} {} games",
                    candidates.len(),
                    total,
                    self.channel
                );
                convert(&choose_game(candidates)?)
            }
        }
    }
}

fn source_error(message: impl Into<String>) -> ChessTvError {
    ChessTvError::Source(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_lichess_api() {
        let config = SourceConfig {
            base_url: "https://lichess.example/".into(),
            channel: "rapid".into(),
            batch_size: 12,
            ..SourceConfig::default()
        };
        let source = LichessSource::new(&config).expect("client");
        assert_eq!(
            source.batch_url(),
            "https://lichess.example/api/tv/rapid?nb=12&pgnInJson=true&clocks=true"
        );
        assert_eq!(
            source.export_url("zOBj1ErG"),
            "https://lichess.example/game/export/zOBj1ErG?pgnInJson=true&clocks=true"
        );
    }
}
