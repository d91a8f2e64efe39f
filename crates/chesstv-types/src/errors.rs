use thiserror::Error;

pub type Result<T, E = ChessTvError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum ChessTvError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("game source error: {0}")]
    Source(String),
    #[error("pgn error: {0}")]
    Pgn(String),
    #[error("could not parse clock annotation in {0:?}")]
    Clock(String),
    #[error("game selection error: {0}")]
    Selection(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ChessTvError {
    fn from(err: serde_json::Error) -> Self {
        ChessTvError::Source(format!("malformed game payload: {err}"))
    }
}
