//! Move stream state machine.
//!
//! [`step`] is a pure transition from the current [`StreamState`] (plus the
//! reply to a previously requested fetch) to either an event to emit or a
//! fetch to perform. [`MoveStream`] owns the single mutable slot holding the
//! latest state and performs the fetches against a [`GameSource`].

use std::time::Duration;

use chesstv_source::GameSource;
use chesstv_types::{
    config::PlaybackConfig,
    events::{GameStart, MoveEvent, Next},
    game::{Colour, Game},
    result::GameResult,
    ui::Player,
    Result,
};
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StreamState {
    #[default]
    NoGame,
    InGame {
        game: Game,
        /// Index of the next ply to emit; never exceeds `game.moves.len()`.
        move_index: usize,
        /// Consecutive continuation polls that brought no new moves.
        stale_polls: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    NextGame,
    /// Continuation poll; `backoff` is waited out before polling.
    Refresh { id: String, backoff: Duration },
}

impl FetchRequest {
    pub fn id(&self) -> Option<&str> {
        match self {
            FetchRequest::NextGame => None,
            FetchRequest::Refresh { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Emit { event: Next, state: StreamState },
    Fetch { request: FetchRequest, state: StreamState },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fruitless continuation polls tolerated before the game is given up.
    pub stale_poll_limit: u32,
    pub backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for PollPolicy {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            stale_poll_limit: config.stale_poll_limit.max(1),
            backoff: config.poll_backoff(),
        }
    }
}

pub fn step(state: StreamState, reply: Option<Game>, policy: &PollPolicy) -> Step {
    match (state, reply) {
        (StreamState::NoGame, None) => Step::Fetch {
            request: FetchRequest::NextGame,
            state: StreamState::NoGame,
        },
        (StreamState::NoGame, Some(game)) => Step::Emit {
            event: Next::GameStart(game_start(&game)),
            state: StreamState::InGame {
                game,
                move_index: 0,
                stale_polls: 0,
            },
        },
        (
            StreamState::InGame {
                game,
                move_index,
                stale_polls,
            },
            None,
        ) => {
            if let Some(event) = move_event(&game, move_index) {
                Step::Emit {
                    event: Next::Move(event),
                    state: StreamState::InGame {
                        game,
                        move_index: move_index + 1,
                        stale_polls,
                    },
                }
            } else if game.is_concluded() {
                finish(game.result())
            } else {
                let backoff = if stale_polls == 0 {
                    Duration::ZERO
                } else {
                    policy.backoff
                };
                Step::Fetch {
                    request: FetchRequest::Refresh {
                        id: game.id.clone(),
                        backoff,
                    },
                    state: StreamState::InGame {
                        game,
                        move_index,
                        stale_polls,
                    },
                }
            }
        }
        (
            StreamState::InGame {
                move_index,
                stale_polls,
                ..
            },
            Some(refreshed),
        ) => {
            if refreshed.moves.len() < move_index {
                warn!(
                    "Game {} came back with {} moves after {} were shown, moving on",
                    refreshed.id,
                    refreshed.moves.len(),
                    move_index
                );
                finish(GameResult::unknown())
            } else if move_index < refreshed.moves.len() {
                let state = StreamState::InGame {
                    game: refreshed,
                    move_index,
                    stale_polls: 0,
                };
                step(state, None, policy)
            } else if refreshed.is_concluded() {
                finish(refreshed.result())
            } else if stale_polls + 1 < policy.stale_poll_limit {
                Step::Fetch {
                    request: FetchRequest::Refresh {
                        id: refreshed.id.clone(),
                        backoff: policy.backoff,
                    },
                    state: StreamState::InGame {
                        game: refreshed,
                        move_index,
                        stale_polls: stale_polls + 1,
                    },
                }
            } else {
                warn!(
                    "Game {} made no progress after {} polls, moving on",
                    refreshed.id,
                    stale_polls + 1
                );
                finish(GameResult::unknown())
            }
        }
    }
}

fn finish(result: GameResult) -> Step {
    Step::Emit {
        event: Next::Result(result),
        state: StreamState::NoGame,
    }
}

fn game_start(game: &Game) -> GameStart {
    GameStart {
        id: game.id.clone(),
        white: Player::starting(&game.white, game.total_time),
        black: Player::starting(&game.black, game.total_time),
    }
}

fn move_event(game: &Game, index: usize) -> Option<MoveEvent> {
    let current = game.moves.get(index)?;
    Some(MoveEvent {
        fen: current.fen.clone(),
        mover: Colour::for_ply(index),
        last_move: current.last_move.clone(),
        move_delay_seconds: move_delay_seconds(game, index),
    })
}

/// Seconds the mover spent on ply `index`: their clock two plies earlier (or
/// the starting time) minus their clock after the ply. Floored at zero.
pub fn move_delay_seconds(game: &Game, index: usize) -> u32 {
    let before = index
        .checked_sub(2)
        .and_then(|earlier| game.moves.get(earlier))
        .map_or(game.total_time, |earlier| earlier.seconds_remaining);
    let after = game
        .moves
        .get(index)
        .map_or(before, |current| current.seconds_remaining);
    if after > before {
        warn!(
            "Clock went up from {}s to {}s on ply {} of game {}",
            before, after, index, game.id
        );
    }
    before.saturating_sub(after)
}

/// Stateful driver around [`step`] that performs the fetches it asks for.
pub struct MoveStream<S: GameSource> {
    source: S,
    state: StreamState,
    policy: PollPolicy,
}

impl<S: GameSource> MoveStream<S> {
    pub fn new(source: S, policy: PollPolicy) -> Self {
        Self {
            source,
            state: StreamState::NoGame,
            policy,
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Produce the next event, fetching from the source as needed. On a fetch
    /// failure the state is left as it was before the fetch.
    pub async fn next(&mut self) -> Result<Next> {
        let mut reply = None;
        loop {
            let state = std::mem::take(&mut self.state);
            match step(state, reply.take(), &self.policy) {
                Step::Emit { event, state } => {
                    self.state = state;
                    match &event {
                        Next::GameStart(start) => info!(
                            "Starting game {}: {} vs {}",
                            start.id, start.white.name, start.black.name
                        ),
                        Next::Result(result) => info!("Game finished: {:?}", result),
                        Next::Move(_) => {}
                    }
                    return Ok(event);
                }
                Step::Fetch { request, state } => {
                    self.state = state;
                    if let FetchRequest::Refresh { backoff, .. } = &request {
                        if !backoff.is_zero() {
                            sleep(*backoff).await;
                        }
                    }
                    debug!("Fetching {:?}", request);
                    reply = Some(self.source.fetch(request.id()).await?);
                }
            }
        }
    }
}
