use serde::{Deserialize, Serialize};

use crate::{
    game::{Colour, LastMove},
    result::GameResult,
    ui::Player,
};

/// Announces a new game; both clocks start at the game's total time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStart {
    pub id: String,
    pub white: Player,
    pub black: Player,
}

/// A single ply to reveal after the mover's clock has run down by
/// `move_delay_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub fen: String,
    pub mover: Colour,
    pub last_move: LastMove,
    pub move_delay_seconds: u32,
}

/// Semantic playback events, in the order a game is replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Next {
    GameStart(GameStart),
    Move(MoveEvent),
    Result(GameResult),
}

impl Next {
    pub fn label(&self) -> &'static str {
        match self {
            Next::GameStart(_) => "game_start",
            Next::Move(_) => "move",
            Next::Result(_) => "result",
        }
    }
}
