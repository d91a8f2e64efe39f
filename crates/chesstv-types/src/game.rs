use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::result::{result_of, GameResult};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Statuses meaning the game is still being played.
pub const NON_TERMINAL_STATUSES: [&str; 2] = ["created", "started"];

/// Statuses that mark a game as finished on the board or by the clock.
pub const TERMINATION_STATUSES: [&str; 6] =
    ["mate", "resign", "stalemate", "timeout", "draw", "outoftime"];

/// Represents the two players in a chess game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    White,
    Black,
}

impl Colour {
    pub fn opponent(self) -> Self {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }

    /// Side playing the ply at `index`; white plays the even plies.
    pub fn for_ply(index: usize) -> Self {
        if index % 2 == 0 {
            Colour::White
        } else {
            Colour::Black
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::White => write!(f, "white"),
            Colour::Black => write!(f, "black"),
        }
    }
}

/// Origin and destination squares in algebraic form, e.g. `e2` -> `e4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub from: String,
    pub to: String,
}

impl LastMove {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// One ply of a fetched game with the mover's clock after it was played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMove {
    pub fen: String,
    pub seconds_remaining: u32,
    pub last_move: LastMove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub rating: u32,
    pub title: Option<String>,
}

/// A game record as supplied by a game source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    /// Starting clock for each side, in seconds.
    pub total_time: u32,
    pub status: String,
    pub moves: Vec<GameMove>,
    pub white: PlayerInfo,
    pub black: PlayerInfo,
    #[serde(default)]
    pub pgn_header: BTreeMap<String, String>,
}

impl Game {
    pub fn is_concluded(&self) -> bool {
        !NON_TERMINAL_STATUSES.contains(&self.status.as_str())
    }

    pub fn result(&self) -> GameResult {
        result_of(
            self.pgn_header.get("Result").map(String::as_str),
            &self.status,
        )
    }
}

pub fn is_terminated_status(status: &str) -> bool {
    TERMINATION_STATUSES.contains(&status)
}
