use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Colour;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinReason {
    Checkmate,
    Timeout,
    Resignation,
    Unknown,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WinReason::Checkmate => "checkmate",
            WinReason::Timeout => "timeout",
            WinReason::Resignation => "resignation",
            WinReason::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonDecisiveOutcome {
    Draw,
    Unknown,
}

/// Outcome of a finished (or abandoned) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameResult {
    Decisive { winner: Colour, reason: WinReason },
    NonDecisive { winner: NonDecisiveOutcome },
}

impl GameResult {
    /// Sentinel used whenever the outcome cannot be classified.
    pub const fn unknown() -> Self {
        GameResult::NonDecisive {
            winner: NonDecisiveOutcome::Unknown,
        }
    }

    pub const fn draw() -> Self {
        GameResult::NonDecisive {
            winner: NonDecisiveOutcome::Draw,
        }
    }
}

/// Classify a game from its PGN `Result` tag and its status string.
pub fn result_of(result_tag: Option<&str>, status: &str) -> GameResult {
    match result_tag {
        Some("1-0") => GameResult::Decisive {
            winner: Colour::White,
            reason: reason_of(status),
        },
        Some("0-1") => GameResult::Decisive {
            winner: Colour::Black,
            reason: reason_of(status),
        },
        Some("1/2-1/2") => GameResult::draw(),
        _ => GameResult::unknown(),
    }
}

pub fn reason_of(status: &str) -> WinReason {
    match status {
        "timeout" | "outoftime" => WinReason::Timeout,
        "mate" => WinReason::Checkmate,
        "resign" => WinReason::Resignation,
        _ => WinReason::Unknown,
    }
}
