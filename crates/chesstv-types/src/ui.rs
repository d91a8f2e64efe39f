use serde::{Deserialize, Serialize};

use crate::{
    events::GameStart,
    game::{Colour, LastMove, PlayerInfo, STARTING_FEN},
    result::{GameResult, NonDecisiveOutcome, WinReason},
};

const ELLIPSIS: &str = "...";

/// Player as shown on screen, with a live clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub rating: u32,
    pub title: Option<String>,
    pub seconds_remaining: u32,
}

impl Player {
    pub fn starting(info: &PlayerInfo, total_time: u32) -> Self {
        Self {
            name: info.name.clone(),
            rating: info.rating,
            title: info.title.clone(),
            seconds_remaining: total_time,
        }
    }
}

/// Renderer-facing snapshot of the game being watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub id: String,
    pub fen: String,
    pub last_move: Option<LastMove>,
    pub white: Player,
    pub black: Player,
    pub mover: Colour,
    pub result: Option<GameResult>,
}

impl UiState {
    pub fn from_start(start: &GameStart) -> Self {
        Self {
            id: start.id.clone(),
            fen: STARTING_FEN.to_string(),
            last_move: None,
            white: start.white.clone(),
            black: start.black.clone(),
            mover: Colour::White,
            result: None,
        }
    }

    pub fn player(&self, colour: Colour) -> &Player {
        match colour {
            Colour::White => &self.white,
            Colour::Black => &self.black,
        }
    }

    fn player_mut(&mut self, colour: Colour) -> &mut Player {
        match colour {
            Colour::White => &mut self.white,
            Colour::Black => &mut self.black,
        }
    }
}

/// Transformation requested by the playback core; applied with [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiMessage {
    /// Replace whatever is shown with a fresh board and full clocks.
    Start(GameStart),
    /// Take one second off the given side's clock.
    TickClock(Colour),
    /// Reveal a ply and hand the move to the other side.
    ApplyMove { fen: String, last_move: LastMove },
    /// Attach the final result to the current game.
    Conclude(GameResult),
}

/// Apply a message to the previous UI state. Only `Start` can create a state;
/// every other message leaves an absent state absent.
pub fn reduce(prev: Option<UiState>, message: &UiMessage) -> Option<UiState> {
    match message {
        UiMessage::Start(start) => Some(UiState::from_start(start)),
        UiMessage::TickClock(colour) => prev.map(|mut state| {
            let player = state.player_mut(*colour);
            player.seconds_remaining = player.seconds_remaining.saturating_sub(1);
            state
        }),
        UiMessage::ApplyMove { fen, last_move } => prev.map(|mut state| {
            state.fen = fen.clone();
            state.last_move = Some(last_move.clone());
            state.mover = state.mover.opponent();
            state
        }),
        UiMessage::Conclude(result) => prev.map(|mut state| {
            state.result = Some(*result);
            state
        }),
    }
}

pub fn format_game_result(result: &GameResult) -> String {
    let by = |reason: &WinReason| match reason {
        WinReason::Unknown => String::new(),
        other => format!(" by {other}"),
    };
    match result {
        GameResult::NonDecisive {
            winner: NonDecisiveOutcome::Draw,
        } => "1/2 - 1/2".to_string(),
        GameResult::NonDecisive {
            winner: NonDecisiveOutcome::Unknown,
        } => "Error moving to next game".to_string(),
        GameResult::Decisive {
            winner: Colour::White,
            reason,
        } => format!("1-0: White wins{}", by(reason)),
        GameResult::Decisive {
            winner: Colour::Black,
            reason,
        } => format!("0-1: Black wins{}", by(reason)),
    }
}

/// Shorten long names so the player panel fits next to the board.
pub fn format_player_name(name: &str, has_title: bool) -> String {
    let (limit, keep) = if has_title { (16, 13) } else { (19, 16) };
    if name.chars().count() > limit {
        let mut short: String = name.chars().take(keep).collect();
        short.push_str(ELLIPSIS);
        short
    } else {
        name.to_string()
    }
}
