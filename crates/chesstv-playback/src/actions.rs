use chesstv_types::{
    config::PlaybackConfig,
    events::{MoveEvent, Next},
    ui::UiMessage,
};

use crate::scheduler::Action;

/// Expand an event into the paced UI transformations that present it.
///
/// A move with a non-zero delay ticks the mover's clock once per elapsed
/// second before the move is revealed.
pub fn to_actions(next: &Next, timing: &PlaybackConfig) -> Vec<Action<UiMessage>> {
    match next {
        Next::GameStart(start) => vec![
            Action::Effect(UiMessage::Start(start.clone())),
            Action::Pause(timing.game_start_pause()),
        ],
        Next::Result(result) => vec![
            Action::Effect(UiMessage::Conclude(*result)),
            Action::Pause(timing.game_end_pause()),
        ],
        Next::Move(event) if event.move_delay_seconds == 0 => vec![
            Action::Pause(timing.zero_delay_pause()),
            Action::Effect(apply_move(event)),
        ],
        Next::Move(event) => {
            let ticks = event.move_delay_seconds as usize;
            let mut actions = Vec::with_capacity(ticks * 2 + 1);
            for _ in 0..ticks {
                actions.push(Action::Pause(timing.clock_tick()));
                actions.push(Action::Effect(UiMessage::TickClock(event.mover)));
            }
            actions.push(Action::Effect(apply_move(event)));
            actions
        }
    }
}

fn apply_move(event: &MoveEvent) -> UiMessage {
    UiMessage::ApplyMove {
        fen: event.fen.clone(),
        last_move: event.last_move.clone(),
    }
}
