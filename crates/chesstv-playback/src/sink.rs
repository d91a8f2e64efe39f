use std::sync::{Arc, Mutex};

use chesstv_types::ui::{reduce, UiMessage, UiState};

/// Receiver of UI transformations emitted by the playback core.
pub trait UiSink: Send + Sync {
    fn apply(&self, message: UiMessage);
}

impl<K: UiSink + ?Sized> UiSink for Arc<K> {
    fn apply(&self, message: UiMessage) {
        (**self).apply(message)
    }
}

/// Thread-safe holder of the current [`UiState`], shared with the renderer.
#[derive(Clone, Default)]
pub struct SharedUi {
    state: Arc<Mutex<Option<UiState>>>,
}

impl SharedUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<UiState> {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl UiSink for SharedUi {
    fn apply(&self, message: UiMessage) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let prev = state.take();
        *state = reduce(prev, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chesstv_types::{
        events::GameStart,
        game::{Colour, LastMove},
        ui::Player,
    };

    #[test]
    fn shared_ui_applies_messages_in_order() {
        let ui = SharedUi::new();
        ui.apply(UiMessage::TickClock(Colour::White));
        assert!(ui.snapshot().is_none());

        let player = Player {
            name: "p".into(),
            rating: 2000,
            title: None,
            seconds_remaining: 60,
        };
        ui.apply(UiMessage::Start(GameStart {
            id: "g".into(),
            white: player.clone(),
            black: player,
        }));
        ui.apply(UiMessage::TickClock(Colour::White));
        ui.apply(UiMessage::ApplyMove {
            fen: "fen".into(),
            last_move: LastMove::new("e2", "e4"),
        });

        let state = ui.clone().snapshot().expect("state");
        assert_eq!(state.white.seconds_remaining, 59);
        assert_eq!(state.black.seconds_remaining, 60);
        assert_eq!(state.mover, Colour::Black);
        assert_eq!(state.fen, "fen");
    }
}
