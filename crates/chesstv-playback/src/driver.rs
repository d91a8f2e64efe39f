//! The TV loop: pull events from the move stream and play them out on a sink.

use chesstv_source::GameSource;
use chesstv_types::{config::PlaybackConfig, events::Next, Result};
use tracing::{debug, info};

use crate::{
    actions::to_actions,
    scheduler::{run_actions, Completion},
    sink::UiSink,
    stream::{MoveStream, PollPolicy},
};

/// Follow games from `source` until `should_continue` reports false.
///
/// A fetch already in flight when the flag drops is awaited, but its reply
/// is never shown. Source failures end the loop with the error.
pub async fn tv_loop<S, K, C>(
    source: S,
    sink: &K,
    config: &PlaybackConfig,
    should_continue: C,
) -> Result<()>
where
    S: GameSource,
    K: UiSink + ?Sized,
    C: Fn() -> bool,
{
    let mut stream = MoveStream::new(source, PollPolicy::from(config));
    while should_continue() {
        let next = stream.next().await?;
        debug!("Next {}: {:?}", next.label(), next);
        run_next(&next, sink, config, &should_continue).await;
    }
    info!("TV loop stopped");
    Ok(())
}

/// Play out a single event on the sink.
pub async fn run_next<K, C>(
    next: &Next,
    sink: &K,
    config: &PlaybackConfig,
    should_continue: C,
) -> Completion
where
    K: UiSink + ?Sized,
    C: Fn() -> bool,
{
    run_actions(
        to_actions(next, config),
        |message| sink.apply(message),
        should_continue,
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use chesstv_types::game::Game;

    use super::*;
    use crate::{
        sink::SharedUi,
        testing::{game1, ScriptedSource},
    };
    use chesstv_types::{
        events::{GameStart, MoveEvent},
        game::{Colour, LastMove},
        result::{GameResult, WinReason},
        ui::{Player, UiMessage},
        ChessTvError,
    };
    use tokio::time::Instant;

    fn player(name: &str, seconds_remaining: u32) -> Player {
        Player {
            name: name.into(),
            rating: 2500,
            title: None,
            seconds_remaining,
        }
    }

    fn started_ui() -> SharedUi {
        let ui = SharedUi::new();
        ui.apply(UiMessage::Start(GameStart {
            id: "game1".into(),
            white: player("p1", 10),
            black: player("p2", 20),
        }));
        ui
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_move_appears_after_grace_pause() {
        let ui = started_ui();
        let start = Instant::now();
        let next = Next::Move(MoveEvent {
            fen: "f2".into(),
            mover: Colour::White,
            last_move: LastMove::new("e2", "e4"),
            move_delay_seconds: 0,
        });

        let completion = run_next(&next, &ui, &PlaybackConfig::default(), || true).await;

        assert_eq!(completion, Completion::Finished);
        assert!(start.elapsed() >= Duration::from_millis(400));
        let state = ui.snapshot().expect("state");
        assert_eq!(state.fen, "f2");
        assert_eq!(state.mover, Colour::Black);
        assert_eq!(state.last_move, Some(LastMove::new("e2", "e4")));
        assert_eq!(state.white.seconds_remaining, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_move_runs_down_the_clock_first() {
        let ui = started_ui();
        let start = Instant::now();
        let next = Next::Move(MoveEvent {
            fen: "f2".into(),
            mover: Colour::White,
            last_move: LastMove::new("e2", "e4"),
            move_delay_seconds: 3,
        });

        run_next(&next, &ui, &PlaybackConfig::default(), || true).await;

        assert!(start.elapsed() >= Duration::from_secs(3));
        let state = ui.snapshot().expect("state");
        assert_eq!(state.white.seconds_remaining, 7);
        assert_eq!(state.black.seconds_remaining, 20);
        assert_eq!(state.fen, "f2");
    }

    #[tokio::test(start_paused = true)]
    async fn loop_plays_a_whole_game_until_stopped() {
        let ui = SharedUi::new();
        let source = ScriptedSource::new(vec![game1()]);
        let start = Instant::now();
        let watching = ui.clone();

        tv_loop(source.clone(), &ui, &PlaybackConfig::default(), move || {
            watching
                .snapshot()
                .map_or(true, |state| state.result.is_none())
        })
        .await
        .expect("loop");

        let state = ui.snapshot().expect("state");
        assert_eq!(state.id, "game1");
        assert_eq!(state.fen, game1().moves[3].fen);
        assert_eq!(state.white.seconds_remaining, 178);
        assert_eq!(state.black.seconds_remaining, 175);
        assert_eq!(state.mover, Colour::White);
        assert_eq!(
            state.result,
            Some(GameResult::Decisive {
                winner: Colour::Black,
                reason: WinReason::Timeout
            })
        );
        // start pause, two grace pauses, 2 + 5 clock ticks; the result pause is skipped
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(8_800));
        assert!(elapsed < Duration::from_millis(9_800));
        assert_eq!(source.calls(), vec![None]);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_surfaces_source_failures() {
        let ui = SharedUi::new();
        let source = ScriptedSource::new(Vec::new());
        let err = tv_loop(source, &ui, &PlaybackConfig::default(), || true)
            .await
            .unwrap_err();
        assert!(matches!(err, ChessTvError::Source(_)));
        assert!(ui.snapshot().is_none());
    }

    /// Source whose reply arrives only after the viewer has left.
    struct StopsWhileFetching {
        running: Arc<AtomicBool>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GameSource for StopsWhileFetching {
        async fn fetch(&self, _id: Option<&str>) -> chesstv_types::Result<Game> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.running.store(false, Ordering::SeqCst);
            Ok(game1())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reply_arriving_after_stop_is_not_shown() {
        let running = Arc::new(AtomicBool::new(true));
        let source = Arc::new(StopsWhileFetching {
            running: Arc::clone(&running),
            calls: AtomicUsize::new(0),
        });
        let ui = SharedUi::new();

        let flag = Arc::clone(&running);
        tv_loop(Arc::clone(&source), &ui, &PlaybackConfig::default(), move || {
            flag.load(Ordering::SeqCst)
        })
        .await
        .expect("loop");

        assert!(ui.snapshot().is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loop_never_starts_when_already_stopped() {
        let ui = SharedUi::new();
        let source = ScriptedSource::new(vec![game1()]);
        tv_loop(source.clone(), &ui, &PlaybackConfig::default(), || false)
            .await
            .expect("loop");
        assert!(source.calls().is_empty());
        assert!(ui.snapshot().is_none());
    }
}
