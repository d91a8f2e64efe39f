use std::time::Duration;

use tokio::time::sleep;

/// One step of a paced sequence: wait, or apply an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<E> {
    Pause(Duration),
    Effect(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Finished,
    Cancelled,
}

/// Run `actions` strictly in order. `should_continue` is checked before every
/// action; once it reports false nothing further runs, including a pause that
/// is already due. Pauses suspend this future only.
pub async fn run_actions<E, F, C>(
    actions: impl IntoIterator<Item = Action<E>>,
    mut apply: F,
    should_continue: C,
) -> Completion
where
    F: FnMut(E),
    C: Fn() -> bool,
{
    for action in actions {
        if !should_continue() {
            return Completion::Cancelled;
        }
        match action {
            Action::Pause(duration) => sleep(duration).await,
            Action::Effect(effect) => apply(effect),
        }
    }
    Completion::Finished
}
