//! Playback core: turns game records into paced UI transformations.

pub mod actions;
pub mod driver;
pub mod scheduler;
pub mod sink;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::to_actions;
pub use driver::{run_next, tv_loop};
pub use scheduler::{run_actions, Action, Completion};
pub use sink::{SharedUi, UiSink};
pub use stream::{step, FetchRequest, MoveStream, PollPolicy, Step, StreamState};
