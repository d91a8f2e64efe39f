//! Playback sessions started and stopped by the TV screen.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use chesstv_playback::{tv_loop, SharedUi};
use chesstv_source::GameSource;
use chesstv_types::{config::PlaybackConfig, ui::UiState};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{error, info};

/// Starts a fresh TV loop each time the TV screen is entered.
pub struct Launcher {
    runtime: Handle,
    source: Arc<dyn GameSource>,
    playback: PlaybackConfig,
}

impl Launcher {
    pub fn new(runtime: Handle, source: Arc<dyn GameSource>, playback: PlaybackConfig) -> Self {
        Self {
            runtime,
            source,
            playback,
        }
    }

    pub fn start(&self) -> TvSession {
        let ui = SharedUi::new();
        let running = Arc::new(AtomicBool::new(true));
        let failure = Arc::new(Mutex::new(None));

        let task = {
            let ui = ui.clone();
            let running = Arc::clone(&running);
            let failure = Arc::clone(&failure);
            let source = Arc::clone(&self.source);
            let playback = self.playback.clone();
            self.runtime.spawn(async move {
                info!("TV session started");
                let outcome =
                    tv_loop(source, &ui, &playback, || running.load(Ordering::SeqCst)).await;
                running.store(false, Ordering::SeqCst);
                if let Err(err) = outcome {
                    error!("Playback stopped: {err}");
                    *failure.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
                        Some(err.to_string());
                }
            })
        };

        TvSession {
            ui,
            running,
            failure,
            task,
        }
    }
}

/// One visit to the TV screen.
pub struct TvSession {
    ui: SharedUi,
    running: Arc<AtomicBool>,
    failure: Arc<Mutex<Option<String>>>,
    task: JoinHandle<()>,
}

impl TvSession {
    pub fn snapshot(&self) -> Option<UiState> {
        self.ui.snapshot()
    }

    /// Why playback ended, if it ended on an error.
    pub fn failure(&self) -> Option<String> {
        self.failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Clear the liveness flag and drop the loop wherever it is parked.
    pub fn stop(self) {
        self.running.store(false, Ordering::SeqCst);
        self.task.abort();
        info!("TV session stopped");
    }
}
