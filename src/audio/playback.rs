use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    AlarmPlayer,
    catalog::{self, Note},
};

/// Where notes end up. Implementations must not block.
pub trait ToneSink: Send + Sync + 'static {
    fn play_notes(&self, sound_id: &str, notes: &[Note]) -> anyhow::Result<()>;
    fn silence(&self);
}

struct ActivePlayback {
    cancellation_token: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the single alarm playback slot. Starting a sound always stops the
/// previous one first; playback cuts itself off after `duration`.
pub struct AlarmPlayback {
    sink: Arc<dyn ToneSink>,
    duration: Duration,
    loop_interval: Duration,
    active: Mutex<Option<ActivePlayback>>,
}

impl AlarmPlayback {
    pub fn new(sink: Arc<dyn ToneSink>, duration: Duration, loop_interval: Duration) -> Self {
        Self {
            sink,
            duration,
            loop_interval,
            active: Mutex::new(None),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|playback| !playback.task.is_finished())
    }
}

impl AlarmPlayer for AlarmPlayback {
    fn play_alarm(&self, sound_id: &str) {
        self.stop_alarm();

        let notes = catalog::pattern(sound_id);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!(
                "No runtime for looping playback, playing once. [sound_id = {}]",
                sound_id
            );
            if let Err(error) = self.sink.play_notes(sound_id, &notes) {
                log::warn!("Alarm playback failed. [sound_id = {}, error = {}]", sound_id, error);
            }
            return;
        };

        let cancellation_token = CancellationToken::new();
        let task = runtime.spawn(run_playback(
            Arc::clone(&self.sink),
            sound_id.to_owned(),
            notes,
            self.duration,
            self.loop_interval,
            cancellation_token.child_token(),
        ));

        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(ActivePlayback {
            cancellation_token,
            task,
        });
    }

    fn stop_alarm(&self) {
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(playback) = previous {
            if !playback.task.is_finished() {
                playback.cancellation_token.cancel();
                self.sink.silence();
            }
        }
    }
}

async fn run_playback(
    sink: Arc<dyn ToneSink>,
    sound_id: String,
    notes: Vec<Note>,
    duration: Duration,
    loop_interval: Duration,
    cancellation_token: CancellationToken,
) {
    let cutoff = tokio::time::sleep(duration);
    tokio::pin!(cutoff);
    let mut repeat = tokio::time::interval(loop_interval);

    loop {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                log::debug!("Alarm playback stopped. [sound_id = {}]", sound_id);
                return;
            }
            _ = &mut cutoff => {
                log::debug!("Alarm playback reached its cutoff. [sound_id = {}]", sound_id);
                sink.silence();
                return;
            }
            _ = repeat.tick() => {
                if let Err(error) = sink.play_notes(&sound_id, &notes) {
                    log::warn!("Alarm playback failed. [sound_id = {}, error = {}]", sound_id, error);
                }
            }
        }
    }
}
