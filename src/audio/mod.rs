pub mod catalog;
mod playback;
mod terminal;

pub use playback::{AlarmPlayback, ToneSink};
pub use terminal::{TerminalToneSink, describe_pattern};

/// Fire-and-forget alarm audio. Failures never reach the caller.
pub trait AlarmPlayer: Send + Sync {
    fn play_alarm(&self, sound_id: &str);
    fn stop_alarm(&self);
}
