use std::io::Write;

use super::{
    ToneSink,
    catalog::{Note, Waveform},
};

const BELL: &[u8] = b"\x07";

/// Logs the notes and optionally rings the terminal bell once per repetition.
pub struct TerminalToneSink {
    bell: bool,
}

impl TerminalToneSink {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

/// `440Hz sine +0ms 500ms vol 0.50`, one entry per note.
pub fn describe_pattern(notes: &[Note]) -> String {
    notes
        .iter()
        .map(|note| {
            let waveform = match note.waveform {
                Waveform::Sine => "sine",
                Waveform::Triangle => "triangle",
            };
            format!(
                "{:.0}Hz {} +{}ms {}ms vol {:.2}",
                note.frequency_hz, waveform, note.offset_ms, note.duration_ms, note.volume
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl ToneSink for TerminalToneSink {
    fn play_notes(&self, sound_id: &str, notes: &[Note]) -> anyhow::Result<()> {
        log::debug!(
            "Playing alarm pattern. [sound_id = {}, notes = {}]",
            sound_id,
            describe_pattern(notes)
        );

        if self.bell {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(BELL)?;
            stdout.flush()?;
        }

        Ok(())
    }

    fn silence(&self) {
        log::debug!("Alarm audio silenced");
    }
}
