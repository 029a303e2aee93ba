pub const DEFAULT_SOUND_ID: &str = "zen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency_hz: f64,
    pub offset_ms: u32,
    pub duration_ms: u32,
    pub waveform: Waveform,
    pub volume: f64,
}

impl Note {
    fn new(frequency_hz: f64, offset_ms: u32, duration_ms: u32, waveform: Waveform, volume: f64) -> Self {
        Self {
            frequency_hz,
            offset_ms,
            duration_ms,
            waveform,
            volume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmSound {
    pub id: &'static str,
    pub name_en: &'static str,
    pub name_ko: &'static str,
}

pub const ALARM_SOUNDS: [AlarmSound; 5] = [
    AlarmSound {
        id: "zen",
        name_en: "Bright Morning",
        name_ko: "밝은 아침",
    },
    AlarmSound {
        id: "pulse",
        name_en: "Happy Rhythm",
        name_ko: "기분 좋은 리듬",
    },
    AlarmSound {
        id: "cosmic",
        name_en: "Sparkling Star",
        name_ko: "반짝이는 별",
    },
    AlarmSound {
        id: "chime",
        name_en: "Rising Chimes",
        name_ko: "상승하는 종소리",
    },
    AlarmSound {
        id: "steady",
        name_en: "Hopeful Wave",
        name_ko: "희망찬 파동",
    },
];

pub fn find_sound(id: &str) -> Option<&'static AlarmSound> {
    ALARM_SOUNDS.iter().find(|sound| sound.id == id)
}

/// One repetition of the sound. Unknown ids get a single A4 note.
pub fn pattern(sound_id: &str) -> Vec<Note> {
    use Waveform::{Sine, Triangle};

    match sound_id {
        "zen" => [261.63, 329.63, 392.00, 523.25]
            .into_iter()
            .zip(0u32..)
            .map(|(freq, i)| Note::new(freq, i * 200, 1200, Sine, 0.6))
            .collect(),
        "pulse" => [392.00, 440.00, 523.25, 587.33, 659.25]
            .into_iter()
            .zip(0u32..)
            .flat_map(|(freq, i)| {
                let offset = i * 150;
                [
                    Note::new(freq, offset, 400, Triangle, 0.4),
                    Note::new(freq * 2.0, offset, 200, Sine, 0.1),
                ]
            })
            .collect(),
        "cosmic" => (0..12)
            .map(|i| Note::new(880.0 * 1.059f64.powi(i as i32), i * 50, 300, Sine, 0.3))
            .collect(),
        "chime" => [523.25, 659.25, 783.99, 1046.50]
            .into_iter()
            .zip(0u32..)
            .flat_map(|(freq, i)| {
                let offset = i * 100;
                [
                    Note::new(freq, offset, 1500, Sine, 0.5),
                    Note::new(freq * 1.5, offset, 800, Sine, 0.2),
                ]
            })
            .collect(),
        "steady" => vec![
            Note::new(440.0, 0, 1000, Triangle, 0.4),
            Note::new(659.25, 500, 1000, Sine, 0.3),
        ],
        _ => vec![Note::new(440.0, 0, 500, Sine, 0.5)],
    }
}
