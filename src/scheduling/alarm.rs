use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    anniversary::{AlarmState, Anniversary, AnniversaryStore},
    audio::AlarmPlayer,
};

const FIRING_WINDOW_MS: i64 = 5000;

pub fn firing_window() -> TimeDelta {
    TimeDelta::milliseconds(FIRING_WINDOW_MS)
}

/// An enabled, pending alarm is due while `now` is within
/// `[target, target + 5s]`. Once that window is missed it never fires.
pub fn is_due(anniversary: &Anniversary, now: DateTime<Utc>) -> bool {
    anniversary.alarm_enabled
        && anniversary.alarm_state() == AlarmState::Pending
        && now >= anniversary.target
        && now <= anniversary.target + firing_window()
}

/// Fires one-shot anniversary alarms and keeps the single alarm surfaced to
/// the user.
pub struct AlarmScheduler {
    player: Arc<dyn AlarmPlayer>,
    default_sound: String,
    active: Option<Anniversary>,
}

impl AlarmScheduler {
    pub fn new(player: Arc<dyn AlarmPlayer>, default_sound: impl Into<String>) -> Self {
        Self {
            player,
            default_sound: default_sound.into(),
            active: None,
        }
    }

    /// Scans every anniversary once. Returns the records that fired on this
    /// tick, in evaluation order; the last of them becomes the active alarm.
    pub fn evaluate(&mut self, store: &mut AnniversaryStore, now: DateTime<Utc>) -> Vec<Anniversary> {
        let due = store
            .all()
            .iter()
            .filter(|anniversary| is_due(anniversary, now))
            .map(|anniversary| anniversary.id.clone())
            .collect::<Vec<_>>();

        let mut fired = Vec::with_capacity(due.len());
        for id in due {
            store.mark_triggered(&id);
            let Some(anniversary) = store.get(&id).cloned() else {
                continue;
            };

            let sound_id = anniversary
                .alarm_sound_id
                .as_deref()
                .unwrap_or(&self.default_sound);
            log::info!(
                "Alarm fired. [anniversary_id = {}, sound_id = {}, target = {}]",
                anniversary.id,
                sound_id,
                anniversary.target
            );
            self.player.play_alarm(sound_id);

            self.active = Some(anniversary.clone());
            fired.push(anniversary);
        }

        fired
    }

    pub fn active_alarm(&self) -> Option<&Anniversary> {
        self.active.as_ref()
    }

    /// Clears the surfaced alarm. The anniversary stays fired.
    pub fn dismiss_active(&mut self) -> Option<Anniversary> {
        self.active.take()
    }
}
