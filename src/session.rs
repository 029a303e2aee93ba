use std::sync::Arc;

use chrono::{DateTime, Local, Utc};

use crate::{
    anniversary::{Anniversary, AnniversaryForm, AnniversaryId, AnniversaryStore, BirthEntry, EntryError},
    appsettings::AppSettings,
    audio::AlarmPlayer,
    progress::{LifeProgress, compute_progress},
    profile::{Language, Profile},
    scheduling::{AlarmScheduler, Tick},
    sponsored::SponsoredItem,
    storage::PersistenceSender,
    timeline::{TimelineEntry, compose_timeline},
    units::UnitNavigator,
};

/// What one tick produced. Progress and alarm evaluation share `now`.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: Tick,
    pub progress: Option<LifeProgress>,
    pub fired: Vec<Anniversary>,
}

/// The live application state, driven by ticks and user actions on a single
/// task.
pub struct Session {
    store: AnniversaryStore,
    alarms: AlarmScheduler,
    player: Arc<dyn AlarmPlayer>,
    navigator: UnitNavigator,
    persistence: PersistenceSender,
    timezone: Option<chrono_tz::Tz>,
    birth_date: Option<DateTime<Utc>>,
    language: Language,
    hidden_ad_ids: Vec<String>,
    sponsored_pool: Vec<SponsoredItem>,
    last_progress: Option<LifeProgress>,
}

impl Session {
    pub fn new(
        profile: Profile,
        player: Arc<dyn AlarmPlayer>,
        persistence: PersistenceSender,
        settings: &AppSettings,
    ) -> Self {
        let store = AnniversaryStore::new(profile.anniversaries, Arc::new(persistence.clone()));
        let alarms = AlarmScheduler::new(Arc::clone(&player), settings.alarm.default_sound.clone());

        Self {
            store,
            alarms,
            player,
            navigator: UnitNavigator::new(settings.navigation.swipe_threshold),
            persistence,
            timezone: settings.timezone(),
            birth_date: profile.birth_date,
            language: profile.language,
            hidden_ad_ids: profile.hidden_ad_ids,
            sponsored_pool: Vec::new(),
            last_progress: None,
        }
    }

    pub fn on_tick(&mut self, tick: Tick) -> TickReport {
        let progress = compute_progress(self.birth_date, tick.now);
        let fired = self.alarms.evaluate(&mut self.store, tick.now);
        self.last_progress = progress;

        log::debug!(
            "Tick evaluated. [sequence = {}, fired = {}]",
            tick.sequence,
            fired.len()
        );

        TickReport {
            tick,
            progress,
            fired,
        }
    }

    pub fn birth_date(&self) -> Option<DateTime<Utc>> {
        self.birth_date
    }

    pub fn set_birth_date(&mut self, birth_date: Option<DateTime<Utc>>) {
        self.birth_date = birth_date;
        self.last_progress = None;
        self.persistence.persist_birth_date(birth_date);
    }

    /// Resolves a typed birth date in the session zone and stores it, or
    /// clears it for `None`.
    pub fn enter_birth_date(
        &mut self,
        entry: Option<BirthEntry>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, EntryError> {
        let birth_date = match (entry, &self.timezone) {
            (None, _) => None,
            (Some(entry), Some(tz)) => Some(entry.resolve(now, tz)?),
            (Some(entry), None) => Some(entry.resolve(now, &Local)?),
        };

        self.set_birth_date(birth_date);
        Ok(birth_date)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        if self.language == language {
            return;
        }
        self.language = language;
        self.persistence.persist_language(language);
    }

    pub fn anniversaries(&self) -> &[Anniversary] {
        self.store.all()
    }

    /// The single anniversary whose id starts with `prefix`, if exactly one does.
    pub fn find_anniversary(&self, prefix: &str) -> Option<&Anniversary> {
        let mut matches = self
            .store
            .all()
            .iter()
            .filter(|a| a.id.as_str().starts_with(prefix));

        match (matches.next(), matches.next()) {
            (Some(anniversary), None) => Some(anniversary),
            _ => None,
        }
    }

    pub fn add_anniversary(&mut self, form: AnniversaryForm, now: DateTime<Utc>) -> Result<Anniversary, EntryError> {
        let draft = match &self.timezone {
            Some(tz) => form.into_draft(now, tz)?,
            None => form.into_draft(now, &Local)?,
        };

        Ok(self.store.add(draft))
    }

    pub fn update_anniversary(
        &mut self,
        id: &AnniversaryId,
        form: AnniversaryForm,
        now: DateTime<Utc>,
    ) -> Result<bool, EntryError> {
        let draft = match &self.timezone {
            Some(tz) => form.into_draft(now, tz)?,
            None => form.into_draft(now, &Local)?,
        };

        Ok(self.store.update(id, draft))
    }

    pub fn remove_anniversary(&mut self, id: &AnniversaryId) -> Option<Anniversary> {
        self.store.remove(id)
    }

    pub fn active_alarm(&self) -> Option<&Anniversary> {
        self.alarms.active_alarm()
    }

    /// Clears the surfaced alarm and silences it. The record stays fired.
    pub fn dismiss_alarm(&mut self) -> Option<Anniversary> {
        let dismissed = self.alarms.dismiss_active();
        if dismissed.is_some() {
            self.player.stop_alarm();
        }
        dismissed
    }

    pub fn navigator(&self) -> &UnitNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut UnitNavigator {
        &mut self.navigator
    }

    pub fn last_progress(&self) -> Option<&LifeProgress> {
        self.last_progress.as_ref()
    }

    /// Remaining time in the unit currently selected on the navigator.
    pub fn displayed_value(&self) -> Option<f64> {
        self.last_progress
            .map(|progress| progress.remaining(self.navigator.current()))
    }

    pub fn hidden_ad_ids(&self) -> &[String] {
        &self.hidden_ad_ids
    }

    pub fn sponsored_pool(&self) -> &[SponsoredItem] {
        &self.sponsored_pool
    }

    /// Adopts a freshly loaded pool, minus anything the user has hidden.
    pub fn replace_sponsored_pool(&mut self, items: Vec<SponsoredItem>) {
        self.sponsored_pool = items
            .into_iter()
            .filter(|item| !self.hidden_ad_ids.contains(&item.id))
            .collect();
    }

    pub fn hide_sponsored_item(&mut self, id: &str) -> bool {
        if self.hidden_ad_ids.iter().any(|hidden| hidden == id) {
            return false;
        }

        self.hidden_ad_ids.push(id.to_owned());
        self.sponsored_pool.retain(|item| item.id != id);
        self.persistence.persist_hidden_ad_ids(&self.hidden_ad_ids);
        log::info!("Hid sponsored item. [sponsored_id = {}]", id);
        true
    }

    pub fn timeline(&self, now: DateTime<Utc>) -> Vec<TimelineEntry> {
        compose_timeline(self.store.all(), &self.sponsored_pool, now)
    }
}
