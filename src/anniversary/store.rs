use std::{collections::HashSet, sync::Arc};

use super::{Anniversary, AnniversaryDraft, AnniversaryId};

/// Receives the whole collection after every mutation.
pub trait AnniversaryPersister: Send + Sync {
    fn persist_anniversaries(&self, anniversaries: &[Anniversary]);
}

/// Owns the anniversary records. Insertion order carries no meaning; the
/// timeline re-sorts by target on every composition.
pub struct AnniversaryStore {
    anniversaries: Vec<Anniversary>,
    issued_ids: HashSet<AnniversaryId>,
    persister: Arc<dyn AnniversaryPersister>,
}

impl AnniversaryStore {
    pub fn new(anniversaries: Vec<Anniversary>, persister: Arc<dyn AnniversaryPersister>) -> Self {
        let issued_ids = anniversaries.iter().map(|a| a.id.clone()).collect();

        Self {
            anniversaries,
            issued_ids,
            persister,
        }
    }

    pub fn all(&self) -> &[Anniversary] {
        &self.anniversaries
    }

    pub fn get(&self, id: &AnniversaryId) -> Option<&Anniversary> {
        self.anniversaries.iter().find(|a| &a.id == id)
    }

    pub fn len(&self) -> usize {
        self.anniversaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anniversaries.is_empty()
    }

    pub fn add(&mut self, draft: AnniversaryDraft) -> Anniversary {
        let id = self.fresh_id();
        let anniversary = Anniversary {
            id,
            name: draft.name,
            target: draft.target,
            alarm_enabled: draft.alarm_enabled,
            alarm_triggered: false,
            alarm_sound_id: draft.alarm_sound_id,
        };

        log::info!(
            "Added anniversary. [anniversary_id = {}, target = {}]",
            anniversary.id,
            anniversary.target
        );
        self.anniversaries.push(anniversary.clone());
        self.persist();

        anniversary
    }

    /// Replaces the editable fields. `alarm_triggered` is left as it was, so
    /// moving a fired anniversary forward does not re-arm it.
    pub fn update(&mut self, id: &AnniversaryId, draft: AnniversaryDraft) -> bool {
        let Some(anniversary) = self.anniversaries.iter_mut().find(|a| &a.id == id) else {
            log::debug!("Ignoring update for unknown anniversary. [anniversary_id = {}]", id);
            return false;
        };

        anniversary.name = draft.name;
        anniversary.target = draft.target;
        anniversary.alarm_enabled = draft.alarm_enabled;
        anniversary.alarm_sound_id = draft.alarm_sound_id;

        self.persist();
        true
    }

    pub fn remove(&mut self, id: &AnniversaryId) -> Option<Anniversary> {
        let index = self.anniversaries.iter().position(|a| &a.id == id)?;
        let removed = self.anniversaries.remove(index);

        log::info!("Removed anniversary. [anniversary_id = {}]", id);
        self.persist();

        Some(removed)
    }

    pub fn mark_triggered(&mut self, id: &AnniversaryId) -> bool {
        let Some(anniversary) = self.anniversaries.iter_mut().find(|a| &a.id == id) else {
            return false;
        };

        anniversary.alarm_triggered = true;
        self.persist();
        true
    }

    fn fresh_id(&mut self) -> AnniversaryId {
        loop {
            let id = AnniversaryId::generate();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    fn persist(&self) {
        self.persister.persist_anniversaries(&self.anniversaries);
    }
}


#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{test_utils::RecordingPersister, *};

    fn draft(name: &str, day: u32) -> AnniversaryDraft {
        AnniversaryDraft {
            name: name.to_owned(),
            target: Utc.with_ymd_and_hms(2030, 1, day, 0, 0, 0).unwrap(),
            alarm_enabled: true,
            alarm_sound_id: Some("zen".to_owned()),
        }
    }

    fn store() -> (AnniversaryStore, Arc<RecordingPersister>) {
        let persister = Arc::new(RecordingPersister::default());
        let store = AnniversaryStore::new(Vec::new(), persister.clone());
        (store, persister)
    }

    #[test]
    fn add_assigns_fresh_id_and_pending_state() {
        let (mut store, persister) = store();

        let first = store.add(draft("first", 1));
        let second = store.add(draft("second", 2));

        assert_ne!(first.id, second.id);
        assert!(!first.alarm_triggered);
        assert_eq!(store.len(), 2);
        assert_eq!(persister.snapshot_count(), 2);
        assert_eq!(persister.last_snapshot().unwrap(), store.all());
    }

    #[test]
    fn removed_ids_are_not_reissued() {
        let (mut store, _) = store();
        let first = store.add(draft("first", 1));
        store.remove(&first.id);

        let second = store.add(draft("second", 2));

        assert!(store.issued_ids.contains(&first.id));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn update_replaces_fields_and_keeps_triggered_flag() {
        let (mut store, _) = store();
        let added = store.add(draft("first", 1));
        store.mark_triggered(&added.id);

        let mut changed = draft("renamed", 20);
        changed.alarm_sound_id = None;
        assert!(store.update(&added.id, changed));

        let updated = store.get(&added.id).unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.target, Utc.with_ymd_and_hms(2030, 1, 20, 0, 0, 0).unwrap());
        assert_eq!(updated.alarm_sound_id, None);
        assert!(updated.alarm_triggered);
    }

    #[test]
    fn update_is_idempotent() {
        let (mut store, _) = store();
        let added = store.add(draft("first", 1));

        store.update(&added.id, draft("changed", 3));
        let once = store.all().to_vec();
        store.update(&added.id, draft("changed", 3));

        assert_eq!(store.all(), &once[..]);
    }

    #[test]
    fn unknown_ids_are_ignored_without_persisting() {
        let (mut store, persister) = store();
        store.add(draft("first", 1));
        let missing = AnniversaryId::from("missing");

        assert!(!store.update(&missing, draft("x", 2)));
        assert!(store.remove(&missing).is_none());
        assert!(!store.mark_triggered(&missing));

        assert_eq!(store.len(), 1);
        assert_eq!(persister.snapshot_count(), 1);
    }

    #[test]
    fn mark_triggered_sets_flag_and_persists() {
        let (mut store, persister) = store();
        let added = store.add(draft("first", 1));

        assert!(store.mark_triggered(&added.id));

        assert!(store.get(&added.id).unwrap().alarm_triggered);
        assert!(persister.last_snapshot().unwrap()[0].alarm_triggered);
    }

    #[test]
    fn loaded_records_keep_their_ids_reserved() {
        let persister = Arc::new(RecordingPersister::default());
        let existing = Anniversary {
            id: AnniversaryId::from("kept"),
            name: "loaded".to_owned(),
            target: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            alarm_enabled: false,
            alarm_triggered: true,
            alarm_sound_id: None,
        };

        let store = AnniversaryStore::new(vec![existing.clone()], persister.clone());

        assert!(store.issued_ids.contains(&existing.id));
        assert_eq!(store.get(&existing.id), Some(&existing));
        assert_eq!(persister.snapshot_count(), 0);
    }
}
