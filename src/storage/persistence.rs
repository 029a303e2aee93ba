use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot},
    task,
    time::{self, Instant},
};

use super::{
    ANNIVERSARIES_KEY, BIRTH_DATE_KEY, HIDDEN_ADS_KEY, KeyValueStore, LANGUAGE_KEY,
};
use crate::{
    anniversary::{Anniversary, AnniversaryPersister},
    profile::Language,
};

#[derive(Debug)]
enum PersistCommand {
    Write { key: &'static str, value: Option<String> },
    Flush(oneshot::Sender<()>),
}

/// Enqueues whole-value writes without blocking the caller. Cloned into every
/// component that mutates persisted state.
#[derive(Clone)]
pub struct PersistenceSender {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistenceSender {
    pub fn persist_birth_date(&self, birth_date: Option<DateTime<Utc>>) {
        match birth_date {
            Some(birth_date) => self.enqueue(BIRTH_DATE_KEY, &birth_date),
            None => self.send(PersistCommand::Write {
                key: BIRTH_DATE_KEY,
                value: None,
            }),
        }
    }

    pub fn persist_language(&self, language: Language) {
        self.enqueue(LANGUAGE_KEY, &language);
    }

    pub fn persist_hidden_ad_ids(&self, ids: &[String]) {
        self.enqueue(HIDDEN_ADS_KEY, ids);
    }

    /// Writes everything still pending and waits for it.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(PersistCommand::Flush(done_tx));
        if done_rx.await.is_err() {
            log::warn!("Persistence worker stopped before flushing");
        }
    }

    fn enqueue<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) {
        match serde_json::to_string(value) {
            Ok(encoded) => self.send(PersistCommand::Write {
                key,
                value: Some(encoded),
            }),
            Err(error) => log::warn!("Failed to encode value. [key = {}, error = {}]", key, error),
        }
    }

    fn send(&self, command: PersistCommand) {
        if self.tx.send(command).is_err() {
            log::warn!("Persistence worker is gone, dropping write");
        }
    }
}

impl AnniversaryPersister for PersistenceSender {
    fn persist_anniversaries(&self, anniversaries: &[Anniversary]) {
        self.enqueue(ANNIVERSARIES_KEY, anniversaries);
    }
}

/// Starts the worker that coalesces writes per key and stores them once no
/// new write has arrived for `debounce`. Pending writes are stored on
/// [`PersistenceSender::flush`] and when every sender is dropped.
pub fn spawn_persistence_worker(store: Arc<dyn KeyValueStore>, debounce: Duration) -> PersistenceSender {
    let (tx, mut rx) = mpsc::unbounded_channel();

    task::spawn(async move {
        let mut pending = BTreeMap::new();
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                command = rx.recv() => match command {
                    Some(PersistCommand::Write { key, value }) => {
                        pending.insert(key, value);
                        deadline = Some(Instant::now() + debounce);
                    }
                    Some(PersistCommand::Flush(done)) => {
                        write_pending(store.as_ref(), &mut pending).await;
                        deadline = None;
                        let _ = done.send(());
                    }
                    None => {
                        write_pending(store.as_ref(), &mut pending).await;
                        log::info!("Persistence worker shutting down");
                        break;
                    }
                },
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    write_pending(store.as_ref(), &mut pending).await;
                    deadline = None;
                }
            }
        }
    });

    PersistenceSender { tx }
}

async fn write_pending(store: &dyn KeyValueStore, pending: &mut BTreeMap<&'static str, Option<String>>) {
    for (key, value) in std::mem::take(pending) {
        let result = match value {
            Some(value) => store.set(key, value).await,
            None => store.remove(key).await,
        };

        if let Err(error) = result {
            log::warn!("Failed to persist value. [key = {}, error = {}]", key, error);
        }
    }
}
