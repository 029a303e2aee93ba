use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    ANNIVERSARIES_KEY, BIRTH_DATE_KEY, HIDDEN_ADS_KEY, KeyValueStore, LANGUAGE_KEY, StorageError,
};
use crate::{
    anniversary::Anniversary,
    profile::{Language, Profile},
};

/// Typed load/save over the profile keys. Loads never fail: unreadable or
/// malformed values are reported and treated as absent.
#[derive(Clone)]
pub struct ProfileStorage {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub async fn load_profile(&self) -> Profile {
        Profile {
            birth_date: self.load_birth_date().await,
            anniversaries: self.load_anniversaries().await,
            language: self.load_language().await,
            hidden_ad_ids: self.load_hidden_ad_ids().await,
        }
    }

    pub async fn load_anniversaries(&self) -> Vec<Anniversary> {
        self.load_json(ANNIVERSARIES_KEY).await.unwrap_or_default()
    }

    pub async fn save_anniversaries(&self, anniversaries: &[Anniversary]) -> Result<(), StorageError> {
        self.save_json(ANNIVERSARIES_KEY, anniversaries).await
    }

    /// Accepts a JSON string or a bare ISO-8601 timestamp.
    pub async fn load_birth_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.load_raw(BIRTH_DATE_KEY).await?;
        let parsed = serde_json::from_str::<DateTime<Utc>>(&raw).or_else(|_| {
            DateTime::parse_from_rfc3339(raw.trim()).map(|dt| dt.with_timezone(&Utc))
        });

        match parsed {
            Ok(birth_date) => Some(birth_date),
            Err(error) => {
                log::warn!(
                    "Ignoring malformed stored value. [key = {}, error = {}]",
                    BIRTH_DATE_KEY,
                    error
                );
                None
            }
        }
    }

    pub async fn save_birth_date(&self, birth_date: Option<DateTime<Utc>>) -> Result<(), StorageError> {
        match birth_date {
            Some(birth_date) => self.save_json(BIRTH_DATE_KEY, &birth_date).await,
            None => self.store.remove(BIRTH_DATE_KEY).await,
        }
    }

    /// Accepts a JSON string or a bare language code.
    pub async fn load_language(&self) -> Language {
        let Some(raw) = self.load_raw(LANGUAGE_KEY).await else {
            return Language::default();
        };

        let code = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        code.parse().unwrap_or_else(|error| {
            log::warn!(
                "Ignoring malformed stored value. [key = {}, error = {}]",
                LANGUAGE_KEY,
                error
            );
            Language::default()
        })
    }

    pub async fn save_language(&self, language: Language) -> Result<(), StorageError> {
        self.save_json(LANGUAGE_KEY, &language).await
    }

    pub async fn load_hidden_ad_ids(&self) -> Vec<String> {
        self.load_json(HIDDEN_ADS_KEY).await.unwrap_or_default()
    }

    pub async fn save_hidden_ad_ids(&self, ids: &[String]) -> Result<(), StorageError> {
        self.save_json(HIDDEN_ADS_KEY, ids).await
    }

    async fn load_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(error) => {
                log::warn!("Failed to read stored value. [key = {}, error = {}]", key, error);
                None
            }
        }
    }

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                log::warn!("Ignoring malformed stored value. [key = {}, error = {}]", key, error);
                None
            }
        }
    }

    async fn save_json<T: Serialize + ?Sized + Sync>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value)?;
        self.store.set(key, encoded).await
    }
}
