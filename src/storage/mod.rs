mod file;
mod memory;
mod persistence;
mod profile_storage;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use persistence::{PersistenceSender, spawn_persistence_worker};
pub use profile_storage::ProfileStorage;

use async_trait::async_trait;
use thiserror::Error;

pub const BIRTH_DATE_KEY: &str = "centurion_birthdate";
pub const ANNIVERSARIES_KEY: &str = "centurion_anniversaries";
pub const LANGUAGE_KEY: &str = "centurion_lang";
pub const HIDDEN_ADS_KEY: &str = "centurion_hidden_ads";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// Keyed storage with whole-value overwrite semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}
