//! Key/value persistence port with in-memory and on-disk adapters

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::error::{codes, ApiError};

pub const COMPANY_KEY: &str = "geoiq_company";
pub const BRANDS_KEY: &str = "geoiq_brands";
pub const PROMPTS_KEY: &str = "geoiq-brand-prompts";
pub const VISIBILITY_KEY: &str = "geoiq-visibility-data";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to delete '{key}': {reason}")]
    Delete { key: String, reason: String },

    #[error("Storage quota exceeded writing '{key}' ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("Stored value for '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value for '{key}' could not be serialized: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn key(&self) -> &str {
        match self {
            StorageError::Read { key, .. }
            | StorageError::Write { key, .. }
            | StorageError::Delete { key, .. }
            | StorageError::QuotaExceeded { key, .. }
            | StorageError::Corrupt { key, .. }
            | StorageError::Serialize { key, .. } => key,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Read { .. } | StorageError::Corrupt { .. } => codes::STORAGE_READ_ERROR,
            StorageError::Write { .. }
            | StorageError::QuotaExceeded { .. }
            | StorageError::Serialize { .. } => codes::STORAGE_WRITE_ERROR,
            StorageError::Delete { .. } => codes::STORAGE_DELETE_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let quota_exceeded = matches!(err, StorageError::QuotaExceeded { .. });
        ApiError::new(err.code(), err.to_string())
            .with_detail("key", err.key())
            .with_detail("quotaExceeded", quota_exceeded)
    }
}

/// Synchronous string store keyed by name, shaped after browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// JSON helpers available on every [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
