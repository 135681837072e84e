//! Storage module for the Genora dashboard
//!
//! Every store persists through a [`KeyValueStore`]. Values are wrapped in a
//! versioned envelope and loaded with catch-and-default semantics: a missing,
//! corrupt or foreign-version record yields the type's default instead of an
//! error.

pub mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;

pub const USER_KEY: &str = "genora_user";
pub const TOKEN_KEY: &str = "genora_token";
pub const CREDITS_KEY: &str = "genora-credits";
pub const TEXT_HISTORY_KEY: &str = "genora_text_history";
pub const IMAGE_HISTORY_KEY: &str = "genora_image_history";

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

/// Reads `key`, returning `None` when it is absent or unreadable as a
/// current-version record.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError> {
    let raw = match store.get(key)? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) if envelope.version == SCHEMA_VERSION => Ok(Some(envelope.state)),
        Ok(envelope) => {
            warn!(key, version = envelope.version, "Discarding record with unsupported schema version");
            Ok(None)
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding corrupt record");
            Ok(None)
        }
    }
}

pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> Result<T, StorageError> {
    Ok(load(store, key)?.unwrap_or_default())
}

pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, state: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&Envelope { state, version: SCHEMA_VERSION })
        .map_err(|e| StorageError::Serialization { key: key.to_string(), message: e.to_string() })?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save(&store, "counter", &Counter { value: 7 }).unwrap();

        let raw = store.get("counter").unwrap().unwrap();
        assert_eq!(raw, r#"{"state":{"value":7},"version":1}"#);

        let loaded: Counter = load_or_default(&store, "counter").unwrap();
        assert_eq!(loaded, Counter { value: 7 });
    }

    #[test]
    fn test_absent_key_defaults() {
        let store = MemoryStore::new();
        let loaded: Option<Counter> = load(&store, "counter").unwrap();
        assert!(loaded.is_none());
    }

    #[test_log::test]
    fn test_corrupt_record_defaults() {
        let store = MemoryStore::new();
        store.set("counter", "{not json").unwrap();

        let loaded: Counter = load_or_default(&store, "counter").unwrap();
        assert_eq!(loaded, Counter::default());
    }

    #[test]
    fn test_unversioned_record_defaults() {
        let store = MemoryStore::new();
        store.set("counter", r#"{"value":3}"#).unwrap();
        assert!(load::<Counter>(&store, "counter").unwrap().is_none());

        store.set("counter", r#"{"state":{"value":3},"version":99}"#).unwrap();
        assert!(load::<Counter>(&store, "counter").unwrap().is_none());
    }
}
