//! Local generation history
//!
//! Two capped, newest-first lists. Inserting past the cap silently drops
//! the oldest records.

pub mod handlers;

use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::HistoryConfig;
use crate::error::{AppError, StorageError};
use crate::generation::{ImageStyle, Tone, WritingStyle};
use crate::storage::{self, KeyValueStore, IMAGE_HISTORY_KEY, TEXT_HISTORY_KEY};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextHistoryRecord {
    pub id: Uuid,
    pub prompt: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<WritingStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl TextHistoryRecord {
    pub fn new(prompt: String, result: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt,
            result,
            timestamp: Utc::now(),
            tone: None,
            style: None,
            content_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHistoryRecord {
    pub id: Uuid,
    pub prompt: String,
    /// Base64 PNG, no data-URI prefix.
    pub image: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
}

impl ImageHistoryRecord {
    pub fn new(prompt: String, image: String, style: Option<ImageStyle>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt,
            image,
            timestamp: Utc::now(),
            style,
        }
    }

    pub fn png_bytes(&self) -> std::result::Result<Vec<u8>, StorageError> {
        BASE64
            .decode(self.image.trim())
            .map_err(|e| StorageError::Corrupt(format!("image {} is not valid base64: {}", self.id, e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub text_generated: usize,
    pub images_generated: usize,
}

/// Prepends `record` and drops anything past `cap`.
pub fn push_capped<T>(records: &mut Vec<T>, record: T, cap: usize) {
    records.insert(0, record);
    records.truncate(cap);
}

pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    text_cap: usize,
    image_cap: usize,
    // held across the load, prepend and save of one insert
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &HistoryConfig) -> Self {
        Self {
            storage,
            text_cap: config.text_cap,
            image_cap: config.image_cap,
            write_lock: Mutex::new(()),
        }
    }

    pub fn record_text(&self, record: TextHistoryRecord) -> Result<()> {
        self.prepend(TEXT_HISTORY_KEY, record, self.text_cap)
    }

    pub fn record_image(&self, record: ImageHistoryRecord) -> Result<()> {
        self.prepend(IMAGE_HISTORY_KEY, record, self.image_cap)
    }

    pub fn text_history(&self) -> Result<Vec<TextHistoryRecord>> {
        Ok(storage::load_or_default(self.storage.as_ref(), TEXT_HISTORY_KEY)?)
    }

    pub fn image_history(&self) -> Result<Vec<ImageHistoryRecord>> {
        Ok(storage::load_or_default(self.storage.as_ref(), IMAGE_HISTORY_KEY)?)
    }

    pub fn image_png(&self, id: Uuid) -> Result<Vec<u8>> {
        let record = self
            .image_history()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| AppError::NotFound(format!("image {id}")))?;
        Ok(record.png_bytes()?)
    }

    pub fn usage_stats(&self) -> Result<UsageStats> {
        Ok(UsageStats {
            text_generated: self.text_history()?.len(),
            images_generated: self.image_history()?.len(),
        })
    }

    fn prepend<T>(&self, key: &str, record: T, cap: usize) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut records: Vec<T> = storage::load_or_default(self.storage.as_ref(), key)?;
        push_capped(&mut records, record, cap);
        storage::save(self.storage.as_ref(), key, &records)?;
        Ok(())
    }
}
