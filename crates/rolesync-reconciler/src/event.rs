//! Upload notification events.
//!
//! Parses the object-store notification that announces a new manifest:
//!
//! ```json
//! {"Records": [{"s3": {"bucket": {"name": "hr-drops"}, "object": {"key": "2024/q1+roster.csv"}}}]}
//! ```
//!
//! Only the first record is used. Object keys arrive form-encoded
//! (`+` for space, `%XX` escapes) and are decoded here.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed upload event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("upload event has no records")]
    NoRecords,

    #[error("object key '{key}' is not valid percent-encoded UTF-8")]
    InvalidKey { key: String },
}

/// Location of an uploaded manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<NotificationRecord>,
}

#[derive(Debug, Deserialize)]
struct NotificationRecord {
    s3: StorageEntity,
}

#[derive(Debug, Deserialize)]
struct StorageEntity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

impl UploadEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse a notification payload.
    pub fn from_json(payload: &str) -> Result<Self, EventError> {
        let notification: Notification = serde_json::from_str(payload)?;
        let record = notification
            .records
            .into_iter()
            .next()
            .ok_or(EventError::NoRecords)?;

        Ok(Self {
            bucket: record.s3.bucket.name,
            key: decode_key(&record.s3.object.key)?,
        })
    }
}

fn decode_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| EventError::InvalidKey {
            key: raw.to_string(),
        })
}
