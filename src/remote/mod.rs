use std::error::Error;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::plant::PlantRecord;

mod fs;

pub use fs::JsonRemote;

/// Plant document as stored remotely. Field names keep the wire contract of
/// the original `plants` collection (camelCase, dates as `YYYY-M-D` strings,
/// frequencies as decimal-digit strings). The image payload travels as base64
/// next to a SHA-256 checksum of the raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlantDoc {
    pub user_id: String,
    pub name: String,
    pub planting_date: String,
    pub plant_type: String,
    pub watering_frequency: String,
    pub fertilizing_frequency: String,
    #[serde(default)]
    pub last_watered_date: String,
    #[serde(default)]
    pub last_fertilized_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_sha256: Option<String>,
}

/// Derived reminder document under `users/<uid>/reminders/<plant_id>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDoc {
    pub plant_name: String,
    pub need_water: bool,
    pub need_fertilize: bool,
    pub is_done: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub profile_completed: bool,
    #[serde(default)]
    pub activities: i64,
}

/// Stable seam to the remote document store. Every pass in this crate works
/// on a snapshot fetched through this trait; the store's own concurrency
/// control is the only coordination between writers.
pub trait RemoteStore {
    fn list_plants(&self, user_id: &str) -> Result<Vec<(String, PlantDoc)>, RemoteError>;
    fn get_plant(&self, plant_id: &str) -> Result<Option<PlantDoc>, RemoteError>;
    fn put_plant(&self, plant_id: &str, doc: &PlantDoc) -> Result<(), RemoteError>;
    fn delete_plant(&self, plant_id: &str) -> Result<(), RemoteError>;

    fn get_reminder(
        &self,
        user_id: &str,
        plant_id: &str,
    ) -> Result<Option<ReminderDoc>, RemoteError>;
    fn put_reminder(
        &self,
        user_id: &str,
        plant_id: &str,
        doc: &ReminderDoc,
    ) -> Result<(), RemoteError>;
    fn delete_reminder(&self, user_id: &str, plant_id: &str) -> Result<(), RemoteError>;

    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfileDoc>, RemoteError>;
    fn put_profile(&self, user_id: &str, doc: &UserProfileDoc) -> Result<(), RemoteError>;
}

#[derive(Debug)]
pub enum RemoteError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Io(err) => write!(f, "remote I/O error: {}", err),
            RemoteError::Json(err) => write!(f, "remote document parse error: {}", err),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RemoteError::Io(err) => Some(err),
            RemoteError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(value: std::io::Error) -> Self {
        RemoteError::Io(value)
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(value: serde_json::Error) -> Self {
        RemoteError::Json(value)
    }
}

pub fn encode_image(bytes: &[u8]) -> (String, String) {
    (BASE64.encode(bytes), sha256_hex(bytes))
}

/// Decodes the embedded image payload, tolerating the line breaks some
/// encoders insert. Returns `None` when the payload is not valid base64 or
/// the checksum does not match the decoded bytes; the caller keeps the rest
/// of the record and drops only this field.
pub fn decode_image(doc: &PlantDoc) -> Option<Vec<u8>> {
    let encoded: String = doc
        .image
        .as_deref()?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = BASE64.decode(encoded.as_bytes()).ok()?;
    if let Some(expected) = doc.image_sha256.as_deref() {
        if sha256_hex(&bytes) != expected.trim().to_ascii_lowercase() {
            return None;
        }
    }
    Some(bytes)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Maps a remote document into a cache record. The boolean reports whether a
/// present-but-unusable image payload was dropped.
pub fn record_from_doc(plant_id: &str, doc: &PlantDoc) -> (PlantRecord, bool) {
    let image = decode_image(doc);
    let dropped = doc.image.is_some() && image.is_none();
    let record = PlantRecord {
        id: plant_id.to_string(),
        user_id: doc.user_id.clone(),
        name: doc.name.clone(),
        plant_type: doc.plant_type.clone(),
        planting_date: doc.planting_date.clone(),
        watering_frequency: doc.watering_frequency.clone(),
        fertilizing_frequency: doc.fertilizing_frequency.clone(),
        last_watered_date: doc.last_watered_date.clone(),
        last_fertilized_date: doc.last_fertilized_date.clone(),
        image,
    };
    (record, dropped)
}

pub fn doc_from_record(record: &PlantRecord) -> PlantDoc {
    let encoded = record.image.as_deref().map(encode_image);
    PlantDoc {
        user_id: record.user_id.clone(),
        name: record.name.clone(),
        planting_date: record.planting_date.clone(),
        plant_type: record.plant_type.clone(),
        watering_frequency: record.watering_frequency.clone(),
        fertilizing_frequency: record.fertilizing_frequency.clone(),
        last_watered_date: record.last_watered_date.clone(),
        last_fertilized_date: record.last_fertilized_date.clone(),
        image: encoded.as_ref().map(|(payload, _)| payload.clone()),
        image_sha256: encoded.map(|(_, checksum)| checksum),
    }
}
