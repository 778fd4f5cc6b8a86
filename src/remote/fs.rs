use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{PlantDoc, ReminderDoc, RemoteError, RemoteStore, UserProfileDoc};

/// Filesystem-backed remote store: a directory of JSON documents laid out
/// like the remote collections.
///
/// ```text
/// <root>/plants/<plant_id>.json
/// <root>/users/<uid>/profile.json
/// <root>/users/<uid>/reminders/<plant_id>.json
/// ```
pub struct JsonRemote {
    root: PathBuf,
}

impl JsonRemote {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn plants_dir(&self) -> PathBuf {
        self.root.join("plants")
    }

    fn plant_path(&self, plant_id: &str) -> PathBuf {
        self.plants_dir().join(format!("{plant_id}.json"))
    }

    fn profile_path(&self, user_id: &str) -> PathBuf {
        self.root.join("users").join(user_id).join("profile.json")
    }

    fn reminder_path(&self, user_id: &str, plant_id: &str) -> PathBuf {
        self.root
            .join("users")
            .join(user_id)
            .join("reminders")
            .join(format!("{plant_id}.json"))
    }
}

fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, RemoteError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(RemoteError::Io(err)),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

fn write_doc<T: Serialize>(path: &Path, doc: &T) -> Result<(), RemoteError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    serde_json::to_writer_pretty(&mut file, doc)?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    Ok(())
}

fn remove_doc(path: &Path) -> Result<(), RemoteError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(RemoteError::Io(err)),
    }
}

impl RemoteStore for JsonRemote {
    fn list_plants(&self, user_id: &str) -> Result<Vec<(String, PlantDoc)>, RemoteError> {
        let dir = self.plants_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(RemoteError::Io(err)),
        };

        let mut plants = Vec::new();
        for entry in entries {
            let path = entry.map_err(RemoteError::Io)?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let Some(doc) = read_doc::<PlantDoc>(&path)? else {
                continue;
            };
            if doc.user_id == user_id {
                plants.push((stem.to_string(), doc));
            }
        }

        // Directory iteration order is platform-defined; sort by id so every
        // snapshot of an unchanged remote looks identical.
        plants.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(plants)
    }

    fn get_plant(&self, plant_id: &str) -> Result<Option<PlantDoc>, RemoteError> {
        read_doc(&self.plant_path(plant_id))
    }

    fn put_plant(&self, plant_id: &str, doc: &PlantDoc) -> Result<(), RemoteError> {
        write_doc(&self.plant_path(plant_id), doc)
    }

    fn delete_plant(&self, plant_id: &str) -> Result<(), RemoteError> {
        remove_doc(&self.plant_path(plant_id))
    }

    fn get_reminder(
        &self,
        user_id: &str,
        plant_id: &str,
    ) -> Result<Option<ReminderDoc>, RemoteError> {
        read_doc(&self.reminder_path(user_id, plant_id))
    }

    fn put_reminder(
        &self,
        user_id: &str,
        plant_id: &str,
        doc: &ReminderDoc,
    ) -> Result<(), RemoteError> {
        write_doc(&self.reminder_path(user_id, plant_id), doc)
    }

    fn delete_reminder(&self, user_id: &str, plant_id: &str) -> Result<(), RemoteError> {
        remove_doc(&self.reminder_path(user_id, plant_id))
    }

    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfileDoc>, RemoteError> {
        read_doc(&self.profile_path(user_id))
    }

    fn put_profile(&self, user_id: &str, doc: &UserProfileDoc) -> Result<(), RemoteError> {
        write_doc(&self.profile_path(user_id), doc)
    }
}
