use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use rusqlite::Connection;
use time::Date;
use uuid::Uuid;

use crate::check::{CheckError, CheckService, CheckSummary};
use crate::db;
use crate::domain::plant::{CareAction, ParseCareActionError, PlantRecord};
use crate::domain::schedule;
use crate::locks::LockError;
use crate::reminders::{self, ReminderItem};
use crate::remote::{self, ReminderDoc, RemoteError, RemoteStore, UserProfileDoc};
use crate::settings::SettingsError;
use crate::stats::{self, PlantStats};
use crate::sync::{SyncError, SyncService, SyncSummary};

pub struct App {
    conn: Connection,
    remote: Box<dyn RemoteStore>,
    state_dir: PathBuf,
}

/// Form input for a new plant. Dates use the wire format (`YYYY-M-D`); the
/// last-action dates may be omitted, in which case the plant is never due
/// until care is first recorded.
#[derive(Debug, Clone, Default)]
pub struct NewPlantInput {
    pub name: String,
    pub plant_type: String,
    pub planting_date: String,
    pub watering_frequency: String,
    pub fertilizing_frequency: String,
    pub last_watered_date: Option<String>,
    pub last_fertilized_date: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl App {
    pub fn open(
        db_path: &str,
        remote: Box<dyn RemoteStore>,
        state_dir: PathBuf,
    ) -> Result<Self, AppError> {
        ensure_parent_dir(db_path)?;
        let conn = db::open_connection(db_path)?;
        Ok(Self {
            conn,
            remote,
            state_dir,
        })
    }

    /// Creates the plant remotely first, then mirrors it into the cache; a
    /// failed remote write leaves no local-only record behind.
    pub fn add_plant(&self, user_id: &str, input: NewPlantInput) -> Result<PlantRecord, AppError> {
        validate_new_plant(&input)?;
        let plant_id = format!("P-{}", Uuid::now_v7());
        let record = PlantRecord {
            id: plant_id.clone(),
            user_id: user_id.to_string(),
            name: input.name.trim().to_string(),
            plant_type: input.plant_type.trim().to_string(),
            planting_date: input.planting_date.trim().to_string(),
            watering_frequency: input.watering_frequency.trim().to_string(),
            fertilizing_frequency: input.fertilizing_frequency.trim().to_string(),
            last_watered_date: input.last_watered_date.unwrap_or_default().trim().to_string(),
            last_fertilized_date: input
                .last_fertilized_date
                .unwrap_or_default()
                .trim()
                .to_string(),
            image: input.image,
        };

        self.remote.put_plant(&plant_id, &remote::doc_from_record(&record))?;
        db::insert_plant(&self.conn, &record)?;
        Ok(record)
    }

    pub fn list_plants(&self, user_id: &str) -> Result<Vec<PlantRecord>, AppError> {
        Ok(db::list_user_plants(&self.conn, user_id)?)
    }

    pub fn last_sync(&self, user_id: &str) -> Result<Option<String>, AppError> {
        Ok(db::get_meta(&self.conn, &format!("last_sync:{user_id}"))?)
    }

    /// Deletes the plant remotely (cascading its reminder document) and
    /// drops the cached row.
    pub fn remove_plant(&self, user_id: &str, plant_id: &str) -> Result<(), AppError> {
        self.require_user_plant(user_id, plant_id)?;
        self.remote.delete_reminder(user_id, plant_id)?;
        self.remote.delete_plant(plant_id)?;
        db::delete_plant(&self.conn, plant_id)?;
        Ok(())
    }

    /// Records one care action as done today: moves the last-action date
    /// forward remotely and in the cache, and bumps the profile activity
    /// counter. This is the only place the counter is incremented.
    pub fn record_care(
        &self,
        user_id: &str,
        plant_id: &str,
        action: CareAction,
        today: Date,
    ) -> Result<PlantRecord, AppError> {
        let mut doc = self.require_user_plant(user_id, plant_id)?;
        let date = schedule::format_plant_date(today);
        match action {
            CareAction::Water => doc.last_watered_date = date.clone(),
            CareAction::Fertilize => doc.last_fertilized_date = date.clone(),
        }
        self.remote.put_plant(plant_id, &doc)?;
        db::update_last_action(&self.conn, plant_id, action, &date)?;
        self.increment_activities(user_id)?;
        Ok(remote::record_from_doc(plant_id, &doc).0)
    }

    /// Acknowledges a reminder: records care for every flagged action and
    /// marks the stored document done. The next check pass then recomputes
    /// the flags from the new dates; there is no separate "done" state.
    pub fn mark_reminder_done(
        &self,
        user_id: &str,
        plant_id: &str,
        today: Date,
    ) -> Result<ReminderDoc, AppError> {
        let stored = self
            .remote
            .get_reminder(user_id, plant_id)?
            .ok_or_else(|| AppError::NotFound(plant_id.to_string()))?;

        for action in CareAction::ALL {
            let flagged = match action {
                CareAction::Water => stored.need_water,
                CareAction::Fertilize => stored.need_fertilize,
            };
            if flagged {
                self.record_care(user_id, plant_id, action, today)?;
            }
        }

        let done = ReminderDoc {
            is_done: true,
            timestamp: db::now_utc_rfc3339(),
            ..stored
        };
        self.remote.put_reminder(user_id, plant_id, &done)?;
        Ok(done)
    }

    /// The current due-list, computed from a fresh remote snapshot.
    pub fn due_list(&self, user_id: &str, today: Date) -> Result<Vec<ReminderItem>, AppError> {
        let docs = self.remote.list_plants(user_id)?;
        let records: Vec<PlantRecord> = docs
            .iter()
            .map(|(plant_id, doc)| remote::record_from_doc(plant_id, doc).0)
            .collect();
        Ok(reminders::compute_reminders(&records, today))
    }

    pub fn sync_user(&self, user_id: &str) -> Result<SyncSummary, AppError> {
        let service = SyncService::new(&self.conn, self.remote.as_ref(), self.state_dir.clone());
        Ok(service.sync_user(user_id)?)
    }

    pub fn run_check(&self, user_id: &str, today: Date) -> Result<CheckSummary, AppError> {
        let service = CheckService::new(self.remote.as_ref());
        Ok(service.run_check(user_id, today)?)
    }

    pub fn stats(&self, user_id: &str) -> Result<PlantStats, AppError> {
        let plants = db::list_user_plants(&self.conn, user_id)?;
        Ok(PlantStats {
            plants: plants.len() as u64,
            type_counts: db::count_by_type(&self.conn, user_id)?,
            weekly_care_load: stats::weekly_care_load(&plants),
        })
    }

    pub fn profile(&self, user_id: &str) -> Result<UserProfileDoc, AppError> {
        Ok(self.remote.get_profile(user_id)?.unwrap_or_default())
    }

    fn require_user_plant(
        &self,
        user_id: &str,
        plant_id: &str,
    ) -> Result<remote::PlantDoc, AppError> {
        match self.remote.get_plant(plant_id)? {
            Some(doc) if doc.user_id == user_id => Ok(doc),
            // A plant owned by another user is indistinguishable from a
            // missing one from this user's point of view.
            Some(_) | None => Err(AppError::NotFound(plant_id.to_string())),
        }
    }

    fn increment_activities(&self, user_id: &str) -> Result<(), AppError> {
        let mut profile = self.remote.get_profile(user_id)?.unwrap_or_default();
        profile.activities += 1;
        self.remote.put_profile(user_id, &profile)?;
        Ok(())
    }
}

fn validate_new_plant(input: &NewPlantInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "plant name must not be empty".to_string(),
        ));
    }
    if schedule::parse_plant_date(&input.planting_date).is_none() {
        return Err(AppError::InvalidArgument(format!(
            "invalid planting date '{}', expected YYYY-M-D",
            input.planting_date
        )));
    }
    for (label, frequency) in [
        ("watering", &input.watering_frequency),
        ("fertilizing", &input.fertilizing_frequency),
    ] {
        if schedule::parse_interval_days(frequency).is_none() {
            return Err(AppError::InvalidArgument(format!(
                "invalid {label} frequency '{frequency}', expected a number of days"
            )));
        }
    }
    for (label, date) in [
        ("last watered", &input.last_watered_date),
        ("last fertilized", &input.last_fertilized_date),
    ] {
        if let Some(raw) = date.as_deref() {
            if !raw.trim().is_empty() && schedule::parse_plant_date(raw).is_none() {
                return Err(AppError::InvalidArgument(format!(
                    "invalid {label} date '{raw}', expected YYYY-M-D"
                )));
            }
        }
    }
    Ok(())
}

fn ensure_parent_dir(db_path: &str) -> Result<(), AppError> {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Remote(RemoteError),
    Sync(SyncError),
    Check(CheckError),
    Lock(LockError),
    Settings(SettingsError),
    ParseCareAction(ParseCareActionError),
    InvalidArgument(String),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Db(err) => write!(f, "database error: {}", err),
            AppError::Remote(err) => write!(f, "{}", err),
            AppError::Sync(err) => write!(f, "sync error: {}", err),
            AppError::Check(err) => write!(f, "check error: {}", err),
            AppError::Lock(err) => write!(f, "{}", err),
            AppError::Settings(err) => write!(f, "{}", err),
            AppError::ParseCareAction(err) => write!(f, "{}", err),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
            AppError::NotFound(id) => write!(f, "plant '{}' not found for this user", id),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Db(err) => Some(err),
            AppError::Remote(err) => Some(err),
            AppError::Sync(err) => Some(err),
            AppError::Check(err) => Some(err),
            AppError::Lock(err) => Some(err),
            AppError::Settings(err) => Some(err),
            AppError::ParseCareAction(err) => Some(err),
            AppError::InvalidArgument(_) => None,
            AppError::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<RemoteError> for AppError {
    fn from(value: RemoteError) -> Self {
        AppError::Remote(value)
    }
}

impl From<SyncError> for AppError {
    fn from(value: SyncError) -> Self {
        AppError::Sync(value)
    }
}

impl From<CheckError> for AppError {
    fn from(value: CheckError) -> Self {
        AppError::Check(value)
    }
}

impl From<LockError> for AppError {
    fn from(value: LockError) -> Self {
        AppError::Lock(value)
    }
}

impl From<SettingsError> for AppError {
    fn from(value: SettingsError) -> Self {
        AppError::Settings(value)
    }
}

impl From<ParseCareActionError> for AppError {
    fn from(value: ParseCareActionError) -> Self {
        AppError::ParseCareAction(value)
    }
}
