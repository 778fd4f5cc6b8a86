use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use rusqlite::Connection;
use serde::Serialize;

use crate::db;
use crate::domain::plant::PlantRecord;
use crate::locks::{LockError, SyncGuard};
use crate::remote::{self, RemoteError, RemoteStore};

/// One-directional, destructive-replace copy of the user's remote plant set
/// into the local cache. The remote fetch completes before any local row is
/// touched; a failed fetch leaves the cache exactly as it was.
pub struct SyncService<'a> {
    conn: &'a Connection,
    remote: &'a dyn RemoteStore,
    state_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SyncSummary {
    pub user_id: String,
    pub fetched: u64,
    pub inserted: u64,
    pub images_dropped: u64,
    pub completed_at: String,
}

impl<'a> SyncService<'a> {
    pub fn new(conn: &'a Connection, remote: &'a dyn RemoteStore, state_dir: PathBuf) -> Self {
        Self {
            conn,
            remote,
            state_dir,
        }
    }

    pub fn sync_user(&self, user_id: &str) -> Result<SyncSummary, SyncError> {
        let _guard = SyncGuard::acquire(&self.state_dir, user_id)?
            .ok_or_else(|| SyncError::Busy(user_id.to_string()))?;

        let docs = self.remote.list_plants(user_id)?;
        let mut images_dropped = 0u64;
        let records: Vec<PlantRecord> = docs
            .iter()
            .map(|(plant_id, doc)| {
                let (record, dropped) = remote::record_from_doc(plant_id, doc);
                if dropped {
                    images_dropped += 1;
                }
                record
            })
            .collect();

        let completed_at = db::now_utc_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        db::delete_user_plants(&tx, user_id)?;
        for record in &records {
            db::insert_plant(&tx, record)?;
        }
        db::set_meta(&tx, &format!("last_sync:{user_id}"), &completed_at)?;
        tx.commit()?;

        Ok(SyncSummary {
            user_id: user_id.to_string(),
            fetched: docs.len() as u64,
            inserted: records.len() as u64,
            images_dropped,
            completed_at,
        })
    }
}

#[derive(Debug)]
pub enum SyncError {
    Db(rusqlite::Error),
    Remote(RemoteError),
    Lock(LockError),
    Busy(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Db(err) => write!(f, "database error: {}", err),
            SyncError::Remote(err) => write!(f, "{}", err),
            SyncError::Lock(err) => write!(f, "{}", err),
            SyncError::Busy(user_id) => {
                write!(f, "a sync for user '{}' is already running", user_id)
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SyncError::Db(err) => Some(err),
            SyncError::Remote(err) => Some(err),
            SyncError::Lock(err) => Some(err),
            SyncError::Busy(_) => None,
        }
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(value: rusqlite::Error) -> Self {
        SyncError::Db(value)
    }
}

impl From<RemoteError> for SyncError {
    fn from(value: RemoteError) -> Self {
        SyncError::Remote(value)
    }
}

impl From<LockError> for SyncError {
    fn from(value: LockError) -> Self {
        SyncError::Lock(value)
    }
}
