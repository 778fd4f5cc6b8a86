use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

#[derive(Debug)]
pub enum LockError {
    Io(std::io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::Io(err) => write!(f, "lock I/O error: {}", err),
        }
    }
}

impl std::error::Error for LockError {}

impl From<std::io::Error> for LockError {
    fn from(value: std::io::Error) -> Self {
        LockError::Io(value)
    }
}

/// On-disk guard serializing destructive cache replacement per user. The
/// delete-then-insert in sync is not safe to run concurrently against the
/// same user, so a second acquire for the held user fails fast with `None`
/// instead of blocking.
#[derive(Debug)]
pub struct SyncGuard {
    path: PathBuf,
    _file: File,
}

impl SyncGuard {
    pub fn acquire(state_dir: &Path, user_id: &str) -> Result<Option<Self>, LockError> {
        let path = state_dir.join("locks").join(lock_file_name(user_id));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => Ok(Some(SyncGuard { path, _file: file })),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(err) => Err(LockError::Io(err)),
        }
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

// User ids are opaque strings that may not be filesystem-safe; hash them into
// a fixed-width lock file name.
fn lock_file_name(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    let mut short = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(short, "{:02x}", byte);
    }
    format!("sync-{short}.lock")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use uuid::Uuid;

    use super::{lock_file_name, SyncGuard};

    fn unique_state_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sprig-lock-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn second_acquire_for_same_user_fails_fast() {
        let dir = unique_state_dir();
        let first = SyncGuard::acquire(&dir, "u-1")
            .expect("first acquire should not fail")
            .expect("first acquire should hold the lock");
        let second = SyncGuard::acquire(&dir, "u-1").expect("second acquire should not fail");
        assert!(second.is_none());
        drop(first);

        let third = SyncGuard::acquire(&dir, "u-1").expect("third acquire should not fail");
        assert!(third.is_some());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn different_users_do_not_contend() {
        let dir = unique_state_dir();
        let first = SyncGuard::acquire(&dir, "u-1")
            .expect("acquire should not fail")
            .expect("lock for u-1 should be held");
        let second = SyncGuard::acquire(&dir, "u-2")
            .expect("acquire should not fail")
            .expect("lock for u-2 should be independent");
        drop(first);
        drop(second);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn lock_file_names_are_filesystem_safe() {
        let name = lock_file_name("users/../../etc");
        assert!(name.starts_with("sync-"));
        assert!(name.ends_with(".lock"));
        assert!(!name.contains('/'));
    }
}
