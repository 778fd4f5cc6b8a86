use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Optional workspace configuration at `<state-dir>/config.toml`. Flags and
/// environment variables take precedence; this file only supplies defaults.
///
/// ```toml
/// user_id = "u-4f2b"
/// remote_root = "/srv/sprig/remote"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub remote_root: Option<PathBuf>,
}

impl Settings {
    pub fn load(state_dir: &Path) -> Result<Self, SettingsError> {
        let path = state_dir.join("config.toml");
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default())
            }
            Err(err) => return Err(SettingsError::Io(err)),
        };
        toml::from_str(&text).map_err(|err| SettingsError::Parse { path, err })
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse { path: PathBuf, err: toml::de::Error },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "config I/O error: {}", err),
            SettingsError::Parse { path, err } => {
                write!(f, "invalid config {}: {}", path.display(), err)
            }
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            SettingsError::Parse { err, .. } => Some(err),
        }
    }
}
