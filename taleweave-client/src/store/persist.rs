//! Persisted subset of the client state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use taleweave_core::error::StorageError;
use taleweave_core::types::{Theme, User};
use taleweave_telemetry::spans::storage_span;
use tracing::{debug, warn};

/// Key the persisted blob is stored under.
pub const STORAGE_KEY: &str = "taleweave-storage";

fn default_true() -> bool {
    true
}

/// Fields that survive a restart. Notifications and presence never do.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Signed-in user.
    #[serde(default)]
    pub user: Option<User>,
    /// Bearer credential.
    #[serde(default)]
    pub token: Option<String>,
    /// UI theme.
    #[serde(default)]
    pub theme: Theme,
    /// Sidebar flag.
    #[serde(default = "default_true")]
    pub sidebar_open: bool,
    /// Live updates flag.
    #[serde(default = "default_true")]
    pub live_updates: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            theme: Theme::default(),
            sidebar_open: true,
            live_updates: true,
        }
    }
}

impl fmt::Debug for PersistedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedState")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("theme", &self.theme)
            .field("sidebar_open", &self.sidebar_open)
            .field("live_updates", &self.live_updates)
            .finish()
    }
}

/// JSON file store for [`PersistedState`] at `<dir>/taleweave-storage.json`.
#[derive(Debug, Clone)]
pub struct StatePersistence {
    path: PathBuf,
}

impl StatePersistence {
    /// Creates a store rooted at `directory`.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            path: directory.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    /// Location of the blob.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the blob. A missing or unreadable file yields `None`.
    #[must_use]
    pub fn load(&self) -> Option<PersistedState> {
        let shown = self.path.display().to_string();
        let _span = storage_span("read", &shown).entered();

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No persisted state");
                return None;
            }
            Err(e) => {
                let error = StorageError::read_error(&shown, e.to_string());
                warn!(%error, "Ignoring persisted state");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                let error = StorageError::DeserializationError {
                    path: shown,
                    reason: e.to_string(),
                };
                warn!(%error, "Ignoring corrupt persisted state");
                None
            }
        }
    }

    /// Writes the blob atomically through a temp file and rename.
    pub fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let shown = self.path.display().to_string();
        let _span = storage_span("write", &shown).entered();

        let json =
            serde_json::to_string_pretty(state).map_err(|e| StorageError::SerializationError {
                reason: e.to_string(),
            })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::write_error(parent.display().to_string(), e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StorageError::write_error(&shown, e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::write_error(&shown, e.to_string()))?;

        debug!("Persisted state saved");
        Ok(())
    }

    /// Removes the blob. Missing files are fine.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::write_error(
                self.path.display().to_string(),
                e.to_string(),
            )),
        }
    }
}
