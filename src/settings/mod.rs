//! Settings persistence.
//!
//! Device state survives restarts as one JSON document holding a
//! [`Snapshot`]. The document is rewritten whole after every committed
//! change.
//!
//! # Location
//!
//! ```text
//! ~/.config/mhp/
//! └── settings.json
//! ```
//!
//! A missing, unreadable or corrupt document is not an error: [`load`]
//! reports it and the store starts from defaults.
//!
//! [`load`]: SettingsBackend::load

pub mod mock;

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::error::{MhpError, Result};
use crate::state::Snapshot;

/// Settings file name inside the settings directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Storage for the persisted device state.
pub trait SettingsBackend {
    /// Read the last saved snapshot, or `None` when nothing usable exists.
    fn load(&self) -> Option<Snapshot>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` when the snapshot could not be written.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

impl<T: SettingsBackend + ?Sized> SettingsBackend for Box<T> {
    fn load(&self) -> Option<Snapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}

impl<T: SettingsBackend + ?Sized> SettingsBackend for std::sync::Arc<T> {
    fn load(&self) -> Option<Snapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}

/// Default settings location.
///
/// Location: `<config dir>/mhp/settings.json`, or `./settings.json` when the
/// platform has no config directory.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(SETTINGS_FILE),
        |dir| dir.join("mhp").join(SETTINGS_FILE),
    )
}

/// Settings stored as pretty-printed JSON in a single file.
///
/// Writes go to a temporary file in the same directory which then replaces
/// the target, so a crash mid-write leaves the previous document intact.
pub struct JsonFileSettings {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Settings at [`default_settings_path`].
    pub fn open_default() -> Self {
        Self::new(default_settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| {
            MhpError::Persistence(format!("Failed to create directory {}: {e}", dir.display()))
        })?;

        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| MhpError::Persistence(format!("Failed to encode settings: {e}")))?;

        let mut file = NamedTempFile::new_in(dir)
            .map_err(|e| MhpError::Persistence(format!("Failed to create temp file: {e}")))?;
        file.write_all(&json)
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| MhpError::Persistence(format!("Failed to write settings: {e}")))?;
        file.persist(&self.path).map_err(|e| {
            MhpError::Persistence(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e.error
            ))
        })?;
        Ok(())
    }
}

impl SettingsBackend for JsonFileSettings {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Option<Snapshot> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file, starting from defaults");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Settings file unreadable, starting from defaults");
                return None;
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => {
                debug!(saved_at = ?snapshot.saved_at, "Settings loaded");
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "Settings file malformed, starting from defaults");
                None
            }
        }
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write(snapshot)?;
        debug!("Settings saved");
        Ok(())
    }
}
