//! In-memory settings backend for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::SettingsBackend;
use crate::error::{MhpError, Result};
use crate::state::Snapshot;

/// Settings kept in memory, with save counting and failure injection.
#[derive(Default)]
pub struct MemorySettings {
    stored: Mutex<Option<Snapshot>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            stored: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Make every following save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Last saved snapshot.
    #[must_use]
    pub fn stored(&self) -> Option<Snapshot> {
        self.stored.lock().clone()
    }
}

impl SettingsBackend for MemorySettings {
    fn load(&self) -> Option<Snapshot> {
        self.stored()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(MhpError::Persistence("Mock save failure".to_string()));
        }
        *self.stored.lock() = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
