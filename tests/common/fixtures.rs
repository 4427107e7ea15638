//! Store fixtures backed by mocks or temporary settings files.

use std::path::PathBuf;
use std::sync::Arc;

use mhp::device::mock::MockTransport;
use mhp::settings::JsonFileSettings;
use mhp::settings::mock::MemorySettings;
use mhp::store::DeviceStore;
use tempfile::TempDir;

pub type MockStore = DeviceStore<Arc<MockTransport>, Arc<MemorySettings>>;
pub type FileStore = DeviceStore<Arc<MockTransport>, JsonFileSettings>;

/// Store with shared handles to its mock transport and settings.
pub struct MockHub {
    pub store: MockStore,
    pub transport: Arc<MockTransport>,
    pub settings: Arc<MemorySettings>,
}

impl MockHub {
    pub fn new() -> Self {
        Self::with_parts(MockTransport::new(), MemorySettings::new())
    }

    pub fn with_parts(transport: MockTransport, settings: MemorySettings) -> Self {
        let transport = Arc::new(transport);
        let settings = Arc::new(settings);
        let store = DeviceStore::new(Arc::clone(&transport), Arc::clone(&settings));
        Self {
            store,
            transport,
            settings,
        }
    }
}

/// Temporary directory holding a settings file.
pub struct SettingsDir {
    pub dir: TempDir,
}

impl SettingsDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("settings.json")
    }

    pub fn write(&self, content: &str) {
        std::fs::write(self.path(), content).expect("write settings");
    }

    pub fn read_json(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.path()).expect("read settings");
        serde_json::from_str(&content).expect("settings are JSON")
    }

    /// Open a store on this settings file with a fresh mock transport.
    pub fn open(&self) -> (FileStore, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let store = DeviceStore::new(Arc::clone(&transport), JsonFileSettings::new(self.path()));
        (store, transport)
    }
}
