//! Driver configuration.
//!
//! An optional TOML file tunes the driver without recompiling:
//!
//! ```toml
//! settings_path = "~/.config/mhp/settings.json"
//! send_timeout_ms = 500
//! vendor_id = 0x12BF
//! product_id = 0xFF03
//! ```
//!
//! Every key is optional. Command-line flags override the file.

mod path;

pub use path::{home_dir, resolve_path};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::device::{PRODUCT_ID, VENDOR_ID};
use crate::error::{MhpError, Result};

/// Default send timeout in milliseconds.
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 500;

/// Tunable driver settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Where device state is persisted. Relative paths resolve against the
    /// config file's directory.
    pub settings_path: Option<PathBuf>,

    /// Upper bound on a single HID write.
    pub send_timeout_ms: u64,

    pub vendor_id: u16,
    pub product_id: u16,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            settings_path: None,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
        }
    }
}

impl DriverConfig {
    /// Load and validate a config file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MhpError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(settings) = config.settings_path.take() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.settings_path = Some(resolve_path(&settings, base)?);
        }
        debug!(?config, "Loaded driver config");
        Ok(config)
    }

    /// Parse and validate TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| MhpError::Config(format!("TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.send_timeout_ms == 0 {
            return Err(MhpError::Config(
                "send_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Serialize as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MhpError::Config(format!("TOML: {e}")))
    }
}
