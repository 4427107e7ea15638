//! Output mode abstraction for robot and human output.

use serde::Serialize;

use crate::cli::Cli;
use crate::config::DriverConfig;
use crate::device::HubInfo;
use crate::error::MhpError;
use crate::slot::Slot;
use crate::state::DeviceState;
use crate::store::DeviceDescription;

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

// === Report Types ===

/// Kind of a switch as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    OnOff,
    Variable,
}

/// One switch in a status report.
#[derive(Debug, Clone, Serialize)]
pub struct SwitchStatus {
    pub id: i32,
    pub name: String,
    pub kind: SwitchKind,
    pub value: i64,
    pub max: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
}

impl SwitchStatus {
    /// Status of the switch in `slot`, `None` for the focuser.
    pub fn from_state(state: &DeviceState, slot: Slot) -> Option<Self> {
        let id = slot.switch_id()?;
        let record = state.record(slot);
        let binary = record.is_binary();
        Some(Self {
            id,
            name: record.display_name().to_string(),
            kind: if binary {
                SwitchKind::OnOff
            } else {
                SwitchKind::Variable
            },
            value: record.value,
            max: record.max,
            on: binary.then_some(record.value != 0),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FocuserStatus {
    pub position: i32,
    pub max_step: i32,
    pub max_increment: i32,
    pub speed: u8,
    pub is_moving: bool,
}

impl FocuserStatus {
    pub fn from_state(state: &DeviceState) -> Self {
        Self {
            position: state.focuser.position,
            max_step: state.focuser.max_step,
            max_increment: state.focuser.max_increment,
            speed: state.focuser.speed,
            is_moving: false,
        }
    }
}

/// Full view of the committed state.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub connected: bool,
    pub focuser: FocuserStatus,
    pub switches: Vec<SwitchStatus>,
}

impl StatusReport {
    pub fn from_state(state: &DeviceState) -> Self {
        Self {
            connected: state.focuser.connected,
            focuser: FocuserStatus::from_state(state),
            switches: Slot::switches()
                .filter_map(|slot| SwitchStatus::from_state(state, slot))
                .collect(),
        }
    }
}

/// Effective configuration and where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub settings_path: String,
    pub send_timeout_ms: u64,
    pub vendor_id: String,
    pub product_id: String,
}

impl ConfigReport {
    pub fn new(config: &DriverConfig, config_file: Option<String>, settings_path: String) -> Self {
        Self {
            config_file,
            settings_path,
            send_timeout_ms: config.send_timeout_ms,
            vendor_id: format!("{:#06x}", config.vendor_id),
            product_id: format!("{:#06x}", config.product_id),
        }
    }
}

/// Build metadata for `mhp version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
    pub target: &'static str,
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    /// JSON output for agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output; `color` false forces plain text.
    Human { color: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human {
                color: !cli.no_color && console::colors_enabled(),
            }
        }
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human { color } => Box::new(HumanOutput::new(color)),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    // Basic messages
    fn success(&self, message: &str);
    fn error(&self, error: &MhpError);
    fn warning(&self, message: &str);

    // State
    fn status(&self, report: &StatusReport);
    fn devices(&self, devices: &[DeviceDescription]);
    fn hubs(&self, hubs: &[HubInfo]);
    fn switch_updated(&self, switch: &SwitchStatus);
    fn focuser_updated(&self, focuser: &FocuserStatus);
    fn connection_updated(&self, connected: bool);

    // Metadata
    fn config(&self, report: &ConfigReport);
    fn version_info(&self, info: &VersionInfo);
}
