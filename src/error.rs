//! Error types for Mount Hub Pro driver operations.

use thiserror::Error;

/// Primary error type for driver operations.
#[derive(Error, Debug)]
pub enum MhpError {
    // Request errors (never touch hardware or state)
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    WrongKind(String),

    #[error("{0}")]
    NoOp(String),

    // Device discovery errors
    #[error("Mount Hub Pro not found")]
    NoDeviceFound,

    #[error("Only one Mount Hub Pro can be connected at the same time (found {count})")]
    MultipleDevices { count: usize },

    #[error("Failed to open device '{path}': {reason}")]
    DeviceOpenFailed { path: String, reason: String },

    // Transport errors
    #[error("Device communication error: {0}")]
    Transport(String),

    #[error("Device did not accept the command within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    // Storage errors
    #[error("Failed to save settings: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl MhpError {
    pub fn invalid_switch() -> Self {
        Self::Validation("invalid switch number".to_string())
    }

    pub fn invalid_level() -> Self {
        Self::Validation("invalid switch level".to_string())
    }

    pub fn invalid_position() -> Self {
        Self::Validation("invalid focuser position".to_string())
    }

    /// Stable name of the error category, used in robot output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::WrongKind(_) => "type",
            Self::NoOp(_) => "no_op",
            Self::NoDeviceFound | Self::MultipleDevices { .. } => "device_discovery",
            Self::DeviceOpenFailed { .. } | Self::Transport(_) => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::Io(_) | Self::Other(_) => "other",
        }
    }

    /// True for zero or ambiguous matching devices.
    pub const fn is_discovery_error(&self) -> bool {
        matches!(self, Self::NoDeviceFound | Self::MultipleDevices { .. })
    }

    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::WrongKind(_)
                | Self::NoOp(_)
                | Self::NoDeviceFound
                | Self::MultipleDevices { .. }
                | Self::Timeout { .. }
                | Self::Config(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoDeviceFound => Some("Ensure the Mount Hub Pro is connected via USB"),
            Self::MultipleDevices { .. } => Some("Disconnect all but one Mount Hub Pro"),
            Self::Timeout { .. } => Some("Power-cycle the hub and try again"),
            Self::WrongKind(_) => Some("Use `mhp set` for variable switches"),
            Self::Persistence(_) => {
                Some("The command was applied; check write access to the settings file")
            }
            _ => None,
        }
    }
}

/// Convenience type alias for Results using MhpError.
pub type Result<T> = std::result::Result<T, MhpError>;
