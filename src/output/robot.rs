//! Robot mode JSON output implementation.

use serde::Serialize;
use tracing::{debug, error, instrument, trace};

use crate::device::HubInfo;
use crate::error::MhpError;
use crate::store::DeviceDescription;

use super::{
    ConfigReport, FocuserStatus, Output, RobotFormat, StatusReport, SwitchStatus, VersionInfo,
};

/// JSON output implementation for agents and scripting.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    fn render<T: Serialize + ?Sized>(&self, data: &T, pretty: bool) -> Option<String> {
        let result = if pretty {
            serde_json::to_string_pretty(data)
        } else {
            serde_json::to_string(data)
        };
        match result {
            Ok(json) => {
                trace!(json_len = json.len(), "JSON serialized");
                Some(json)
            }
            Err(e) => {
                error!(error = %e, "JSON serialization failed");
                None
            }
        }
    }

    /// Output any serializable data as JSON to stdout.
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let pretty = matches!(self.format, RobotFormat::Json);
        if let Some(json) = self.render(data, pretty) {
            println!("{json}");
        }
    }

    /// Output JSON to stderr.
    fn output_json_stderr<T: Serialize>(&self, data: &T) {
        let pretty = matches!(self.format, RobotFormat::Json);
        if let Some(json) = self.render(data, pretty) {
            eprintln!("{json}");
        }
    }
}

/// Error document written to stderr.
pub fn error_json(error: &MhpError) -> serde_json::Value {
    serde_json::json!({
        "error": true,
        "kind": error.kind(),
        "message": error.to_string(),
        "suggestion": error.suggestion(),
        "recoverable": error.is_user_recoverable(),
    })
}

impl Output for RobotOutput {
    fn success(&self, message: &str) {
        self.output_json(&serde_json::json!({
            "success": true,
            "message": message
        }));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &MhpError) {
        debug!(error = %error, "Robot: error");
        self.output_json_stderr(&error_json(error));
    }

    fn warning(&self, message: &str) {
        self.output_json_stderr(&serde_json::json!({
            "warning": true,
            "message": message
        }));
    }

    fn status(&self, report: &StatusReport) {
        self.output_json(report);
    }

    fn devices(&self, devices: &[DeviceDescription]) {
        self.output_json(devices);
    }

    fn hubs(&self, hubs: &[HubInfo]) {
        self.output_json(&serde_json::json!({
            "count": hubs.len(),
            "hubs": hubs,
        }));
    }

    fn switch_updated(&self, switch: &SwitchStatus) {
        self.output_json(&serde_json::json!({
            "success": true,
            "switch": switch,
        }));
    }

    fn focuser_updated(&self, focuser: &FocuserStatus) {
        self.output_json(&serde_json::json!({
            "success": true,
            "focuser": focuser,
        }));
    }

    fn connection_updated(&self, connected: bool) {
        self.output_json(&serde_json::json!({
            "success": true,
            "connected": connected,
        }));
    }

    fn config(&self, report: &ConfigReport) {
        self.output_json(report);
    }

    fn version_info(&self, info: &VersionInfo) {
        self.output_json(info);
    }
}
