//! Human-friendly output implementation using console styles.

use tracing::{debug, instrument, trace};

use crate::device::HubInfo;
use crate::error::MhpError;
use crate::store::DeviceDescription;
use crate::theme::MhpTheme;

use super::{
    ConfigReport, FocuserStatus, Output, StatusReport, SwitchKind, SwitchStatus, VersionInfo,
};

/// Styled terminal output implementation for human users.
pub struct HumanOutput {
    theme: MhpTheme,
}

impl HumanOutput {
    #[instrument]
    pub fn new(color: bool) -> Self {
        debug!("Creating HumanOutput");
        let theme = if color {
            MhpTheme::default()
        } else {
            MhpTheme::plain()
        };
        Self { theme }
    }

    fn label(&self, name: &str) -> String {
        self.theme.label.apply_to(format!("  {name:<12}")).to_string()
    }

    fn switch_state(&self, switch: &SwitchStatus) -> String {
        match (switch.kind, switch.on) {
            (SwitchKind::OnOff, Some(true)) => self.theme.switch_on.apply_to("on").to_string(),
            (SwitchKind::OnOff, _) => self.theme.switch_off.apply_to("off").to_string(),
            (SwitchKind::Variable, _) => self
                .theme
                .level
                .apply_to(format!("{}/{}", switch.value, switch.max))
                .to_string(),
        }
    }

    fn focuser_line(&self, focuser: &FocuserStatus) -> String {
        format!(
            "{} / {}  speed {}%",
            self.theme.position.apply_to(focuser.position),
            focuser.max_step,
            focuser.speed
        )
    }
}

impl Output for HumanOutput {
    fn success(&self, message: &str) {
        println!("{}{message}", self.theme.success.apply_to("[OK] "));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &MhpError) {
        debug!(error = %error, "Outputting error");
        eprintln!("{} {error}", self.theme.error.apply_to("Error:").bold());
        if let Some(hint) = error.suggestion() {
            eprintln!("  {} {hint}", self.theme.muted.apply_to("Hint:"));
        }
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {message}", self.theme.warning.apply_to("Warning:"));
    }

    fn status(&self, report: &StatusReport) {
        println!("{}", self.theme.header.apply_to("Mount Hub Pro"));
        let connected = if report.connected {
            self.theme.switch_on.apply_to("yes")
        } else {
            self.theme.switch_off.apply_to("no")
        };
        println!("{}{connected}", self.label("Connected"));
        println!("{}{}", self.label("Focuser"), self.focuser_line(&report.focuser));
        println!();

        println!("{}", self.theme.header.apply_to("Switches"));
        for switch in &report.switches {
            trace!(id = switch.id, "Listing switch");
            println!(
                "  {:>2}  {:<20} {}",
                switch.id,
                switch.name,
                self.switch_state(switch)
            );
        }
    }

    fn devices(&self, devices: &[DeviceDescription]) {
        println!("{}", self.theme.header.apply_to("Configured devices"));
        for device in devices {
            println!(
                "  {:<14} {:<8} {}",
                device.name,
                device.device_type,
                self.theme.muted.apply_to(&device.unique_id)
            );
        }
    }

    fn hubs(&self, hubs: &[HubInfo]) {
        if hubs.is_empty() {
            self.warning("No Mount Hub Pro attached");
            return;
        }
        println!("{}", self.theme.header.apply_to("Attached hubs"));
        for hub in hubs {
            let serial = hub.serial.as_deref().unwrap_or("no serial");
            println!("  {} ({})", hub.path, self.theme.muted.apply_to(serial));
        }
        if hubs.len() > 1 {
            self.warning("Only one hub can be driven at a time");
        }
    }

    fn switch_updated(&self, switch: &SwitchStatus) {
        println!(
            "{}{} set to {}",
            self.theme.success.apply_to("[OK] "),
            switch.name,
            self.switch_state(switch)
        );
    }

    fn focuser_updated(&self, focuser: &FocuserStatus) {
        println!(
            "{}Focuser at {}",
            self.theme.success.apply_to("[OK] "),
            self.focuser_line(focuser)
        );
    }

    fn connection_updated(&self, connected: bool) {
        let state = if connected { "connected" } else { "disconnected" };
        self.success(&format!("Marked {state}"));
    }

    fn config(&self, report: &ConfigReport) {
        println!("{}", self.theme.header.apply_to("Configuration"));
        if let Some(file) = &report.config_file {
            println!("{}{file}", self.label("Config"));
        }
        println!("{}{}", self.label("Settings"), report.settings_path);
        println!("{}{} ms", self.label("Timeout"), report.send_timeout_ms);
        println!(
            "{}{}:{}",
            self.label("USB id"),
            report.vendor_id,
            report.product_id
        );
    }

    fn version_info(&self, info: &VersionInfo) {
        println!();
        println!("{}{}", self.label("Version"), self.theme.value.apply_to(info.version));
        let dirty = if info.git_dirty {
            self.theme.warning.apply_to(" (dirty)").to_string()
        } else {
            String::new()
        };
        println!("{}{}{dirty}", self.label("Git SHA"), self.theme.value.apply_to(info.git_sha));
        println!(
            "{}{}",
            self.label("Built"),
            self.theme.muted.apply_to(info.build_timestamp)
        );
        println!("{}{}", self.label("Rustc"), info.rustc_version);
        println!("{}{}", self.label("Target"), info.target);
    }
}
