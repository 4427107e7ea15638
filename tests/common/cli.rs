//! CLI test runner.
//!
//! Every run points `mhp` at a settings file inside its own temporary
//! directory, so tests never touch the user's settings or each other.

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub struct CliRunner {
    dir: TempDir,
}

impl Default for CliRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CliRunner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn settings_path(&self) -> std::path::PathBuf {
        self.dir.path().join("settings.json")
    }

    /// Command for the `mhp` binary with isolated settings and quiet logs.
    #[must_use]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("mhp").expect("mhp binary is built");
        cmd.env_remove("MHP_CONFIG")
            .env_remove("MHP_FORMAT")
            .env("MHP_SETTINGS", self.settings_path())
            .env("RUST_LOG", "off")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run with `--robot` and parse stdout as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the command fails or prints something other than JSON.
    pub fn robot_json(&self, args: &[&str]) -> Value {
        let output = self
            .command()
            .arg("--robot")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let text = String::from_utf8_lossy(&output);
        serde_json::from_str(text.trim())
            .unwrap_or_else(|_| panic!("Failed to parse JSON:\n{text}"))
    }

    /// Settings document as last written by the binary.
    pub fn settings_json(&self) -> Value {
        let content = std::fs::read_to_string(self.settings_path()).expect("read settings");
        serde_json::from_str(&content).expect("settings are JSON")
    }
}
