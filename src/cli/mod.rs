//! CLI argument definitions and command dispatch.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mount Hub Pro driver - focuser and switch control over USB HID.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "mhp", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "MHP_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose logging (-v debug with frame bytes, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output (any non-empty NO_COLOR also disables it)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Settings file holding the persisted device state
    #[arg(long, global = true, env = "MHP_SETTINGS", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Driver configuration file (TOML)
    #[arg(long, global = true, env = "MHP_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Upper bound on a single HID write, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === State ===
    /// Show focuser and switch state
    Status,

    /// List configured devices, or attached hubs with --attached
    Devices(DevicesArgs),

    // === Switches ===
    /// Turn an on/off switch (0-7) on or off
    Switch(SwitchArgs),

    /// Set a switch value (0-1 for on/off switches, 0-100 for dew heaters)
    Set(SetArgs),

    /// Give a switch a custom name (empty to reset)
    Rename(RenameArgs),

    // === Focuser ===
    /// Move the focuser to an absolute position
    #[command(name = "move")]
    Move(MoveArgs),

    /// Show or set the focuser speed percentage
    Speed(SpeedArgs),

    /// Record the client connection flag
    Connect(ConnectArgs),

    // === Utilities ===
    /// Show the effective configuration
    Config,

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct DevicesArgs {
    /// List hubs attached over USB instead of configured slots
    #[arg(long, short = 'a')]
    pub attached: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwitchState {
    On,
    Off,
}

#[derive(Parser, Debug)]
pub struct SwitchArgs {
    /// Switch id (0-based)
    #[arg(allow_negative_numbers = true)]
    pub id: i32,

    /// Desired state
    pub state: SwitchState,
}

#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Switch id (0-based)
    #[arg(allow_negative_numbers = true)]
    pub id: i32,

    /// New value
    #[arg(allow_negative_numbers = true)]
    pub value: i64,
}

#[derive(Parser, Debug)]
pub struct RenameArgs {
    /// Switch id (0-based)
    #[arg(allow_negative_numbers = true)]
    pub id: i32,

    /// Custom name
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct MoveArgs {
    /// Target position in steps
    #[arg(allow_negative_numbers = true)]
    pub position: i32,
}

#[derive(Parser, Debug)]
pub struct SpeedArgs {
    /// Speed percentage (0-100); omit to show the current speed
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    pub percent: Option<u8>,
}

#[derive(Parser, Debug)]
pub struct ConnectArgs {
    /// true or false
    #[arg(action = ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
    pub connected: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
