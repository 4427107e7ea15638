//! Mount Hub Pro CLI - focuser and switch control over USB HID.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing::debug;

use mhp::cli::{Cli, Commands, SwitchState};
use mhp::config::DriverConfig;
use mhp::device::{self, TimedTransport};
use mhp::error::Result;
use mhp::logging::init_logging;
use mhp::output::{
    ConfigReport, FocuserStatus, Output, OutputMode, StatusReport, SwitchStatus, VersionInfo,
};
use mhp::settings::{JsonFileSettings, default_settings_path};
use mhp::slot::Slot;
use mhp::store::DeviceStore;

type Store = DeviceStore<TimedTransport, JsonFileSettings>;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> bool {
        option_env!("VERGEN_GIT_DIRTY") == Some("true")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

/// Effective settings for one invocation: config file plus flag overrides.
struct Context {
    config: DriverConfig,
    config_file: Option<PathBuf>,
    settings_path: PathBuf,
}

impl Context {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => DriverConfig::load(path)?,
            None => DriverConfig::default(),
        };
        if let Some(timeout_ms) = cli.timeout_ms {
            config.send_timeout_ms = timeout_ms;
            config.validate()?;
        }
        let settings_path = cli
            .settings
            .clone()
            .or_else(|| config.settings_path.clone())
            .unwrap_or_else(default_settings_path);
        debug!(settings = %settings_path.display(), ?config, "Effective configuration");

        Ok(Self {
            config,
            config_file: cli.config.clone(),
            settings_path,
        })
    }

    fn open_store(&self) -> Store {
        let transport = device::open_with_ids(
            self.config.vendor_id,
            self.config.product_id,
            self.config.send_timeout(),
        );
        DeviceStore::new(transport, JsonFileSettings::new(&self.settings_path))
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let output = OutputMode::from_cli(&cli).into_output();
    if let Err(e) = run(&cli, output.as_ref()) {
        output.error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &dyn Output) -> Result<()> {
    let Some(command) = &cli.command else {
        print_quick_start(cli);
        return Ok(());
    };

    match command {
        Commands::Version => {
            cmd_version(output);
            return Ok(());
        }
        Commands::Completions(args) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "mhp", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let ctx = Context::from_cli(cli)?;
    match command {
        Commands::Config => {
            output.config(&ConfigReport::new(
                &ctx.config,
                ctx.config_file.as_ref().map(|p| p.display().to_string()),
                ctx.settings_path.display().to_string(),
            ));
            Ok(())
        }
        Commands::Devices(args) if args.attached => {
            let hubs = device::list_devices(ctx.config.vendor_id, ctx.config.product_id)?;
            output.hubs(&hubs);
            Ok(())
        }
        _ => run_with_store(command, &ctx.open_store(), output),
    }
}

fn run_with_store(command: &Commands, store: &Store, output: &dyn Output) -> Result<()> {
    match command {
        Commands::Status => {
            output.status(&StatusReport::from_state(&store.snapshot()));
        }
        Commands::Devices(_) => output.devices(&store.configured_devices()),
        Commands::Switch(args) => {
            store.set_on_off(args.id, args.state == SwitchState::On)?;
            report_switch(store, args.id, output)?;
        }
        Commands::Set(args) => {
            store.set_value(args.id, args.value)?;
            report_switch(store, args.id, output)?;
        }
        Commands::Rename(args) => {
            store.set_custom_name(args.id, &args.name)?;
            output.success(&format!("Switch {} is now '{}'", args.id, store.name(args.id)?));
        }
        Commands::Move(args) => {
            store.move_to(args.position)?;
            output.focuser_updated(&FocuserStatus::from_state(&store.snapshot()));
        }
        Commands::Speed(args) => {
            if let Some(percent) = args.percent {
                store.set_speed(percent)?;
            }
            output.focuser_updated(&FocuserStatus::from_state(&store.snapshot()));
        }
        Commands::Connect(args) => {
            store.set_connected(args.connected)?;
            output.connection_updated(store.connected());
        }
        Commands::Config | Commands::Version | Commands::Completions(_) => {}
    }
    Ok(())
}

fn report_switch(store: &Store, id: i32, output: &dyn Output) -> Result<()> {
    let slot = Slot::from_switch_id(id)?;
    if let Some(status) = SwitchStatus::from_state(&store.snapshot(), slot) {
        output.switch_updated(&status);
    }
    Ok(())
}

fn cmd_version(output: &dyn Output) {
    output.version_info(&VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty(),
        build_timestamp: build_info::build_timestamp(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    });
}

// === Quick Start ===

#[derive(Serialize)]
struct QuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    commands: [(&'static str, &'static str); 8],
    switch_ids: &'static str,
    output_modes: &'static str,
}

const COMMANDS: [(&str, &str); 8] = [
    ("mhp status", "Show focuser and switch state"),
    ("mhp devices", "List configured devices"),
    ("mhp switch <ID> on|off", "Toggle an on/off switch (ids 0-7)"),
    ("mhp set <ID> <VALUE>", "Set a dew heater level (ids 8-11, 0-100)"),
    ("mhp move <POSITION>", "Move the focuser"),
    ("mhp speed [PERCENT]", "Show or set focuser speed"),
    ("mhp rename <ID> <NAME>", "Name a switch"),
    ("mhp devices --attached", "List hubs on the USB bus"),
];

fn print_quick_start(cli: &Cli) {
    if cli.use_json() {
        let help = QuickStart {
            tool: "mhp",
            version: build_info::VERSION,
            description: "Mount Hub Pro focuser and switch driver",
            commands: COMMANDS,
            switch_ids: "0-7 on/off switches, 8-11 dew heaters",
            output_modes: "--format=text (default), --robot or --format=json, --format=json-compact",
        };
        if let Ok(json) = serde_json::to_string_pretty(&help) {
            println!("{json}");
        }
        return;
    }

    let bold = console::Style::new().bold();
    let green = console::Style::new().green();
    println!("{} {} - Mount Hub Pro driver\n", bold.apply_to("mhp"), build_info::VERSION);
    println!("{}", bold.apply_to("QUICK START").underlined());
    println!();
    for (command, about) in COMMANDS {
        println!("  {:<26}{about}", green.apply_to(command));
    }
    println!();
    println!("Run {} for full help", console::Style::new().yellow().apply_to("mhp --help"));
}
