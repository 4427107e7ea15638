//! Human-mode end-to-end tests.

use predicates::prelude::*;

use crate::common::cli::CliRunner;

#[test]
fn human_quick_start_lists_commands() {
    let cli = CliRunner::new();
    cli.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("QUICK START"))
        .stdout(predicate::str::contains("mhp move <POSITION>"));
}

#[test]
fn human_status_shows_switches() {
    let cli = CliRunner::new();
    cli.command()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mount Hub Pro"))
        .stdout(predicate::str::contains("Switch 8"))
        .stdout(predicate::str::contains("0/100"))
        .stdout(predicate::str::contains("1000 / 65535"));
}

#[test]
fn human_validation_error_is_reported() {
    let cli = CliRunner::new();
    cli.command()
        .args(["rename", "40", "x"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: invalid switch number"));
}

#[test]
fn human_speed_shows_current_value() {
    let cli = CliRunner::new();
    cli.command()
        .arg("speed")
        .assert()
        .success()
        .stdout(predicate::str::contains("speed 50%"));
}

#[test]
fn completions_are_generated() {
    let cli = CliRunner::new();
    cli.command()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mhp"));
}

#[test]
fn version_is_printed() {
    let cli = CliRunner::new();
    cli.command()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_color_env_accepts_conventional_values() {
    let cli = CliRunner::new();
    for value in ["1", "yes", "true"] {
        cli.command()
            .env("NO_COLOR", value)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Mount Hub Pro"))
            .stdout(predicate::str::contains("\u{1b}[").not());
    }
}
