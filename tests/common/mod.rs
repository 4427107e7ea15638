//! Common test utilities for the mhp driver.
//!
//! - `fixtures`: stores wired to mock transports and settings files
//! - `cli`: runner for the `mhp` binary with an isolated settings file
#![allow(dead_code)]

pub mod cli;
pub mod fixtures;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
