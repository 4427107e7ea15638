//! Mount Hub Pro driver library - focuser and switch control over USB HID.
//!
//! This library exposes the core of the `mhp` CLI for use in tests and by
//! device servers that front the hub.
//!
//! # Modules
//!
//! - `protocol`: 8-byte command frame encoding
//! - `slot`: typed slot ids and the switch id offset
//! - `state`: device records, defaults and the persisted snapshot layout
//! - `store`: thread-safe state store driving the hub
//! - `device`: HID transports (hidapi, timed worker, mock)
//! - `settings`: snapshot persistence
//! - `config`: driver configuration file
//! - `output`: output mode abstraction (robot/human)
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod output;
pub mod protocol;
pub mod settings;
pub mod slot;
pub mod state;
pub mod store;
pub mod theme;

pub use device::HidTransport;
pub use error::{MhpError, Result};
pub use settings::SettingsBackend;
pub use store::DeviceStore;
