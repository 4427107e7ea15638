//! Transport layer for the Mount Hub Pro.
//!
//! The hub accepts 8-byte output reports and never answers. Everything above
//! this module talks to a [`HidTransport`], so the store can be driven by real
//! hardware, a timed worker wrapping real hardware, or a recording mock.

pub mod mock;
mod real;
mod timed;

pub use real::{HidapiTransport, list_devices};
pub use timed::{DEFAULT_SEND_TIMEOUT, TimedTransport};

use crate::error::Result;
use crate::protocol::Frame;

/// USB vendor id of the Mount Hub Pro.
pub const VENDOR_ID: u16 = 0x12BF;

/// USB product id of the Mount Hub Pro.
pub const PRODUCT_ID: u16 = 0xFF03;

/// Report id prefixed to every output report.
pub const REPORT_ID: u8 = 0x00;

/// Sends encoded frames to the hub.
///
/// # Implementation Notes
///
/// - A send either delivers the whole frame or fails; there are no retries
/// - Implementations must fail with `NoDeviceFound` or `MultipleDevices`
///   unless exactly one matching hub is attached
pub trait HidTransport {
    /// Deliver one frame.
    ///
    /// # Errors
    ///
    /// Returns a discovery error when the hub is absent or ambiguous, and a
    /// transport error when the write fails or times out.
    fn send(&self, frame: Frame) -> Result<()>;
}

impl<T: HidTransport + ?Sized> HidTransport for Box<T> {
    fn send(&self, frame: Frame) -> Result<()> {
        (**self).send(frame)
    }
}

impl<T: HidTransport + ?Sized> HidTransport for std::sync::Arc<T> {
    fn send(&self, frame: Frame) -> Result<()> {
        (**self).send(frame)
    }
}

/// Identity of an attached hub.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HubInfo {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
    pub product_name: Option<String>,
}

/// Transport for the default hub ids, with sends bounded by `timeout`.
pub fn open_default(timeout: std::time::Duration) -> TimedTransport {
    open_with_ids(VENDOR_ID, PRODUCT_ID, timeout)
}

/// Transport for a hub with the given ids, with sends bounded by `timeout`.
pub fn open_with_ids(vendor_id: u16, product_id: u16, timeout: std::time::Duration) -> TimedTransport {
    TimedTransport::spawn(move || HidapiTransport::with_ids(vendor_id, product_id), timeout)
}
