//! Real Mount Hub Pro transport.
//!
//! This module wraps the `hidapi` crate. Every send re-enumerates the bus so
//! that a hub unplugged or duplicated since the last command is noticed.

use std::cell::RefCell;
use std::ffi::CString;

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info, trace, warn};

use super::{HidTransport, HubInfo, REPORT_ID};
use crate::error::{MhpError, Result};
use crate::protocol::{FRAME_LEN, Frame};

/// Hub transport backed by hidapi.
///
/// The opened handle is cached by device path and reopened when the path
/// changes. Not `Sync`; wrap in a [`super::TimedTransport`] to share it.
pub struct HidapiTransport {
    api: RefCell<HidApi>,
    open: RefCell<Option<(CString, HidDevice)>>,
    vendor_id: u16,
    product_id: u16,
}

impl HidapiTransport {
    /// Initialize hidapi for a hub with the given ids.
    pub fn with_ids(vendor_id: u16, product_id: u16) -> Result<Self> {
        let api = HidApi::new().map_err(|e| MhpError::Transport(e.to_string()))?;
        debug!(
            vendor_id = format_args!("{vendor_id:#06x}"),
            product_id = format_args!("{product_id:#06x}"),
            "hidapi initialized"
        );
        Ok(Self {
            api: RefCell::new(api),
            open: RefCell::new(None),
            vendor_id,
            product_id,
        })
    }

    /// Path of the single matching hub.
    fn locate(&self) -> Result<CString> {
        let mut api = self.api.borrow_mut();
        api.refresh_devices()
            .map_err(|e| MhpError::Transport(e.to_string()))?;

        let paths: Vec<CString> = api
            .device_list()
            .filter(|d| d.vendor_id() == self.vendor_id && d.product_id() == self.product_id)
            .map(|d| d.path().to_owned())
            .collect();

        match paths.len() {
            0 => Err(MhpError::NoDeviceFound),
            1 => Ok(paths.into_iter().next().ok_or(MhpError::NoDeviceFound)?),
            count => {
                warn!(count, "Multiple hubs attached");
                Err(MhpError::MultipleDevices { count })
            }
        }
    }
}

impl HidTransport for HidapiTransport {
    fn send(&self, frame: Frame) -> Result<()> {
        let path = match self.locate() {
            Ok(path) => path,
            Err(err) => {
                self.open.borrow_mut().take();
                return Err(err);
            }
        };

        let mut open = self.open.borrow_mut();
        let reuse = open.as_ref().is_some_and(|(cached, _)| *cached == path);
        if !reuse {
            let device = self
                .api
                .borrow()
                .open_path(&path)
                .map_err(|e| MhpError::DeviceOpenFailed {
                    path: path.to_string_lossy().into_owned(),
                    reason: e.to_string(),
                })?;
            info!(path = %path.to_string_lossy(), "Hub opened");
            *open = Some((path, device));
        }
        let Some((_, device)) = open.as_ref() else {
            return Err(MhpError::NoDeviceFound);
        };

        let report = output_report(frame);
        trace!(report = %hex::encode(report), "Writing output report");

        let written = match device.write(&report) {
            Ok(written) => written,
            Err(e) => {
                open.take();
                return Err(MhpError::Transport(e.to_string()));
            }
        };
        check_written(written, report.len())?;
        debug!(%frame, "Frame sent");
        Ok(())
    }
}

/// Output report for `frame`: report id followed by the frame bytes.
fn output_report(frame: Frame) -> [u8; FRAME_LEN + 1] {
    let mut report = [0u8; FRAME_LEN + 1];
    report[0] = REPORT_ID;
    report[1..].copy_from_slice(&frame.to_bytes());
    report
}

/// The whole report must reach the device, report id included.
fn check_written(written: usize, expected: usize) -> Result<()> {
    if written < expected {
        return Err(MhpError::Transport(format!(
            "short write: {written} of {expected} bytes"
        )));
    }
    Ok(())
}

/// List all attached hubs with the given ids.
pub fn list_devices(vendor_id: u16, product_id: u16) -> Result<Vec<HubInfo>> {
    let api = HidApi::new().map_err(|e| MhpError::Transport(e.to_string()))?;
    let hubs = api
        .device_list()
        .filter(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
        .map(|d| HubInfo {
            path: d.path().to_string_lossy().into_owned(),
            vendor_id: d.vendor_id(),
            product_id: d.product_id(),
            serial: d.serial_number().map(str::to_string),
            product_name: d.product_string().map(str::to_string),
        })
        .collect();
    Ok(hubs)
}
