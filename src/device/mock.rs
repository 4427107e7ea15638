//! Mock transport implementation for unit testing.
//!
//! This module provides a mock hub that records every frame it is given
//! and supports error injection and assertions.
//!
//! # Example
//!
//! ```rust,ignore
//! use mhp::device::mock::MockTransport;
//! use mhp::device::HidTransport;
//! use mhp::protocol::Frame;
//!
//! let mock = MockTransport::new();
//! mock.send(Frame::from_raw(0x64)).unwrap();
//! mock.assert_frames(&[Frame::from_raw(0x64)]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::HidTransport;
use crate::error::{MhpError, Result};
use crate::protocol::Frame;

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Fail every send once N frames have been accepted.
    pub fail_after_frames: Option<usize>,
    /// Sleep this long inside every send.
    pub delay: Option<Duration>,
}

/// Mock hub for testing without real hardware.
pub struct MockTransport {
    frames: Mutex<Vec<Frame>>,
    error_injection: Mutex<Option<MhpError>>,
    config: MockConfig,
    connected: AtomicBool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a connected mock hub.
    #[must_use]
    pub fn new() -> Self {
        debug!("Creating mock transport");
        Self {
            frames: Mutex::new(Vec::new()),
            error_injection: Mutex::new(None),
            config: MockConfig::default(),
            connected: AtomicBool::new(true),
        }
    }

    // === Configuration ===

    #[must_use]
    pub fn with_config(mut self, config: MockConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config.delay = Some(delay);
        self
    }

    #[must_use]
    pub fn with_fail_after(mut self, frames: usize) -> Self {
        self.config.fail_after_frames = Some(frames);
        self
    }

    /// Inject an error for the next send.
    pub fn inject_error(&self, error: MhpError) {
        *self.error_injection.lock() = Some(error);
    }

    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Simulate an unplugged hub.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    // === Assertions ===

    /// All frames accepted so far.
    #[must_use]
    pub fn sent_frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Assert exactly these frames were sent, in order.
    ///
    /// # Panics
    ///
    /// Panics if the frames don't match.
    pub fn assert_frames(&self, expected: &[Frame]) {
        let actual = self.sent_frames();
        assert_eq!(
            actual, expected,
            "Frame mismatch.\nExpected: {expected:#?}\nActual: {actual:#?}",
        );
    }

    /// Assert nothing was sent.
    ///
    /// # Panics
    ///
    /// Panics if any frame was recorded.
    pub fn assert_no_frames(&self) {
        let frames = self.sent_frames();
        assert!(frames.is_empty(), "Expected no frames, but found: {frames:#?}");
    }

    /// Forget recorded frames.
    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    fn check_error(&self) -> Result<()> {
        if let Some(error) = self.error_injection.lock().take() {
            return Err(error);
        }

        if !self.connected.load(Ordering::SeqCst) {
            return Err(MhpError::NoDeviceFound);
        }

        if let Some(limit) = self.config.fail_after_frames {
            if self.frames.lock().len() >= limit {
                return Err(MhpError::Transport(
                    "Mock failure after frame limit".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl HidTransport for MockTransport {
    fn send(&self, frame: Frame) -> Result<()> {
        if let Some(delay) = self.config.delay {
            std::thread::sleep(delay);
        }
        self.check_error()?;
        trace!(%frame, "Recording frame");
        self.frames.lock().push(frame);
        Ok(())
    }
}
