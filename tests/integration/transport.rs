//! Discovery errors and send timeouts seen through the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mhp::device::mock::MockTransport;
use mhp::device::{DEFAULT_SEND_TIMEOUT, HidTransport, TimedTransport};
use mhp::error::MhpError;
use mhp::protocol::Frame;
use mhp::settings::mock::MemorySettings;
use mhp::store::DeviceStore;

#[test]
fn test_timeout_when_send_exceeds_bound() {
    let inner = Arc::new(MockTransport::new().with_delay(Duration::from_millis(400)));
    let shared = Arc::clone(&inner);
    let timed = TimedTransport::spawn(move || Ok(Arc::clone(&shared)), Duration::from_millis(50));

    let started = Instant::now();
    let err = timed.send(Frame::from_raw(0x64)).unwrap_err();
    assert!(matches!(err, MhpError::Timeout { timeout_ms: 50 }));
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[test]
fn test_timed_out_switch_is_not_committed() {
    let inner = Arc::new(MockTransport::new().with_delay(Duration::from_millis(300)));
    let shared = Arc::clone(&inner);
    let timed = TimedTransport::spawn(move || Ok(Arc::clone(&shared)), Duration::from_millis(20));
    let settings = Arc::new(MemorySettings::new());
    let store = DeviceStore::new(timed, Arc::clone(&settings));

    let err = store.set_on_off(0, true).unwrap_err();
    assert_eq!(err.kind(), "timeout");
    assert!(!store.on_off(0).unwrap());
    assert_eq!(settings.save_count(), 1);
}

/// A move rejected after a timeout never reaches the hub later.
#[test]
fn test_failed_moves_are_not_delivered_late() {
    let inner = Arc::new(MockTransport::new().with_delay(Duration::from_millis(200)));
    let shared = Arc::clone(&inner);
    let timed = TimedTransport::spawn(move || Ok(Arc::clone(&shared)), Duration::from_millis(20));
    let store = DeviceStore::new(timed, MemorySettings::new());

    let first = store.move_to(1100).unwrap_err();
    assert_eq!(first.kind(), "timeout");
    let second = store.move_to(1100).unwrap_err();
    assert_eq!(second.kind(), "transport");
    assert_eq!(store.position(), 1000);

    std::thread::sleep(Duration::from_millis(400));
    // Only the write already under way at the timeout landed.
    assert_eq!(inner.frame_count(), 1);
    assert!(!store.transport().is_stalled());
}

#[test]
fn test_fast_send_within_bound() {
    let inner = Arc::new(MockTransport::new());
    let shared = Arc::clone(&inner);
    let timed = TimedTransport::spawn(move || Ok(Arc::clone(&shared)), DEFAULT_SEND_TIMEOUT);
    let store = DeviceStore::new(timed, MemorySettings::new());

    store.set_value(9, 25).unwrap();
    assert_eq!(store.value(9).unwrap(), 25);
    assert_eq!(inner.frame_count(), 1);
}

#[test]
fn test_discovery_errors_surface_unchanged() {
    let transport = Arc::new(MockTransport::new());
    let store = DeviceStore::new(Arc::clone(&transport), MemorySettings::new());

    transport.inject_error(MhpError::MultipleDevices { count: 2 });
    let err = store.set_on_off(3, true).unwrap_err();
    assert!(err.is_discovery_error());
    assert_eq!(
        err.to_string(),
        "Only one Mount Hub Pro can be connected at the same time (found 2)"
    );

    transport.disconnect();
    let err = store.set_value(10, 5).unwrap_err();
    assert!(matches!(err, MhpError::NoDeviceFound));
    assert_eq!(store.value(10).unwrap(), 0);
}

#[test]
fn test_fail_after_limit_stops_commits() {
    let transport = Arc::new(MockTransport::new().with_fail_after(2));
    let store = DeviceStore::new(Arc::clone(&transport), MemorySettings::new());

    store.move_to(1100).unwrap();
    store.move_to(1200).unwrap();
    assert!(store.move_to(1300).is_err());
    assert_eq!(store.position(), 1200);
}
