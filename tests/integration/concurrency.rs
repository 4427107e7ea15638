//! Readers and writers sharing one store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use mhp::device::mock::MockTransport;
use mhp::protocol::Direction;
use mhp::settings::mock::MemorySettings;
use mhp::slot::Slot;

use crate::common::fixtures::MockHub;

/// A reader never sees a level whose frame has not been accepted.
#[test]
fn test_readers_never_observe_uncommitted_value() {
    let hub = Arc::new(MockHub::with_parts(
        MockTransport::new().with_delay(Duration::from_millis(30)),
        MemorySettings::new(),
    ));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let hub = Arc::clone(&hub);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut observations = 0usize;
                while !done.load(Ordering::SeqCst) {
                    let value = hub.store.value(8).unwrap();
                    if value != 0 {
                        assert!(
                            hub.transport.frame_count() >= 1,
                            "value {value} visible before its frame was sent"
                        );
                    }
                    observations += 1;
                }
                observations
            })
        })
        .collect();

    for level in [10, 20, 30, 40] {
        hub.store.set_value(8, level).unwrap();
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(hub.store.value(8).unwrap(), 40);
}

/// Position and the focuser slot change together.
#[test]
fn test_snapshots_are_never_torn() {
    let hub = Arc::new(MockHub::new());
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let hub = Arc::clone(&hub);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                let state = hub.store.snapshot();
                assert_eq!(
                    state.record(Slot::FOCUSER).value,
                    i64::from(state.focuser.position)
                );
            }
        })
    };

    for step in 1..=200 {
        hub.store.move_to(1000 + step * 7).unwrap();
    }
    done.store(true, Ordering::SeqCst);
    reader.join().unwrap();
}

/// Concurrent relative moves add up to the committed position.
#[test]
fn test_concurrent_moves_stay_consistent() {
    let hub = Arc::new(MockHub::new());
    let start = hub.store.position();

    let movers: Vec<_> = (0..8)
        .map(|worker| {
            let hub = Arc::clone(&hub);
            thread::spawn(move || {
                for i in 0..25 {
                    let _ = hub.store.move_to(500 + worker * 100 + i);
                }
            })
        })
        .collect();
    for mover in movers {
        mover.join().unwrap();
    }

    let mut position = i64::from(start);
    for frame in hub.transport.sent_frames() {
        let bytes = frame.to_bytes();
        let delta = i64::from(bytes[2]) * 0x100 + i64::from(bytes[3]);
        if bytes[0] == Direction::Inward.code() {
            position -= delta;
        } else {
            position += delta;
        }
    }
    assert_eq!(position, i64::from(hub.store.position()));
}

/// Saves land in commit order, so the stored document matches memory.
#[test]
fn test_concurrent_writers_persist_final_state() {
    let hub = Arc::new(MockHub::new());

    let writers: Vec<_> = (0..12)
        .map(|id| {
            let hub = Arc::clone(&hub);
            thread::spawn(move || {
                for round in 0..10 {
                    if id < 8 {
                        hub.store.set_on_off(id, round % 2 == 0).unwrap();
                    } else {
                        hub.store.set_value(id, i64::from(round * 10)).unwrap();
                    }
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(hub.transport.frame_count(), 120);
    assert_eq!(hub.settings.save_count(), 121);

    let stored = hub.settings.stored().unwrap();
    let state = hub.store.snapshot();
    for slot in Slot::all() {
        assert_eq!(stored.value[slot.index()], state.record(slot).value);
    }
    assert!(!hub.store.on_off(0).unwrap());
    assert_eq!(hub.store.value(11).unwrap(), 90);
}

/// Settings-only changes do not wait for a slow hardware send.
#[test]
fn test_settings_change_during_slow_send() {
    let hub = Arc::new(MockHub::with_parts(
        MockTransport::new().with_delay(Duration::from_millis(500)),
        MemorySettings::new(),
    ));

    let mover = {
        let hub = Arc::clone(&hub);
        thread::spawn(move || hub.store.move_to(2000))
    };
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    hub.store.set_connected(true).unwrap();
    hub.store.set_speed(70).unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(250),
        "settings change waited {:?}",
        started.elapsed()
    );
    assert!(hub.store.connected());
    assert_eq!(hub.store.position(), 1000);

    mover.join().unwrap().unwrap();
    assert_eq!(hub.store.position(), 2000);
    assert_eq!(hub.store.speed(), 70);

    let stored = hub.settings.stored().unwrap();
    assert!(stored.connected);
    assert_eq!(stored.focuser_position, 2000);
    assert_eq!(stored.focuser_speed, 70);
}
