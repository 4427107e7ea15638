//! Settings files across store restarts.

use mhp::settings::{JsonFileSettings, SettingsBackend};
use mhp::slot::Slot;
use mhp::state::{DeviceState, Snapshot};

use crate::common::fixtures::SettingsDir;
use crate::common::init_test_logging;

#[test]
fn test_missing_file_starts_from_defaults_and_persists_them() {
    init_test_logging();
    let dir = SettingsDir::new();
    assert!(!dir.path().exists());

    let (store, transport) = dir.open();
    assert_eq!(store.snapshot(), DeviceState::defaults());
    transport.assert_no_frames();

    let json = dir.read_json();
    assert_eq!(json["focuser_position"], 1000);
    assert_eq!(json["name"][12], "Dew Heater 4");
    assert_eq!(json["max"][0], 65_535);
    assert_eq!(json["step"][0], 150);
    assert_eq!(json["unique_id"][0], "6fd5bae2-40ed-489f-b6f3-a562822e48e9");
}

#[test]
fn test_corrupt_file_is_replaced_by_defaults() {
    let dir = SettingsDir::new();
    dir.write("{\"connected\": tru");

    let (store, _) = dir.open();
    assert_eq!(store.snapshot(), DeviceState::defaults());

    let reloaded = JsonFileSettings::new(dir.path()).load().unwrap();
    assert_eq!(DeviceState::from_snapshot(&reloaded).unwrap(), DeviceState::defaults());
}

#[test]
fn test_invalid_values_are_replaced_by_defaults() {
    let dir = SettingsDir::new();
    let mut snapshot = DeviceState::defaults().to_snapshot();
    snapshot.value[11] = 250;
    dir.write(&serde_json::to_string(&snapshot).unwrap());

    let (store, _) = dir.open();
    assert_eq!(store.value(10).unwrap(), 0);
    assert_eq!(dir.read_json()["value"][11], 0);
}

#[test]
fn test_state_survives_restart() {
    let dir = SettingsDir::new();
    {
        let (store, _) = dir.open();
        store.set_on_off(4, true).unwrap();
        store.set_value(9, 65).unwrap();
        store.move_to(2500).unwrap();
        store.set_speed(20).unwrap();
        store.set_custom_name(0, "Mount").unwrap();
        store.set_connected(true).unwrap();
    }

    let (store, transport) = dir.open();
    assert!(store.on_off(4).unwrap());
    assert_eq!(store.value(9).unwrap(), 65);
    assert_eq!(store.position(), 2500);
    assert_eq!(store.speed(), 20);
    assert_eq!(store.name(0).unwrap(), "Mount");
    assert!(store.connected());
    transport.assert_no_frames();
}

#[test]
fn test_save_then_load_is_identical() {
    let dir = SettingsDir::new();
    let settings = JsonFileSettings::new(dir.path());

    let mut state = DeviceState::defaults();
    state.record_mut(Slot::new(5).unwrap()).value = 1;
    state.record_mut(Slot::new(11).unwrap()).value = 12;
    state.record_mut(Slot::new(2).unwrap()).custom_name = Some("Flats".to_string());
    let snapshot = state.to_snapshot();

    settings.save(&snapshot).unwrap();
    assert_eq!(settings.load().unwrap(), snapshot);
}

/// Files written by older driver versions use misspelled focuser keys.
#[test]
fn test_legacy_document_is_accepted() {
    let dir = SettingsDir::new();
    let legacy = serde_json::json!({
        "connected": false,
        "focucermaxincrement": 150,
        "focucermaxstep": 65535,
        "focucerposition": 3210,
        "focucerspeed": 75,
        "name": ["Focuser", "Switch 1", "Switch 2", "Switch 3", "Switch 4", "Switch 5",
                 "Switch 6", "Switch 7", "Switch 8", "Dew Heater 1", "Dew Heater 2",
                 "Dew Heater 3", "Dew Heater 4"],
        "devicetype": ["Focuser", "Switch", "Switch", "Switch", "Switch", "Switch", "Switch",
                       "Switch", "Switch", "Switch", "Switch", "Switch", "Switch"],
        "number": [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        "uniqueid": ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m"],
        "id": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        "customname": ["", "", "Camera", "", "", "", "", "", "", "", "", "", ""],
        "min": [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        "max": [65535, 1, 1, 1, 1, 1, 1, 1, 1, 100, 100, 100, 100],
        "step": [150, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        "canwrite": [true, true, true, true, true, true, true, true, true, true, true, true, true],
        "value": [3210, 0, 1, 0, 0, 0, 0, 0, 0, 30, 0, 0, 0]
    });
    dir.write(&legacy.to_string());

    let (store, _) = dir.open();
    assert_eq!(store.position(), 3210);
    assert_eq!(store.speed(), 75);
    assert_eq!(store.name(1).unwrap(), "Camera");
    assert!(store.on_off(1).unwrap());
    assert_eq!(store.value(8).unwrap(), 30);
    assert_eq!(store.unique_id(0).unwrap(), "b");

    // The next save rewrites the document with current key names.
    store.set_connected(true).unwrap();
    let json = dir.read_json();
    assert_eq!(json["focuser_position"], 3210);
    assert!(json.get("focucerposition").is_none());
    let snapshot: Snapshot = serde_json::from_value(json).unwrap();
    assert!(snapshot.connected);
}

#[test]
fn test_every_save_rewrites_whole_document() {
    let dir = SettingsDir::new();
    let (store, _) = dir.open();

    store.set_value(11, 80).unwrap();
    let json = dir.read_json();
    for key in ["name", "custom_name", "device_type", "number", "unique_id", "id", "min", "max", "step", "can_write", "value"] {
        assert_eq!(json[key].as_array().map(Vec::len), Some(13), "{key}");
    }
    assert_eq!(json["value"][12], 80);
    assert!(json["saved_at"].is_string());
}
