//! Device state model.
//!
//! [`DeviceState`] is the canonical in-memory form: one [`DeviceRecord`] per
//! slot plus the [`FocuserRecord`]. [`Snapshot`] is the persisted form, a
//! single document of parallel per-slot arrays that is rewritten whole on
//! every save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MhpError, Result};
use crate::slot::{SLOT_COUNT, Slot};

const DEFAULT_NAMES: [&str; SLOT_COUNT] = [
    "Focuser",
    "Switch 1",
    "Switch 2",
    "Switch 3",
    "Switch 4",
    "Switch 5",
    "Switch 6",
    "Switch 7",
    "Switch 8",
    "Dew Heater 1",
    "Dew Heater 2",
    "Dew Heater 3",
    "Dew Heater 4",
];

const DEFAULT_UNIQUE_IDS: [&str; SLOT_COUNT] = [
    "6fd5bae2-40ed-489f-b6f3-a562822e48e9",
    "86c4b6ea-650d-45cd-ad5d-1771c86edee6",
    "b96a0f0d-3b3f-4240-a7dc-807645a91a9a",
    "5cf95480-14ed-49c6-b992-a5eb8c4c9fb2",
    "9e2090fa-a793-4d4e-9302-3d97ba5566d2",
    "16eef02f-e1f0-4b94-8a66-a45ca005246f",
    "8d5641ce-34d4-4750-a0d7-210603a4ea33",
    "177ed90e-f8f4-46c3-8bd3-b00e4c7dedb5",
    "c0babc9b-4403-4b8f-9d5a-f53a848f7aa2",
    "96730903-e921-4a0d-8f45-f76597cf6259",
    "0c466cbc-a363-40fb-825c-07e33f0c696f",
    "41ce27ac-de5c-472a-a2a2-c37e3490c627",
    "5e95431e-6a38-4cd3-8cc0-65dfdb087e82",
];

pub const DEFAULT_MAX_INCREMENT: i32 = 150;
pub const DEFAULT_MAX_STEP: i32 = 65_535;
pub const DEFAULT_POSITION: i32 = 1000;
pub const DEFAULT_SPEED: u8 = 50;

/// State of a single slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// Built-in display name.
    pub name: String,
    /// User override for the display name.
    pub custom_name: Option<String>,
    /// Device type tag ("Focuser" or "Switch").
    pub device_type: String,
    /// Stable unique identifier.
    pub unique_id: String,
    /// Device number reported to clients.
    pub number: u32,
    /// Numeric id, equal to the slot index for built-in defaults.
    pub id: u32,
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub can_write: bool,
    /// Current value, always within `min..=max`.
    pub value: i64,
}

impl DeviceRecord {
    /// Name shown to clients: the custom name when set.
    pub fn display_name(&self) -> &str {
        self.custom_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }

    /// True for binary switches (max bound <= 1).
    pub const fn is_binary(&self) -> bool {
        self.max <= 1
    }

    pub fn accepts(&self, value: i64) -> bool {
        value >= 0 && (self.min..=self.max).contains(&value)
    }
}

/// Focuser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FocuserRecord {
    pub connected: bool,
    /// Maximum steps per move.
    pub max_increment: i32,
    /// Highest reachable position.
    pub max_step: i32,
    /// Current position, always within `0..=max_step`.
    pub position: i32,
    /// Configured speed percentage, 0-100.
    pub speed: u8,
}

impl FocuserRecord {
    pub fn accepts(&self, position: i32) -> bool {
        (0..=self.max_step).contains(&position)
    }
}

impl Default for FocuserRecord {
    fn default() -> Self {
        Self {
            connected: false,
            max_increment: DEFAULT_MAX_INCREMENT,
            max_step: DEFAULT_MAX_STEP,
            position: DEFAULT_POSITION,
            speed: DEFAULT_SPEED,
        }
    }
}

/// Canonical state for all slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    pub focuser: FocuserRecord,
    pub slots: [DeviceRecord; SLOT_COUNT],
}

impl DeviceState {
    /// Built-in defaults for a freshly installed hub.
    pub fn defaults() -> Self {
        let focuser = FocuserRecord::default();
        let slots = std::array::from_fn(|index| {
            let is_focuser = index == 0;
            let is_variable = index > 8;
            DeviceRecord {
                name: DEFAULT_NAMES[index].to_string(),
                custom_name: None,
                device_type: if is_focuser { "Focuser" } else { "Switch" }.to_string(),
                unique_id: DEFAULT_UNIQUE_IDS[index].to_string(),
                number: 1,
                id: u32::try_from(index).unwrap_or_default(),
                min: 0,
                max: if is_focuser {
                    i64::from(DEFAULT_MAX_STEP)
                } else if is_variable {
                    100
                } else {
                    1
                },
                step: if is_focuser {
                    i64::from(DEFAULT_MAX_INCREMENT)
                } else {
                    1
                },
                can_write: true,
                value: if is_focuser {
                    i64::from(DEFAULT_POSITION)
                } else {
                    0
                },
            }
        });
        Self { focuser, slots }
    }

    pub fn record(&self, slot: Slot) -> &DeviceRecord {
        &self.slots[slot.index()]
    }

    pub fn record_mut(&mut self, slot: Slot) -> &mut DeviceRecord {
        &mut self.slots[slot.index()]
    }

    /// Record a committed focuser position. The focuser slot mirrors it.
    pub fn set_position(&mut self, position: i32) {
        self.focuser.position = position;
        self.record_mut(Slot::FOCUSER).value = i64::from(position);
    }

    /// Check every invariant of the model.
    pub fn validate(&self) -> Result<()> {
        let focuser = &self.focuser;
        if focuser.max_step < 0 || !focuser.accepts(focuser.position) {
            return Err(MhpError::Validation(format!(
                "focuser position {} outside 0..={}",
                focuser.position, focuser.max_step
            )));
        }
        if focuser.speed > 100 {
            return Err(MhpError::Validation(format!(
                "focuser speed {} outside 0..=100",
                focuser.speed
            )));
        }
        for slot in Slot::all() {
            let record = self.record(slot);
            if record.min > record.max || !(record.min..=record.max).contains(&record.value) {
                return Err(MhpError::Validation(format!(
                    "{slot} value {} outside {}..={}",
                    record.value, record.min, record.max
                )));
            }
        }
        for slot in Slot::switches() {
            let record = self.record(slot);
            let expected_binary = slot.is_on_off_switch();
            if record.is_binary() != expected_binary {
                return Err(MhpError::Validation(format!(
                    "{slot} has max {} which does not match its kind",
                    record.max
                )));
            }
        }
        Ok(())
    }

    /// Persisted form of this state.
    pub fn to_snapshot(&self) -> Snapshot {
        let field = |f: fn(&DeviceRecord) -> String| -> [String; SLOT_COUNT] {
            std::array::from_fn(|i| f(&self.slots[i]))
        };
        Snapshot {
            saved_at: Some(Utc::now()),
            connected: self.focuser.connected,
            focuser_max_increment: self.focuser.max_increment,
            focuser_max_step: self.focuser.max_step,
            focuser_position: self.focuser.position,
            focuser_speed: i32::from(self.focuser.speed),
            name: field(|r| r.name.clone()),
            device_type: field(|r| r.device_type.clone()),
            number: std::array::from_fn(|i| self.slots[i].number),
            unique_id: field(|r| r.unique_id.clone()),
            id: std::array::from_fn(|i| self.slots[i].id),
            custom_name: field(|r| r.custom_name.clone().unwrap_or_default()),
            min: std::array::from_fn(|i| self.slots[i].min),
            max: std::array::from_fn(|i| self.slots[i].max),
            step: std::array::from_fn(|i| self.slots[i].step),
            can_write: std::array::from_fn(|i| self.slots[i].can_write),
            value: std::array::from_fn(|i| self.slots[i].value),
        }
    }

    /// Rebuild state from a persisted snapshot, rejecting invalid content.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let speed = u8::try_from(snapshot.focuser_speed)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| {
                MhpError::Validation(format!(
                    "focuser speed {} outside 0..=100",
                    snapshot.focuser_speed
                ))
            })?;

        let focuser = FocuserRecord {
            connected: snapshot.connected,
            max_increment: snapshot.focuser_max_increment,
            max_step: snapshot.focuser_max_step,
            position: snapshot.focuser_position,
            speed,
        };

        let slots = std::array::from_fn(|i| DeviceRecord {
            name: snapshot.name[i].clone(),
            custom_name: Some(snapshot.custom_name[i].clone()).filter(|n| !n.is_empty()),
            device_type: snapshot.device_type[i].clone(),
            unique_id: snapshot.unique_id[i].clone(),
            number: snapshot.number[i],
            id: snapshot.id[i],
            min: snapshot.min[i],
            max: snapshot.max[i],
            step: snapshot.step[i],
            can_write: snapshot.can_write[i],
            value: snapshot.value[i],
        });

        let mut state = Self { focuser, slots };
        let mirrored = state.record(Slot::FOCUSER).value;
        if mirrored != i64::from(state.focuser.position) {
            warn!(
                position = state.focuser.position,
                mirrored, "Focuser slot value out of sync, using focuser position"
            );
            state.set_position(state.focuser.position);
        }
        state.validate()?;
        debug!(position = state.focuser.position, "State rebuilt from snapshot");
        Ok(state)
    }
}

/// Persisted settings document.
///
/// Per-slot fields are parallel arrays indexed by slot. Older driver versions
/// wrote the focuser fields under misspelled keys, which are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    pub connected: bool,
    #[serde(alias = "focucermaxincrement")]
    pub focuser_max_increment: i32,
    #[serde(alias = "focucermaxstep")]
    pub focuser_max_step: i32,
    #[serde(alias = "focucerposition")]
    pub focuser_position: i32,
    #[serde(alias = "focucerspeed")]
    pub focuser_speed: i32,
    pub name: [String; SLOT_COUNT],
    #[serde(alias = "devicetype")]
    pub device_type: [String; SLOT_COUNT],
    pub number: [u32; SLOT_COUNT],
    #[serde(alias = "uniqueid")]
    pub unique_id: [String; SLOT_COUNT],
    pub id: [u32; SLOT_COUNT],
    #[serde(alias = "customname")]
    pub custom_name: [String; SLOT_COUNT],
    pub min: [i64; SLOT_COUNT],
    pub max: [i64; SLOT_COUNT],
    pub step: [i64; SLOT_COUNT],
    #[serde(alias = "canwrite")]
    pub can_write: [bool; SLOT_COUNT],
    pub value: [i64; SLOT_COUNT],
}
