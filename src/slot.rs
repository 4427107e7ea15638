//! Typed slot identifiers.
//!
//! The hub exposes 13 logical devices. Slot 0 is the focuser, slots 1-8 are
//! on/off switches and slots 9-12 are variable (dew heater) switches.
//!
//! Callers address switches with a zero-based switch id (0-11). The switch id
//! to slot offset lives in [`Slot::from_switch_id`] and nowhere else.

use std::fmt;

use serde::Serialize;

use crate::error::{MhpError, Result};

/// Number of slots, focuser included.
pub const SLOT_COUNT: usize = 13;

/// Number of switches visible to callers.
pub const SWITCH_COUNT: i32 = 12;

const FIRST_ON_OFF: u8 = 1;
const LAST_ON_OFF: u8 = 8;
const FIRST_VARIABLE: u8 = 9;
const LAST_VARIABLE: u8 = 12;

/// A validated slot index in `0..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slot(u8);

impl Slot {
    /// The focuser slot.
    pub const FOCUSER: Self = Self(0);

    /// Create a slot from its internal index.
    pub fn new(index: u8) -> Result<Self> {
        if usize::from(index) < SLOT_COUNT {
            Ok(Self(index))
        } else {
            Err(MhpError::Validation(format!("invalid slot {index}")))
        }
    }

    /// Convert a zero-based switch id into its slot.
    pub fn from_switch_id(id: i32) -> Result<Self> {
        if !(0..SWITCH_COUNT).contains(&id) {
            return Err(MhpError::invalid_switch());
        }
        let index = u8::try_from(id + 1).map_err(|_| MhpError::invalid_switch())?;
        Ok(Self(index))
    }

    /// Internal array index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw slot number as used by the command protocol.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based switch id, `None` for the focuser.
    pub const fn switch_id(self) -> Option<i32> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0 as i32 - 1)
        }
    }

    pub const fn is_focuser(self) -> bool {
        self.0 == 0
    }

    pub const fn is_on_off_switch(self) -> bool {
        self.0 >= FIRST_ON_OFF && self.0 <= LAST_ON_OFF
    }

    pub const fn is_variable_switch(self) -> bool {
        self.0 >= FIRST_VARIABLE && self.0 <= LAST_VARIABLE
    }

    /// All slots in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=LAST_VARIABLE).map(Self)
    }

    /// All switch slots (1-12) in index order.
    pub fn switches() -> impl Iterator<Item = Self> {
        (FIRST_ON_OFF..=LAST_VARIABLE).map(Self)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.switch_id() {
            None => write!(f, "focuser"),
            Some(id) => write!(f, "switch {id}"),
        }
    }
}
