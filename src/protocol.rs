//! Mount Hub Pro command encoding.
//!
//! Every operation is a single 64-bit value written little-endian as an
//! 8-byte frame. The byte layout is fixed by the hub firmware:
//!
//! ```text
//! on/off switch    [code]                       code = 0x55 + (8 - slot) * 2 (+1 for on)
//! variable switch  [0x48 + 12 - slot] [level]   level 0-100
//! focuser move     [0x4E|0x4C] [speed] [hi] [lo]
//! ```
//!
//! All remaining bytes are zero.

use std::fmt;

use crate::error::{MhpError, Result};
use crate::slot::Slot;

/// Size of a command frame in bytes.
pub const FRAME_LEN: usize = 8;

/// Highest level accepted by a variable switch.
pub const MAX_LEVEL: i64 = 100;

/// Largest step delta expressible in one move frame.
pub const MAX_MOVE_DELTA: u32 = 0xFFFF;

const ON_OFF_BASE: u64 = 0x55;
const VARIABLE_BASE: u64 = 0x48;
const LAST_SWITCH: u64 = 12;
const LAST_ON_OFF: u64 = 8;

/// An encoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame(u64);

impl Frame {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Little-endian wire bytes.
    pub const fn to_bytes(self) -> [u8; FRAME_LEN] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

/// Focuser travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    /// Toward lower positions.
    Inward = 0x4E,
    /// Toward higher positions.
    Outward = 0x4C,
}

impl Direction {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Direction and step count to travel from `current` to `target`.
///
/// Returns `None` when no movement is needed.
pub fn plan_move(current: i32, target: i32) -> Option<(Direction, u32)> {
    if target == current {
        return None;
    }
    let direction = if target < current {
        Direction::Inward
    } else {
        Direction::Outward
    };
    Some((direction, current.abs_diff(target)))
}

/// Frame that turns an on/off switch (slot 1-8) on or off.
pub fn on_off(slot: Slot, on: bool) -> Result<Frame> {
    if !slot.is_on_off_switch() {
        return Err(MhpError::invalid_switch());
    }
    let mut code = ON_OFF_BASE + (LAST_ON_OFF - u64::from(slot.number())) * 2;
    if on {
        code += 1;
    }
    Ok(Frame(code))
}

/// Frame that sets a variable switch (slot 9-12) to `level` (0-100).
pub fn variable_level(slot: Slot, level: i64) -> Result<Frame> {
    if !slot.is_variable_switch() {
        return Err(MhpError::invalid_switch());
    }
    let level = u64::try_from(level)
        .ok()
        .filter(|l| *l <= MAX_LEVEL.unsigned_abs())
        .ok_or_else(MhpError::invalid_level)?;
    let low = VARIABLE_BASE + LAST_SWITCH - u64::from(slot.number());
    Ok(Frame(level * 0x100 + low))
}

/// Hub speed byte for a speed percentage.
///
/// 0% maps to 0xFA (250, slowest) and 100% to 0x23 (35, fastest); the
/// mapping is non-increasing and uses truncating division.
pub fn speed_byte(percent: u8) -> Result<u8> {
    if percent > 100 {
        return Err(MhpError::Validation(format!(
            "invalid focuser speed {percent}: must be 0-100"
        )));
    }
    let byte = (25_050 - u32::from(percent) * 215) / 100;
    u8::try_from(byte).map_err(|_| MhpError::Other(format!("speed byte {byte} out of range")))
}

/// Frame that moves the focuser `delta` steps in `direction`.
pub fn focuser_move(direction: Direction, delta: u32, speed_percent: u8) -> Result<Frame> {
    if delta == 0 {
        return Err(MhpError::NoOp("no movement requested".to_string()));
    }
    if delta > MAX_MOVE_DELTA {
        return Err(MhpError::Validation(format!(
            "focuser move of {delta} steps exceeds {MAX_MOVE_DELTA}"
        )));
    }

    let speed = u64::from(speed_byte(speed_percent)?);
    let part1 = speed * 0x100 + u64::from(direction.code());

    let delta = u64::from(delta);
    let hi = delta / 0x100;
    let lo = delta - hi * 0x100;

    Ok(Frame(lo * 0x0100_0000 + hi * 0x1_0000 + part1))
}
