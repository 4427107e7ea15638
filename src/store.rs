//! Device state store.
//!
//! [`DeviceStore`] owns the canonical [`DeviceState`], the transport to the
//! hub and the settings backend. Every mutation follows the same order:
//!
//! 1. validate the request against the committed state
//! 2. encode and send the frame (skipped for settings-only changes)
//! 3. commit to memory only if the send succeeded
//! 4. persist the whole snapshot
//!
//! Hardware mutations hold the send lock from validation through persist, so
//! frames reach the hub in commit order and focuser deltas are computed from
//! the position they will be applied to. Steps 3 and 4 run under the commit
//! lock, which every mutation takes, so saves land in commit order. Settings
//! only changes take just the commit lock and never wait on the hub. Readers
//! only take the state lock and never observe a value whose send has not
//! succeeded.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::device::HidTransport;
use crate::error::{MhpError, Result};
use crate::protocol::{self, Frame};
use crate::settings::SettingsBackend;
use crate::slot::{SWITCH_COUNT, Slot};
use crate::state::{DeviceRecord, DeviceState};

/// Identity of a configured slot, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescription {
    pub name: String,
    pub device_type: String,
    pub number: u32,
    pub unique_id: String,
}

/// Thread-safe store for all hub state.
pub struct DeviceStore<T, S> {
    state: RwLock<DeviceState>,
    send_lock: Mutex<()>,
    commit_lock: Mutex<()>,
    transport: T,
    settings: S,
}

impl<T: HidTransport, S: SettingsBackend> DeviceStore<T, S> {
    /// Build a store from persisted settings.
    ///
    /// Missing or invalid settings are replaced by the built-in defaults,
    /// which are persisted immediately.
    pub fn new(transport: T, settings: S) -> Self {
        let loaded = settings
            .load()
            .and_then(|snapshot| match DeviceState::from_snapshot(&snapshot) {
                Ok(state) => Some(state),
                Err(err) => {
                    warn!(error = %err, "Stored settings rejected, using defaults");
                    None
                }
            });

        let state = match loaded {
            Some(state) => {
                info!(
                    position = state.focuser.position,
                    connected = state.focuser.connected,
                    "Device state restored"
                );
                state
            }
            None => {
                let defaults = DeviceState::defaults();
                if let Err(err) = settings.save(&defaults.to_snapshot()) {
                    error!(error = %err, "Failed to persist default settings");
                }
                defaults
            }
        };

        Self {
            state: RwLock::new(state),
            send_lock: Mutex::new(()),
            commit_lock: Mutex::new(()),
            transport,
            settings,
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn settings(&self) -> &S {
        &self.settings
    }

    // === Queries ===

    /// Copy of the committed state.
    pub fn snapshot(&self) -> DeviceState {
        self.state.read().clone()
    }

    fn read_switch<R>(&self, id: i32, f: impl FnOnce(&DeviceRecord) -> R) -> Result<R> {
        let slot = Slot::from_switch_id(id)?;
        Ok(f(self.state.read().record(slot)))
    }

    pub fn connected(&self) -> bool {
        self.state.read().focuser.connected
    }

    /// Display name: the custom name when one is set.
    pub fn name(&self, id: i32) -> Result<String> {
        self.read_switch(id, |r| r.display_name().to_string())
    }

    pub fn description(&self, id: i32) -> Result<String> {
        self.name(id)
    }

    pub fn device_type(&self, id: i32) -> Result<String> {
        self.read_switch(id, |r| r.device_type.clone())
    }

    pub fn unique_id(&self, id: i32) -> Result<String> {
        self.read_switch(id, |r| r.unique_id.clone())
    }

    pub fn can_write(&self, id: i32) -> Result<bool> {
        self.read_switch(id, |r| r.can_write)
    }

    /// State of a binary switch.
    pub fn on_off(&self, id: i32) -> Result<bool> {
        self.read_switch(id, |r| {
            if r.is_binary() {
                Ok(r.value != 0)
            } else {
                Err(MhpError::WrongKind(
                    "device is not just an on/off switch".to_string(),
                ))
            }
        })?
    }

    pub fn value(&self, id: i32) -> Result<i64> {
        self.read_switch(id, |r| r.value)
    }

    pub fn min(&self, id: i32) -> Result<i64> {
        self.read_switch(id, |r| r.min)
    }

    pub fn max(&self, id: i32) -> Result<i64> {
        self.read_switch(id, |r| r.max)
    }

    pub fn step(&self, id: i32) -> Result<i64> {
        self.read_switch(id, |r| r.step)
    }

    /// Number of switches addressable by id.
    pub const fn max_switch(&self) -> i32 {
        SWITCH_COUNT
    }

    pub fn position(&self) -> i32 {
        self.state.read().focuser.position
    }

    pub fn max_step(&self) -> i32 {
        self.state.read().focuser.max_step
    }

    pub fn max_increment(&self) -> i32 {
        self.state.read().focuser.max_increment
    }

    pub fn speed(&self) -> u8 {
        self.state.read().focuser.speed
    }

    /// The hub never reports motion, so moves are treated as instantaneous.
    pub const fn is_moving(&self) -> bool {
        false
    }

    /// Identity of every slot, focuser first.
    pub fn configured_devices(&self) -> Vec<DeviceDescription> {
        let state = self.state.read();
        state
            .slots
            .iter()
            .map(|r| DeviceDescription {
                name: r.name.clone(),
                device_type: r.device_type.clone(),
                number: r.number,
                unique_id: r.unique_id.clone(),
            })
            .collect()
    }

    // === Mutations ===

    #[instrument(skip(self))]
    pub fn set_on_off(&self, id: i32, on: bool) -> Result<()> {
        let slot = Slot::from_switch_id(id)?;
        let frame = protocol::on_off(slot, on)?;

        let _send = self.send_lock.lock();
        self.send_and_commit(frame, |state| {
            state.record_mut(slot).value = i64::from(on);
        })?;
        info!(%slot, on, "Switch set");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_value(&self, id: i32, value: i64) -> Result<()> {
        let slot = Slot::from_switch_id(id)?;
        let accepted = self.state.read().record(slot).accepts(value);
        if !accepted {
            return Err(MhpError::invalid_level());
        }
        if slot.is_on_off_switch() {
            return self.set_on_off(id, value == 1);
        }

        let frame = protocol::variable_level(slot, value)?;
        let _send = self.send_lock.lock();
        self.send_and_commit(frame, |state| {
            state.record_mut(slot).value = value;
        })?;
        info!(%slot, value, "Switch level set");
        Ok(())
    }

    /// Move the focuser to an absolute position.
    #[instrument(skip(self))]
    pub fn move_to(&self, position: i32) -> Result<()> {
        let _send = self.send_lock.lock();
        let (current, max_step, speed) = {
            let state = self.state.read();
            (state.focuser.position, state.focuser.max_step, state.focuser.speed)
        };
        if !(0..=max_step).contains(&position) {
            return Err(MhpError::invalid_position());
        }
        let Some((direction, delta)) = protocol::plan_move(current, position) else {
            return Err(MhpError::NoOp("no movement requested".to_string()));
        };

        let frame = protocol::focuser_move(direction, delta, speed)?;
        self.send_and_commit(frame, |state| state.set_position(position))?;
        info!(from = current, to = position, ?direction, "Focuser moved");
        Ok(())
    }

    /// Override the display name of a switch. The name is stored as given;
    /// an empty name clears it.
    #[instrument(skip(self))]
    pub fn set_custom_name(&self, id: i32, name: &str) -> Result<()> {
        let slot = Slot::from_switch_id(id)?;
        let custom = Some(name.to_string()).filter(|n| !n.is_empty());
        self.commit(|state| state.record_mut(slot).custom_name = custom)
    }

    #[instrument(skip(self))]
    pub fn set_connected(&self, connected: bool) -> Result<()> {
        self.commit(|state| state.focuser.connected = connected)
    }

    /// Speed used for subsequent moves, in percent.
    #[instrument(skip(self))]
    pub fn set_speed(&self, percent: u8) -> Result<()> {
        protocol::speed_byte(percent)?;
        self.commit(|state| state.focuser.speed = percent)
    }

    // === Internal Helpers ===

    /// Send `frame`, then commit and persist. Caller holds the send lock.
    fn send_and_commit(&self, frame: Frame, apply: impl FnOnce(&mut DeviceState)) -> Result<()> {
        debug!(%frame, "Sending frame");
        if let Err(err) = self.transport.send(frame) {
            warn!(error = %err, %frame, "Send failed, state unchanged");
            return Err(err);
        }
        self.commit(apply)
    }

    /// Commit to memory and persist.
    fn commit(&self, apply: impl FnOnce(&mut DeviceState)) -> Result<()> {
        let _commit = self.commit_lock.lock();
        let snapshot = {
            let mut state = self.state.write();
            apply(&mut state);
            state.to_snapshot()
        };
        self.settings.save(&snapshot).map_err(|err| {
            error!(error = %err, "Change applied but not persisted");
            match err {
                MhpError::Persistence(_) => err,
                other => MhpError::Persistence(other.to_string()),
            }
        })
    }
}
