//! In-memory virtual bus
//!
//! Models the four bus slots, the last report written to every plugged slot
//! and a log of every driver call. Slots can be occupied from "outside" to
//! stand in for controllers owned by other processes.

use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use super::{BusDriver, DriverError, SlotId};

/// Reported state of one emulated pad
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PadReport {
    pub axis_lx: i16,
    pub axis_ly: i16,
    pub axis_rx: i16,
    pub axis_ry: i16,
    pub btn_back: bool,
    pub btn_start: bool,
    pub btn_a: bool,
    pub btn_b: bool,
    pub btn_x: bool,
    pub btn_y: bool,
    pub btn_thumb_l: bool,
    pub btn_thumb_r: bool,
    pub btn_shoulder_l: bool,
    pub btn_shoulder_r: bool,
    pub trigger_l: u8,
    pub trigger_r: u8,
    pub dpad: i32,
}

/// A driver call as seen by the bus
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Exists(SlotId),
    PlugIn(SlotId),
    Unplug(SlotId),
    UnplugForce(SlotId),
    /// A setter call, by exported setter name (e.g. `SetAxisLx`)
    Set {
        setter: &'static str,
        slot: SlotId,
        value: i64,
    },
}

#[derive(Debug, Default)]
struct BusState {
    slots: [Option<PadReport>; SlotId::COUNT],
    calls: Vec<DriverCall>,
    plug_in_failure: Option<String>,
    unplug_failure: Option<String>,
    unplug_latency: Duration,
}

impl BusState {
    fn slot_mut(
        &mut self,
        call: &'static str,
        id: SlotId,
    ) -> Result<&mut PadReport, DriverError> {
        self.slots[index(id)]
            .as_mut()
            .ok_or_else(|| DriverError::Rejected {
                call,
                slot: id,
                reason: "slot is not plugged in".to_string(),
            })
    }
}

fn index(id: SlotId) -> usize {
    usize::from(id.get() - 1)
}

/// In-memory [`BusDriver`]
#[derive(Debug, Default)]
pub struct SimulatedBus {
    state: Mutex<BusState>,
}

macro_rules! simulated_setter {
    ($fn_name:ident, $setter:literal, $field:ident, $ty:ty) => {
        fn $fn_name(&self, id: SlotId, value: $ty) -> Result<(), DriverError> {
            let mut state = self.lock()?;
            state.calls.push(DriverCall::Set {
                setter: $setter,
                slot: id,
                value: i64::from(value),
            });
            state.slot_mut($setter, id)?.$field = value;
            trace!("{} slot {} = {:?}", $setter, id, value);
            Ok(())
        }
    };
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BusState>, DriverError> {
        self.state
            .lock()
            .map_err(|e| DriverError::Unavailable(format!("bus state poisoned: {}", e)))
    }

    /// Marks a slot as taken by some other owner without going through a handle.
    pub fn occupy(&self, id: SlotId) -> Result<(), DriverError> {
        let mut state = self.lock()?;
        state.slots[index(id)].get_or_insert_with(PadReport::default);
        debug!("Slot {} occupied externally", id);
        Ok(())
    }

    /// Makes the next `plug_in` call fail with the given reason.
    pub fn fail_next_plug_in(&self, reason: impl Into<String>) -> Result<(), DriverError> {
        self.lock()?.plug_in_failure = Some(reason.into());
        Ok(())
    }

    /// Makes the next plain `unplug` call fail with the given reason.
    pub fn fail_next_unplug(&self, reason: impl Into<String>) -> Result<(), DriverError> {
        self.lock()?.unplug_failure = Some(reason.into());
        Ok(())
    }

    /// Delays every plain `unplug` call, outside the bus lock.
    pub fn set_unplug_latency(&self, latency: Duration) -> Result<(), DriverError> {
        self.lock()?.unplug_latency = latency;
        Ok(())
    }

    /// Last report written to a slot, `None` if the slot is not plugged in.
    pub fn report(&self, id: SlotId) -> Option<PadReport> {
        self.lock().ok().and_then(|state| state.slots[index(id)])
    }

    /// Occupancy of every slot, as the driver would report it.
    pub fn occupancy(&self) -> [bool; SlotId::COUNT] {
        match self.lock() {
            Ok(state) => state.slots.map(|slot| slot.is_some()),
            Err(_) => [false; SlotId::COUNT],
        }
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.lock().map(|state| state.calls.clone()).unwrap_or_default()
    }

    /// Calls received so far excluding occupancy queries.
    pub fn mutating_calls(&self) -> Vec<DriverCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, DriverCall::Exists(_)))
            .collect()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut state) = self.lock() {
            state.calls.clear();
        }
    }
}

impl BusDriver for SimulatedBus {
    fn is_controller_exists(&self, id: SlotId) -> Result<i32, DriverError> {
        let mut state = self.lock()?;
        state.calls.push(DriverCall::Exists(id));
        Ok(i32::from(state.slots[index(id)].is_some()))
    }

    fn plug_in(&self, id: SlotId) -> Result<(), DriverError> {
        let mut state = self.lock()?;
        state.calls.push(DriverCall::PlugIn(id));

        if let Some(reason) = state.plug_in_failure.take() {
            return Err(DriverError::Rejected {
                call: "PlugIn",
                slot: id,
                reason,
            });
        }

        let slot = &mut state.slots[index(id)];
        if slot.is_some() {
            return Err(DriverError::Rejected {
                call: "PlugIn",
                slot: id,
                reason: "slot is already plugged in".to_string(),
            });
        }
        *slot = Some(PadReport::default());
        debug!("Simulated pad attached on slot {}", id);
        Ok(())
    }

    fn unplug(&self, id: SlotId) -> Result<(), DriverError> {
        let latency = self.lock()?.unplug_latency;
        if !latency.is_zero() {
            thread::sleep(latency);
        }

        let mut state = self.lock()?;
        state.calls.push(DriverCall::Unplug(id));
        if let Some(reason) = state.unplug_failure.take() {
            return Err(DriverError::Rejected {
                call: "UnPlug",
                slot: id,
                reason,
            });
        }
        state.slot_mut("UnPlug", id)?;
        state.slots[index(id)] = None;
        debug!("Simulated pad detached from slot {}", id);
        Ok(())
    }

    fn unplug_force(&self, id: SlotId) -> Result<(), DriverError> {
        let mut state = self.lock()?;
        state.calls.push(DriverCall::UnplugForce(id));
        // Forced detach succeeds whether or not the slot was attached.
        state.slots[index(id)] = None;
        debug!("Simulated pad force-detached from slot {}", id);
        Ok(())
    }

    simulated_setter!(set_axis_lx, "SetAxisLx", axis_lx, i16);
    simulated_setter!(set_axis_ly, "SetAxisLy", axis_ly, i16);
    simulated_setter!(set_axis_rx, "SetAxisRx", axis_rx, i16);
    simulated_setter!(set_axis_ry, "SetAxisRy", axis_ry, i16);

    simulated_setter!(set_btn_back, "SetBtnBack", btn_back, bool);
    simulated_setter!(set_btn_start, "SetBtnStart", btn_start, bool);
    simulated_setter!(set_btn_a, "SetBtnA", btn_a, bool);
    simulated_setter!(set_btn_b, "SetBtnB", btn_b, bool);
    simulated_setter!(set_btn_x, "SetBtnX", btn_x, bool);
    simulated_setter!(set_btn_y, "SetBtnY", btn_y, bool);
    simulated_setter!(set_btn_thumb_l, "SetBtnThumbL", btn_thumb_l, bool);
    simulated_setter!(set_btn_thumb_r, "SetBtnThumbR", btn_thumb_r, bool);
    simulated_setter!(set_btn_shoulder_l, "SetBtnShoulderL", btn_shoulder_l, bool);
    simulated_setter!(set_btn_shoulder_r, "SetBtnShoulderR", btn_shoulder_r, bool);

    simulated_setter!(set_trigger_l, "SetTriggerL", trigger_l, u8);
    simulated_setter!(set_trigger_r, "SetTriggerR", trigger_r, u8);

    simulated_setter!(set_dpad, "SetDpad", dpad, i32);
}
