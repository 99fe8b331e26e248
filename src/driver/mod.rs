//! Virtual bus driver boundary
//!
//! The kernel-level virtual USB bus (vXbox / ScpVBus) is an external service.
//! Everything this crate needs from it is captured by [`BusDriver`]: slot
//! occupancy queries, attach/detach, and one typed setter per control.
//!
//! ```text
//! VirtualController ──► BusDriver ──► virtual bus ──► OS input subsystem
//!                      (this trait)   (native driver)
//! ```
//!
//! [`simulated::SimulatedBus`] is an in-memory implementation used by the
//! demo binary and the tests.

pub mod simulated;

use std::fmt;

use crate::controller::error::ControllerError;

/// One addressable position on the virtual bus.
///
/// Valid IDs are `1..=4`. The driver's "unassigned" sentinel `0` is never
/// stored in a `SlotId`; code that needs it uses `Option<SlotId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u8);

impl SlotId {
    /// Number of slots the bus exposes.
    pub const COUNT: usize = 4;

    /// All slot IDs in ascending order.
    pub const ALL: [SlotId; Self::COUNT] = [SlotId(1), SlotId(2), SlotId(3), SlotId(4)];

    pub fn new(raw: u8) -> Result<Self, ControllerError> {
        if (1..=Self::COUNT as u8).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(ControllerError::InvalidSlot(raw))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for SlotId {
    type Error = ControllerError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// Errors reported by the driver boundary
///
/// The core never retries these; they are surfaced to the caller as
/// [`ControllerError::Driver`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// The driver refused a call, e.g. the OS rejected a plug-in
    #[error("Driver rejected {call} on slot {slot}: {reason}")]
    Rejected {
        call: &'static str,
        slot: SlotId,
        reason: String,
    },

    /// The driver (or the bus it controls) could not be reached
    #[error("Driver unavailable: {0}")]
    Unavailable(String),
}

/// Logical contract of the virtual bus driver.
///
/// Signatures mirror the exported driver functions; values arrive already
/// converted into the driver's native numeric domain.
pub trait BusDriver: Send + Sync {
    /// Returns 0 when the slot is free and nonzero when it is occupied.
    ///
    /// This follows the driver's convention, which is inverted from the
    /// usual boolean reading of the function name.
    fn is_controller_exists(&self, id: SlotId) -> Result<i32, DriverError>;

    /// Attaches slot `id` to the virtual bus.
    fn plug_in(&self, id: SlotId) -> Result<(), DriverError>;

    /// Detaches slot `id` from the virtual bus.
    fn unplug(&self, id: SlotId) -> Result<(), DriverError>;

    /// Detaches slot `id` even when the OS still considers the device in use.
    fn unplug_force(&self, id: SlotId) -> Result<(), DriverError>;

    fn set_axis_lx(&self, id: SlotId, value: i16) -> Result<(), DriverError>;
    fn set_axis_ly(&self, id: SlotId, value: i16) -> Result<(), DriverError>;
    fn set_axis_rx(&self, id: SlotId, value: i16) -> Result<(), DriverError>;
    fn set_axis_ry(&self, id: SlotId, value: i16) -> Result<(), DriverError>;

    fn set_btn_back(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_start(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_a(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_b(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_x(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_y(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_thumb_l(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_thumb_r(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_shoulder_l(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;
    fn set_btn_shoulder_r(&self, id: SlotId, pressed: bool) -> Result<(), DriverError>;

    fn set_trigger_l(&self, id: SlotId, value: u8) -> Result<(), DriverError>;
    fn set_trigger_r(&self, id: SlotId, value: u8) -> Result<(), DriverError>;

    /// Sets the directional pad to a combination of direction bit flags.
    fn set_dpad(&self, id: SlotId, value: i32) -> Result<(), DriverError>;

    /// Convenience wrapper over [`BusDriver::is_controller_exists`].
    fn is_slot_free(&self, id: SlotId) -> Result<bool, DriverError> {
        Ok(self.is_controller_exists(id)? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ids_outside_the_bus_are_rejected() {
        assert!(matches!(
            SlotId::new(0),
            Err(ControllerError::InvalidSlot(0))
        ));
        assert!(matches!(
            SlotId::new(5),
            Err(ControllerError::InvalidSlot(5))
        ));
        assert_eq!(SlotId::new(4).unwrap().get(), 4);
    }

    #[test]
    fn all_slots_are_ascending() {
        let raw: Vec<u8> = SlotId::ALL.iter().map(|id| id.get()).collect();
        assert_eq!(raw, vec![1, 2, 3, 4]);
    }
}
