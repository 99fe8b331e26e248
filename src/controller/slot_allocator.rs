//! Slot allocation against the driver's view of the bus
//!
//! The driver is the source of truth for which slots are free; nothing is
//! cached here. Allocation picks the lowest free ID.
//!
//! # Races
//!
//! The driver offers no reservation primitive, so the allocate → plug-in
//! sequence is not atomic. [`allocate_and_plug`] serializes it within this
//! process. Two *processes* can still observe the same free slot before
//! either plugs in; the outcome of such a collision is driver-defined
//! (usually the second plug-in is rejected).

use std::sync::Mutex;

use tracing::{debug, error};

use super::error::ControllerError;
use crate::driver::{BusDriver, SlotId};

/// Serializes allocate + plug-in across every handle in the process.
static PLUG_IN_LOCK: Mutex<()> = Mutex::new(());

/// IDs the driver currently reports as free, ascending.
pub fn available_ids(driver: &dyn BusDriver) -> Result<Vec<SlotId>, ControllerError> {
    let mut ids = Vec::with_capacity(SlotId::COUNT);
    for id in SlotId::ALL {
        if driver.is_slot_free(id)? {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// The lowest free slot ID.
///
/// Must be followed immediately by a plug-in of the returned ID; prefer
/// [`allocate_and_plug`] which does both under a process-wide lock.
pub fn allocate(driver: &dyn BusDriver) -> Result<SlotId, ControllerError> {
    let ids = available_ids(driver)?;
    debug!("Available slots: {:?}", ids);
    ids.first().copied().ok_or(ControllerError::SlotsExhausted)
}

/// Allocates the lowest free slot and plugs it in.
pub fn allocate_and_plug(driver: &dyn BusDriver) -> Result<SlotId, ControllerError> {
    // A poisoned lock only means another plug-in panicked; the guard protects no data.
    let _guard = PLUG_IN_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let id = allocate(driver)?;
    debug!("Allocated slot {}", id);

    if let Err(e) = driver.plug_in(id) {
        error!("Failed to plug in slot {}: {}", id, e);
        return Err(e.into());
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::simulated::{DriverCall, SimulatedBus};

    fn slot(raw: u8) -> SlotId {
        SlotId::new(raw).unwrap()
    }

    #[test]
    fn empty_bus_offers_every_slot() {
        let bus = SimulatedBus::new();
        assert_eq!(available_ids(&bus).unwrap(), SlotId::ALL.to_vec());
        assert_eq!(allocate(&bus).unwrap(), slot(1));
    }

    #[test]
    fn allocation_skips_occupied_slots() {
        let bus = SimulatedBus::new();
        bus.occupy(slot(1)).unwrap();
        bus.occupy(slot(3)).unwrap();

        assert_eq!(available_ids(&bus).unwrap(), vec![slot(2), slot(4)]);
        assert_eq!(allocate(&bus).unwrap(), slot(2));
    }

    #[test]
    fn allocation_does_not_plug_in() {
        let bus = SimulatedBus::new();
        allocate(&bus).unwrap();
        assert!(bus.mutating_calls().is_empty());
        assert_eq!(bus.occupancy(), [false; 4]);
    }

    #[test]
    fn full_bus_is_exhausted() {
        let bus = SimulatedBus::new();
        for id in SlotId::ALL {
            bus.occupy(id).unwrap();
        }
        assert!(available_ids(&bus).unwrap().is_empty());
        assert!(matches!(
            allocate(&bus),
            Err(ControllerError::SlotsExhausted)
        ));
        assert!(matches!(
            allocate_and_plug(&bus),
            Err(ControllerError::SlotsExhausted)
        ));
    }

    #[test]
    fn allocate_and_plug_attaches_the_lowest_slot() {
        let bus = SimulatedBus::new();
        bus.occupy(slot(1)).unwrap();

        assert_eq!(allocate_and_plug(&bus).unwrap(), slot(2));
        assert_eq!(bus.mutating_calls(), vec![DriverCall::PlugIn(slot(2))]);
    }

    #[test]
    fn rejected_plug_in_is_surfaced() {
        let bus = SimulatedBus::new();
        bus.fail_next_plug_in("access denied").unwrap();

        let err = allocate_and_plug(&bus).unwrap_err();
        assert!(matches!(err, ControllerError::Driver(_)));
        assert_eq!(bus.occupancy(), [false; 4]);
    }
}
