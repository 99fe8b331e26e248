//! Controller subsystem: slot lifecycle for virtual gamepads
//!
//! 1. [`slot_allocator`] - picks the lowest free slot from the driver's view of the bus
//! 2. [`controller_handle`] - owns a plugged-in slot, writes controls, unplugs on drop
//! 3. [`error`] - error kinds surfaced to callers
//!
//! # Architecture
//!
//! ```text
//! VirtualController ──► SlotAllocator ──► BusDriver::is_controller_exists (x4)
//!        │                    │
//!        │                    └──► BusDriver::plug_in
//!        ├──► set_control ──► ControlDescriptor ──► BusDriver::set_*
//!        └──► drop ──► BusDriver::unplug / unplug_force
//! ```

pub mod controller_handle;
pub mod error;
pub mod slot_allocator;

pub use controller_handle::VirtualController;
pub use error::ControllerError;
pub use slot_allocator::{allocate, allocate_and_plug, available_ids};
