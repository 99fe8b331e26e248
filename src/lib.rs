//! Virtual gamepad slots on a vXbox-style virtual USB bus
//!
//! Up to four virtual Xbox 360 controllers can be attached to the bus at
//! once. A [`VirtualController`] claims the lowest free slot when created,
//! forwards control values to the driver in its native numeric domain and
//! gives the slot back when dropped.

pub mod config;
pub mod controller;
pub mod driver;
pub mod mapping;

pub use config::ControllerSettings;
pub use controller::{ControllerError, VirtualController};
pub use driver::{BusDriver, DriverError, SlotId};
pub use mapping::{Control, ControlKind, DpadDirection, InputValue, NativeValue};
