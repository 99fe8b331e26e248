//! Error definitions for the controller slot lifecycle

use thiserror::Error;

use crate::driver::{DriverError, SlotId};
use crate::mapping::{ControlKind, NativeValue};

/// Errors that can occur while allocating, driving or releasing a virtual controller
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Every slot on the bus is occupied
    ///
    /// Not retryable until a slot is released elsewhere.
    #[error("All {} virtual controller slots are in use", SlotId::COUNT)]
    SlotsExhausted,

    /// The control name is not part of the descriptor table
    ///
    /// Indicates a programming error at the call site.
    #[error("Unknown control: {0}")]
    UnknownControl(String),

    /// A converted value does not fit the setter it was routed to
    #[error("Expected a {expected:?} value, got {value:?}")]
    KindMismatch {
        expected: ControlKind,
        value: NativeValue,
    },

    /// The handle already released its slot
    #[error("Controller on slot {0} is no longer plugged in")]
    NotPlugged(SlotId),

    /// A raw slot ID outside the bus range
    #[error("Invalid slot id {0}, expected 1..=4")]
    InvalidSlot(u8),

    /// Failure reported by the bus driver, propagated unchanged
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// The blocking plug-in task could not be joined
    #[error("Plug-in task failed: {0}")]
    TaskFailed(String),

    /// Settings file could not be read or written
    #[error("Settings error: {0}")]
    Settings(String),
}
