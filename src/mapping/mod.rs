//! Mapping of logical control names onto the driver's typed setters
//!
//! - [`control`] - static descriptor table (name → category + setter)
//! - [`conversion`] - normalized caller values → native driver values
//!
//! ```text
//! ("AxisLx", 0.5) ──► ControlDescriptor ──► InputValue::to_axis ──► SetAxisLx(slot, 16384)
//! ```

pub mod control;
pub mod conversion;

pub use control::{Control, ControlDescriptor, ControlKind, SetterFn, CONTROLS};
pub use conversion::{DpadDirection, InputValue, NativeValue};
