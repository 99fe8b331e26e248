//! Conversion of normalized caller values into the driver's native domains

use crate::mapping::control::ControlKind;

/// Full-scale magnitude of a thumbstick axis.
pub const AXIS_SCALE: f64 = 32767.0;

/// Full-scale magnitude of an analog trigger.
pub const TRIGGER_SCALE: f64 = 255.0;

bitflags::bitflags! {
    /// Directional pad bit flags.
    ///
    /// Diagonals are expressed by combining two flags (`UP | RIGHT` is 9).
    /// Opposite directions may be combined; the value is passed to the
    /// driver uninterpreted.
    #[derive(Default)]
    pub struct DpadDirection: i32 {
        const OFF   = 0;
        const UP    = 1;
        const DOWN  = 2;
        const LEFT  = 4;
        const RIGHT = 8;
    }
}

/// Caller-supplied value for a control
///
/// Axes expect a float in `[-1.0, 1.0]`, triggers one in `[0.0, 1.0]`,
/// buttons anything boolean-like and the directional pad a combination of
/// [`DpadDirection`] flags. Values outside the expected range are not clamped.
///
/// `None` is accepted by every control: it reads as a released button and as
/// 0 for axes, triggers and the directional pad (centered / released / `OFF`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Value in the native type of a driver setter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeValue {
    Axis(i16),
    Button(bool),
    Trigger(u8),
    Dpad(i32),
}

impl InputValue {
    fn as_f64(self) -> f64 {
        match self {
            InputValue::None => 0.0,
            InputValue::Bool(b) => f64::from(u8::from(b)),
            InputValue::Int(i) => i as f64,
            InputValue::Float(f) => f,
        }
    }

    /// Truthiness: `None`, `false`, `0` and `0.0` are false, anything else is true.
    pub fn is_truthy(self) -> bool {
        match self {
            InputValue::None => false,
            InputValue::Bool(b) => b,
            InputValue::Int(i) => i != 0,
            InputValue::Float(f) => f != 0.0,
        }
    }

    /// `round(32767 * value)` as a 16-bit signed integer.
    ///
    /// Out-of-range input wraps the way a C `short` conversion does.
    pub fn to_axis(self) -> i16 {
        (AXIS_SCALE * self.as_f64()).round() as i64 as i16
    }

    /// `round(255 * value)` as an unsigned byte, wrapping on out-of-range input.
    pub fn to_trigger(self) -> u8 {
        (TRIGGER_SCALE * self.as_f64()).round() as i64 as u8
    }

    /// Integer cast; floats truncate toward zero.
    pub fn to_dpad(self) -> i32 {
        match self {
            InputValue::Int(i) => i as i32,
            other => other.as_f64() as i64 as i32,
        }
    }

    pub fn convert(self, kind: ControlKind) -> NativeValue {
        match kind {
            ControlKind::Axis => NativeValue::Axis(self.to_axis()),
            ControlKind::Button => NativeValue::Button(self.is_truthy()),
            ControlKind::Trigger => NativeValue::Trigger(self.to_trigger()),
            ControlKind::Dpad => NativeValue::Dpad(self.to_dpad()),
        }
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Float(value)
    }
}

impl From<f32> for InputValue {
    fn from(value: f32) -> Self {
        InputValue::Float(f64::from(value))
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Int(value)
    }
}

impl From<i32> for InputValue {
    fn from(value: i32) -> Self {
        InputValue::Int(i64::from(value))
    }
}

impl From<u8> for InputValue {
    fn from(value: u8) -> Self {
        InputValue::Int(i64::from(value))
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Bool(value)
    }
}

impl From<DpadDirection> for InputValue {
    fn from(value: DpadDirection) -> Self {
        InputValue::Int(i64::from(value.bits()))
    }
}

impl<T: Into<InputValue>> From<Option<T>> for InputValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(InputValue::None, Into::into)
    }
}
