//! Control descriptor table
//!
//! Every control of the emulated pad maps to exactly one typed driver
//! setter. The table is fixed data; lookups that miss fail fast with
//! [`ControllerError::UnknownControl`].

use std::fmt;
use std::str::FromStr;

use crate::controller::error::ControllerError;
use crate::driver::{BusDriver, DriverError, SlotId};
use crate::mapping::conversion::NativeValue;

/// Value category of a control, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Axis,
    Button,
    Trigger,
    Dpad,
}

impl ControlKind {
    /// Classifies a control name by pattern. The first matching category wins;
    /// control names are chosen so that at most one pattern matches.
    pub fn classify(name: &str) -> Option<Self> {
        if name.contains("Axis") {
            Some(ControlKind::Axis)
        } else if name.contains("Btn") {
            Some(ControlKind::Button)
        } else if name.contains("Trigger") {
            Some(ControlKind::Trigger)
        } else if name.contains("Dpad") {
            Some(ControlKind::Dpad)
        } else {
            None
        }
    }
}

type Setter<T> = fn(&dyn BusDriver, SlotId, T) -> Result<(), DriverError>;

/// Reference to a typed driver setter, tagged by native value type
#[derive(Clone, Copy)]
pub enum SetterFn {
    Axis(Setter<i16>),
    Button(Setter<bool>),
    Trigger(Setter<u8>),
    Dpad(Setter<i32>),
}

impl SetterFn {
    pub fn kind(&self) -> ControlKind {
        match self {
            SetterFn::Axis(_) => ControlKind::Axis,
            SetterFn::Button(_) => ControlKind::Button,
            SetterFn::Trigger(_) => ControlKind::Trigger,
            SetterFn::Dpad(_) => ControlKind::Dpad,
        }
    }

    /// Invokes the setter with an already-converted value.
    ///
    /// A value of another category is rejected without calling the driver.
    pub fn call(
        &self,
        driver: &dyn BusDriver,
        id: SlotId,
        value: NativeValue,
    ) -> Result<(), ControllerError> {
        match (*self, value) {
            (SetterFn::Axis(set), NativeValue::Axis(v)) => set(driver, id, v)?,
            (SetterFn::Button(set), NativeValue::Button(v)) => set(driver, id, v)?,
            (SetterFn::Trigger(set), NativeValue::Trigger(v)) => set(driver, id, v)?,
            (SetterFn::Dpad(set), NativeValue::Dpad(v)) => set(driver, id, v)?,
            (setter, value) => {
                return Err(ControllerError::KindMismatch {
                    expected: setter.kind(),
                    value,
                })
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SetterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetterFn::{:?}", self.kind())
    }
}

/// Logical input element of the emulated pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    AxisLx,
    AxisLy,
    AxisRx,
    AxisRy,
    BtnBack,
    BtnStart,
    BtnA,
    BtnB,
    BtnX,
    BtnY,
    BtnThumbL,
    BtnThumbR,
    BtnShoulderL,
    BtnShoulderR,
    Dpad,
    TriggerL,
    TriggerR,
}

/// One row of the descriptor table
#[derive(Debug, Clone, Copy)]
pub struct ControlDescriptor {
    pub control: Control,
    pub name: &'static str,
    pub description: &'static str,
    pub setter: SetterFn,
}

macro_rules! descriptor {
    ($control:ident, $description:literal, $variant:ident, $method:ident) => {
        ControlDescriptor {
            control: Control::$control,
            name: stringify!($control),
            description: $description,
            setter: SetterFn::$variant(|driver, id, value| driver.$method(id, value)),
        }
    };
}

/// All controls of the pad, in driver export order.
pub static CONTROLS: [ControlDescriptor; 17] = [
    descriptor!(AxisLx, "Left stick X axis", Axis, set_axis_lx),
    descriptor!(AxisLy, "Left stick Y axis", Axis, set_axis_ly),
    descriptor!(AxisRx, "Right stick X axis", Axis, set_axis_rx),
    descriptor!(AxisRy, "Right stick Y axis", Axis, set_axis_ry),
    descriptor!(BtnBack, "Menu/Back button", Button, set_btn_back),
    descriptor!(BtnStart, "Start button", Button, set_btn_start),
    descriptor!(BtnA, "A button", Button, set_btn_a),
    descriptor!(BtnB, "B button", Button, set_btn_b),
    descriptor!(BtnX, "X button", Button, set_btn_x),
    descriptor!(BtnY, "Y button", Button, set_btn_y),
    descriptor!(BtnThumbL, "Left thumbstick click", Button, set_btn_thumb_l),
    descriptor!(BtnThumbR, "Right thumbstick click", Button, set_btn_thumb_r),
    descriptor!(BtnShoulderL, "Left shoulder button", Button, set_btn_shoulder_l),
    descriptor!(BtnShoulderR, "Right shoulder button", Button, set_btn_shoulder_r),
    descriptor!(Dpad, "Directional pad, 0 = centered", Dpad, set_dpad),
    descriptor!(TriggerL, "Left trigger", Trigger, set_trigger_l),
    descriptor!(TriggerR, "Right trigger", Trigger, set_trigger_r),
];

impl Control {
    /// Looks up a control by its exported name (e.g. `"AxisLx"`).
    pub fn from_name(name: &str) -> Option<Self> {
        ControlDescriptor::lookup(name).map(|descriptor| descriptor.control)
    }

    pub fn descriptor(self) -> &'static ControlDescriptor {
        // The table holds one row per variant, in declaration order.
        &CONTROLS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn kind(self) -> ControlKind {
        self.descriptor().setter.kind()
    }

    pub fn all() -> impl Iterator<Item = Control> {
        CONTROLS.iter().map(|descriptor| descriptor.control)
    }
}

impl ControlDescriptor {
    pub fn lookup(name: &str) -> Option<&'static ControlDescriptor> {
        CONTROLS.iter().find(|descriptor| descriptor.name == name)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Control::from_name(s).ok_or_else(|| ControllerError::UnknownControl(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::simulated::SimulatedBus;

    #[test]
    fn table_rows_follow_variant_order() {
        for (index, descriptor) in CONTROLS.iter().enumerate() {
            assert_eq!(descriptor.control as usize, index, "{}", descriptor.name);
            assert_eq!(descriptor.control.name(), descriptor.name);
        }
    }

    #[test]
    fn setter_tag_agrees_with_name_pattern() {
        for descriptor in CONTROLS.iter() {
            assert_eq!(
                ControlKind::classify(descriptor.name),
                Some(descriptor.setter.kind()),
                "{}",
                descriptor.name
            );
        }
    }

    #[test]
    fn name_patterns_are_exclusive() {
        let patterns = ["Axis", "Btn", "Trigger", "Dpad"];
        for descriptor in CONTROLS.iter() {
            let matches = patterns
                .iter()
                .filter(|pattern| descriptor.name.contains(*pattern))
                .count();
            assert_eq!(matches, 1, "{}", descriptor.name);
        }
    }

    #[test]
    fn names_resolve_and_unknown_names_fail() {
        assert_eq!("BtnShoulderR".parse::<Control>().unwrap(), Control::BtnShoulderR);
        assert_eq!(Control::from_name("TriggerL"), Some(Control::TriggerL));
        assert!(matches!(
            "Nonexistent".parse::<Control>(),
            Err(ControllerError::UnknownControl(name)) if name == "Nonexistent"
        ));
        // Lookups are exact and case-sensitive
        assert_eq!(Control::from_name("btna"), None);
    }

    #[test]
    fn setter_rejects_values_of_another_kind() {
        let bus = SimulatedBus::new();
        let id = SlotId::new(1).unwrap();
        bus.plug_in(id).unwrap();
        bus.clear_calls();

        let err = Control::TriggerL
            .descriptor()
            .setter
            .call(&bus, id, NativeValue::Axis(10))
            .unwrap_err();

        assert!(matches!(
            err,
            ControllerError::KindMismatch {
                expected: ControlKind::Trigger,
                value: NativeValue::Axis(10),
            }
        ));
        assert!(bus.calls().is_empty());
    }

    #[test]
    fn every_control_is_listed_once() {
        let controls: Vec<Control> = Control::all().collect();
        assert_eq!(controls.len(), 17);
        assert_eq!(controls.first(), Some(&Control::AxisLx));
        assert!(CONTROLS
            .iter()
            .all(|descriptor| !descriptor.description.is_empty()));
    }

    #[test]
    fn classify_rejects_unpatterned_names() {
        assert_eq!(ControlKind::classify("Guide"), None);
        assert_eq!(ControlKind::classify("AxisLx"), Some(ControlKind::Axis));
    }
}
