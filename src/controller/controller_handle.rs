//! Controller Handle - one virtual gamepad bound to one bus slot
//!
//! Construction allocates the lowest free slot, plugs it in and waits for the
//! OS to enumerate the device. Dropping the handle unplugs the slot, so the ID
//! is free again as soon as the owner lets go of it.
//!
//! ```text
//! plug_in ──► allocate ──► PlugIn(id) ──► settle ──► set_control* ──► UnPlug(id)
//!                                                                   (drop / unplug)
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use tracing::{debug, info, warn};

use super::error::ControllerError;
use super::slot_allocator;
use crate::config::ControllerSettings;
use crate::driver::{BusDriver, SlotId};
use crate::mapping::{Control, ControlDescriptor, ControlKind, InputValue, NativeValue};

/// A plugged-in virtual controller
///
/// Holds its slot exclusively until released. Release happens at most once
/// per successful plug-in, no matter how many times (or from how many
/// threads) [`unplug`](Self::unplug) is called, and automatically on drop.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use vxcontroller::config::ControllerSettings;
/// use vxcontroller::controller::VirtualController;
/// use vxcontroller::driver::simulated::SimulatedBus;
/// use vxcontroller::mapping::DpadDirection;
///
/// # fn main() -> Result<(), vxcontroller::controller::ControllerError> {
/// let bus = Arc::new(SimulatedBus::new());
/// let settings = ControllerSettings { settle_delay_ms: 0, ..Default::default() };
///
/// let pad = VirtualController::with_settings(bus.clone(), settings)?;
/// pad.set_control("AxisLx", -0.5)?;
/// pad.set_control("BtnA", true)?;
/// pad.set_control("Dpad", DpadDirection::UP | DpadDirection::RIGHT)?;
///
/// drop(pad);
/// assert_eq!(bus.occupancy(), [false; 4]);
/// # Ok(())
/// # }
/// ```
pub struct VirtualController {
    driver: Arc<dyn BusDriver>,
    id: SlotId,
    plugged: Mutex<bool>,
    settings: ControllerSettings,
}

impl VirtualController {
    /// Plugs in a controller with the default settings (500 ms settle delay).
    pub fn plug_in(driver: Arc<dyn BusDriver>) -> Result<Self, ControllerError> {
        Self::with_settings(driver, ControllerSettings::default())
    }

    /// Takes the lowest free slot, plugs it in and blocks for the settle delay.
    ///
    /// # Errors
    ///
    /// * [`ControllerError::SlotsExhausted`] - all four slots are taken
    /// * [`ControllerError::Driver`] - the driver rejected a query or the plug-in
    ///
    /// No handle exists after an error, so nothing needs releasing.
    pub fn with_settings(
        driver: Arc<dyn BusDriver>,
        settings: ControllerSettings,
    ) -> Result<Self, ControllerError> {
        let id = slot_allocator::allocate_and_plug(driver.as_ref())?;
        info!("Virtual controller plugged in on slot {}", id);

        // Owning the slot from here on means an interrupted wait still unplugs.
        let controller = Self {
            driver,
            id,
            plugged: Mutex::new(true),
            settings,
        };

        let delay = controller.settings.settle_delay();
        if !delay.is_zero() {
            debug!("Waiting {:?} for slot {} to enumerate", delay, id);
            thread::sleep(delay);
        }
        Ok(controller)
    }

    /// [`with_settings`](Self::with_settings) on tokio's blocking pool.
    ///
    /// Keeps the settle delay off the async worker threads.
    pub async fn connect_async(
        driver: Arc<dyn BusDriver>,
        settings: ControllerSettings,
    ) -> Result<Self, ControllerError> {
        tokio::task::spawn_blocking(move || Self::with_settings(driver, settings))
            .await
            .map_err(|e| ControllerError::TaskFailed(e.to_string()))?
    }

    /// Slot this controller occupies (or occupied, once released).
    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn is_plugged(&self) -> bool {
        *self.plugged_guard()
    }

    fn plugged_guard(&self) -> MutexGuard<'_, bool> {
        // The flag is only written after a driver call returns, so it is valid even if poisoned.
        self.plugged
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Sets a control by its exported name, e.g. `"AxisLx"` or `"BtnStart"`.
    ///
    /// The value is converted into the control's native domain (see
    /// [`InputValue`]) and written to the driver immediately. Returns the
    /// value the driver received.
    ///
    /// # Errors
    ///
    /// * [`ControllerError::UnknownControl`] - `name` is not a control; the driver is not called
    /// * [`ControllerError::NotPlugged`] - the slot was already released
    /// * [`ControllerError::Driver`] - the setter failed
    pub fn set_control(
        &self,
        name: &str,
        value: impl Into<InputValue>,
    ) -> Result<NativeValue, ControllerError> {
        let descriptor = ControlDescriptor::lookup(name)
            .ok_or_else(|| ControllerError::UnknownControl(name.to_string()))?;
        self.write(descriptor, value.into())
    }

    /// Sets an already-resolved control.
    pub fn set(
        &self,
        control: Control,
        value: impl Into<InputValue>,
    ) -> Result<NativeValue, ControllerError> {
        self.write(control.descriptor(), value.into())
    }

    fn write(
        &self,
        descriptor: &ControlDescriptor,
        value: InputValue,
    ) -> Result<NativeValue, ControllerError> {
        if !self.is_plugged() {
            return Err(ControllerError::NotPlugged(self.id));
        }

        let kind = ControlKind::classify(descriptor.name)
            .ok_or_else(|| ControllerError::UnknownControl(descriptor.name.to_string()))?;
        let native = value.convert(kind);
        descriptor
            .setter
            .call(self.driver.as_ref(), self.id, native)?;
        debug!("Slot {} {} <- {:?}", self.id, descriptor.name, native);
        Ok(native)
    }

    /// Detaches the controller with `UnPlug`.
    ///
    /// Returns `Ok(true)` if this call released the slot and `Ok(false)` if it
    /// was already released.
    pub fn unplug(&self) -> Result<bool, ControllerError> {
        self.release(false)
    }

    /// Detaches the controller with `UnPlugForce`, even if the OS holds it open.
    pub fn unplug_force(&self) -> Result<bool, ControllerError> {
        self.release(true)
    }

    /// Releases the slot once. A failed driver call leaves the handle
    /// plugged so a forced unplug (or drop) can try again.
    ///
    /// Concurrent callers queue on the release lock for the duration of the
    /// driver call, so a caller only sees "already released" once the slot is
    /// actually detached.
    pub fn release(&self, force: bool) -> Result<bool, ControllerError> {
        let mut plugged = self.plugged_guard();
        if !*plugged {
            debug!("Slot {} already released", self.id);
            return Ok(false);
        }

        let result = if force {
            self.driver.unplug_force(self.id)
        } else {
            self.driver.unplug(self.id)
        };

        match result {
            Ok(()) => {
                *plugged = false;
                info!(
                    "Virtual controller on slot {} unplugged{}",
                    self.id,
                    if force { " (forced)" } else { "" }
                );
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for VirtualController {
    fn drop(&mut self) {
        if let Err(e) = self.release(self.settings.force_unplug_on_drop) {
            warn!("Failed to unplug slot {} on drop: {}", self.id, e);
        }
    }
}

impl fmt::Debug for VirtualController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualController")
            .field("id", &self.id)
            .field("plugged", &self.is_plugged())
            .field("settings", &self.settings)
            .finish()
    }
}
