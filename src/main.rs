use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vxcontroller::driver::simulated::SimulatedBus;
use vxcontroller::{
    BusDriver, Control, ControllerError, ControllerSettings, DpadDirection, SlotId,
    VirtualController,
};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let settings = ControllerSettings::load().unwrap_or_else(|e| {
        warn!("Falling back to default settings: {}", e);
        ControllerSettings::default()
    });
    info!("Controller settings: {:?}", settings);

    for control in Control::all() {
        let descriptor = control.descriptor();
        info!("{:<14} {:?}: {}", descriptor.name, control.kind(), descriptor.description);
    }

    let bus = Arc::new(SimulatedBus::new());
    let mut controllers = Vec::new();

    // Controller verbinden, bis alle Slots belegt sind
    loop {
        info!("Connecting controller");
        match VirtualController::connect_async(bus.clone(), settings.clone()).await {
            Ok(controller) => {
                info!(
                    "This ID: {} (settled for {:?})",
                    controller.id(),
                    controller.settings().settle_delay()
                );
                controllers.push(controller);
            }
            Err(ControllerError::SlotsExhausted) => {
                info!("All slots in use");
                break;
            }
            Err(e) => return Err(eyre!("Failed to connect controller: {}", e)),
        }
    }

    for controller in &controllers {
        exercise(controller)?;
    }

    info!("Done, disconnecting {} controllers", controllers.len());
    drop(controllers);

    let mut available = Vec::with_capacity(SlotId::COUNT);
    for id in SlotId::ALL {
        available.push(bus.is_controller_exists(id)?);
    }
    info!("Available: {:?}", available);

    Ok(())
}

/// Sweeps the left stick, taps A and rolls the directional pad around.
fn exercise(controller: &VirtualController) -> Result<()> {
    for step in -4..=4 {
        controller.set(Control::AxisLx, f64::from(step) / 4.0)?;
    }
    controller.set(Control::AxisLx, 0.0)?;

    controller.set_control("BtnA", true)?;
    controller.set_control("BtnA", false)?;
    controller.set_control("TriggerR", 0.75)?;

    for direction in [
        DpadDirection::UP,
        DpadDirection::UP | DpadDirection::RIGHT,
        DpadDirection::RIGHT,
        DpadDirection::DOWN,
        DpadDirection::LEFT,
        DpadDirection::OFF,
    ] {
        controller.set(Control::Dpad, direction)?;
    }

    info!("Exercised controller on slot {}", controller.id());
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
