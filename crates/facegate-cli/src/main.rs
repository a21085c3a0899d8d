//! Facegate entry point.
//!
//! Loads configuration from the environment, opens the serial link to
//! the vision coprocessor, assembles the controller, and runs until
//! interrupted.

mod config;
mod gpio;

use anyhow::Context;
use config::Config;
use facegate_controller::DoorController;
use facegate_motor::StepperMotor;
use facegate_remote::{NullSink, RemoteSink};
use facegate_serial::VisionLink;
use gpio::SimulatedEmitter;
use std::sync::Arc;
use std::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;

    info!("facegate v{}", facegate_core::VERSION);
    info!(
        port = %config.serial.port,
        baud = config.serial.baud_rate,
        "serial"
    );
    info!(
        threshold = config.controller.score_threshold,
        window = ?config.controller.face_window,
        "recognition"
    );

    let link = VisionLink::open(&config.serial).context("opening serial link")?;
    let motor = StepperMotor::new(SimulatedEmitter::new(), config.motor);

    // The remote channel transport is deployment-specific; without one,
    // reports are dropped and only local operation remains
    let sink: Arc<dyn RemoteSink> = Arc::new(NullSink);

    let controller = DoorController::start(link, motor, sink, config.controller)
        .context("starting controller")?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .context("installing signal handler")?;

    info!("running; press Ctrl-C to exit");
    let _ = shutdown_rx.recv();

    info!("shutdown signal received");
    controller.stop();

    Ok(())
}
