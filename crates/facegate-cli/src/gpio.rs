//! Pulse emitter backends.
//!
//! The real pin driver is platform-specific and lives outside this
//! repository; the binary ships with a simulated emitter so the full
//! stack runs on a development machine. Deployments inject their GPIO
//! driver by implementing [`PulseEmitter`] for it.

use facegate_core::Result;
use facegate_motor::{Level, MotorPin, PulseEmitter};
use tracing::trace;

/// Emitter that drives no hardware; transitions are traced only.
#[derive(Debug, Default)]
pub struct SimulatedEmitter;

impl SimulatedEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl PulseEmitter for SimulatedEmitter {
    fn set(&mut self, pin: MotorPin, level: Level) -> Result<()> {
        trace!(?pin, ?level, "simulated pin transition");
        Ok(())
    }
}
