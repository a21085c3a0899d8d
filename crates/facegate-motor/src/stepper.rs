//! Stepper motor driver.

use crate::{
    emitter::{Level, MotorPin, PulseEmitter},
    profile::MotorProfile,
};
use facegate_core::{Error, Result};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Settle time between setting the direction pin and the first pulse.
const DIRECTION_SETTLE: Duration = Duration::from_millis(1);

/// Rotation direction of the door actuator.
///
/// The driver board samples the direction pin: high opens (clockwise),
/// low closes (counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    /// Clockwise; opens the door.
    Open,
    /// Counter-clockwise; closes the door.
    Close,
}

impl RotationDirection {
    fn level(self) -> Level {
        match self {
            RotationDirection::Open => Level::High,
            RotationDirection::Close => Level::Low,
        }
    }
}

/// Velocity-ramped stepper motor on two actuator pins.
///
/// The pin resource is serialized by a mutex: a rotation requested while
/// another is in progress waits for it. Motion is never interrupted
/// mid-train; once started, a rotation runs to completion.
///
/// # Example
///
/// ```
/// use facegate_motor::{MotorProfile, RecordingEmitter, RotationDirection, StepperMotor};
///
/// let emitter = RecordingEmitter::new();
/// let motor = StepperMotor::new(emitter.clone(), MotorProfile::default());
///
/// motor.rotate(9.0, RotationDirection::Open).unwrap();
/// assert_eq!(emitter.pulse_count(), 20); // 9/360 * 800
/// ```
pub struct StepperMotor<E: PulseEmitter> {
    profile: MotorProfile,
    emitter: Mutex<E>,
}

impl<E: PulseEmitter> StepperMotor<E> {
    pub fn new(emitter: E, profile: MotorProfile) -> Self {
        Self {
            profile,
            emitter: Mutex::new(emitter),
        }
    }

    pub fn profile(&self) -> &MotorProfile {
        &self.profile
    }

    /// Rotate by `angle_degrees` in `direction`.
    ///
    /// A non-positive angle is a no-op. Total pulses are
    /// `round(angle/360 * pulses_per_rev)`; the direction pin is set and
    /// allowed to settle before the train starts. Each pulse is a
    /// 50%-duty square wave: pin high for half the period, low for the
    /// other half.
    ///
    /// Blocks for the full duration of the train. Concurrent callers
    /// queue on the pin mutex.
    ///
    /// # Errors
    /// Propagates pulse emitter failures; the train is abandoned at the
    /// failing transition.
    pub fn rotate(&self, angle_degrees: f64, direction: RotationDirection) -> Result<()> {
        if angle_degrees <= 0.0 {
            return Ok(());
        }

        let pulses = self.profile.pulses_for_angle(angle_degrees);
        if pulses == 0 {
            debug!(angle_degrees, "rotation below one pulse; skipping");
            return Ok(());
        }

        let schedule = self.profile.pulse_schedule(pulses);

        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| Error::PulseEmitter("pin mutex poisoned".to_string()))?;

        info!(angle = angle_degrees, ?direction, pulses, "rotating");

        emitter.set(MotorPin::Direction, direction.level())?;
        spin_sleep::sleep(DIRECTION_SETTLE);

        for period in schedule {
            let half = period / 2;
            emitter.set(MotorPin::Pulse, Level::High)?;
            spin_sleep::sleep(half);
            emitter.set(MotorPin::Pulse, Level::Low)?;
            spin_sleep::sleep(half);
        }

        Ok(())
    }
}
