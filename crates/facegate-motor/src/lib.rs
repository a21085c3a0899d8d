//! Stepper-motor pulse generation for the door actuator.
//!
//! Converts an angle plus direction into a time-accurate, velocity-ramped
//! pulse train on the actuator pins. The velocity profile is trapezoidal:
//! linear acceleration over the first 20% of pulses, cruise over the
//! middle 60%, linear deceleration over the last 20%.
//!
//! GPIO access is abstracted behind the [`PulseEmitter`] capability —
//! there is no global hardware handle — so the generator runs against a
//! [`RecordingEmitter`] in tests and a real pin driver on the device.

pub mod emitter;
pub mod profile;
pub mod stepper;

pub use emitter::{Level, MotorPin, PulseEmitter, RecordingEmitter};
pub use profile::MotorProfile;
pub use stepper::{RotationDirection, StepperMotor};
