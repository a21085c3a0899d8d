//! Pulse emitter capability.
//!
//! The motor driver board takes two logic inputs: a pulse pin stepped
//! once per motor step and a direction pin sampled while stepping. The
//! [`PulseEmitter`] trait is the only hardware surface the generator
//! needs; it is injected rather than reached through a global handle.

use facegate_core::Result;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// The two logic pins the generator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorPin {
    /// Stepped once per motor step (active high).
    Pulse,
    /// Sampled by the driver to select rotation direction.
    Direction,
}

/// Logic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Capability to set a logic level on an actuator pin.
///
/// Implementations must be cheap and non-blocking; the generator calls
/// `set` twice per pulse at up to the profile's maximum frequency.
pub trait PulseEmitter: Send {
    /// Set `pin` to `level`.
    ///
    /// # Errors
    /// Returns an error if the underlying pin driver fails; the pulse
    /// train is abandoned at that point.
    fn set(&mut self, pin: MotorPin, level: Level) -> Result<()>;
}

/// Recorded pin transition with its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinTransition {
    pub pin: MotorPin,
    pub level: Level,
    pub at: Instant,
}

/// Test emitter that records every transition.
///
/// Clones share the same recording, so a test can hand one clone to the
/// motor and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    transitions: Arc<Mutex<Vec<PinTransition>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All transitions recorded so far.
    pub fn transitions(&self) -> Vec<PinTransition> {
        self.transitions
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Number of rising edges on the pulse pin.
    pub fn pulse_count(&self) -> usize {
        self.transitions()
            .iter()
            .filter(|t| t.pin == MotorPin::Pulse && t.level == Level::High)
            .count()
    }

    /// Levels driven onto the direction pin, in order.
    pub fn direction_levels(&self) -> Vec<Level> {
        self.transitions()
            .iter()
            .filter(|t| t.pin == MotorPin::Direction)
            .map(|t| t.level)
            .collect()
    }
}

impl PulseEmitter for RecordingEmitter {
    fn set(&mut self, pin: MotorPin, level: Level) -> Result<()> {
        if let Ok(mut transitions) = self.transitions.lock() {
            transitions.push(PinTransition {
                pin,
                level,
                at: Instant::now(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_emitter_counts_rising_edges() {
        let mut emitter = RecordingEmitter::new();
        emitter.set(MotorPin::Direction, Level::High).unwrap();
        emitter.set(MotorPin::Pulse, Level::High).unwrap();
        emitter.set(MotorPin::Pulse, Level::Low).unwrap();
        emitter.set(MotorPin::Pulse, Level::High).unwrap();
        emitter.set(MotorPin::Pulse, Level::Low).unwrap();

        assert_eq!(emitter.pulse_count(), 2);
        assert_eq!(emitter.direction_levels(), vec![Level::High]);
        assert_eq!(emitter.transitions().len(), 5);
    }

    #[test]
    fn test_clones_share_the_recording() {
        let emitter = RecordingEmitter::new();
        let mut clone = emitter.clone();
        clone.set(MotorPin::Pulse, Level::High).unwrap();

        assert_eq!(emitter.pulse_count(), 1);
    }
}
