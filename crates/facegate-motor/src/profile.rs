//! Motion profile and pulse scheduling.
//!
//! The schedule is computed up front as a pure function so the ramp shape
//! is testable without driving pins or sleeping.

use std::time::Duration;

/// Fraction of the train spent accelerating (and, symmetrically,
/// decelerating).
const RAMP_FRACTION: f64 = 0.2;

/// Below this many ramp pulses the ramp is meaningless; the whole train
/// runs at maximum frequency instead.
const MIN_RAMP_PULSES: u32 = 5;

/// Stepper timing profile.
///
/// `min_delay` is the shortest pulse period (fastest speed), `max_delay`
/// the longest (starting speed). Derived frequencies:
/// `min_freq = 1/max_delay`, `max_freq = 1/min_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorProfile {
    /// Driver pulses per full output revolution.
    pub pulses_per_rev: u32,

    /// Shortest pulse period (fastest).
    pub min_delay: Duration,

    /// Longest pulse period (slowest, used at ramp endpoints).
    pub max_delay: Duration,
}

impl Default for MotorProfile {
    fn default() -> Self {
        // 800 steps/rev at 500 Hz..2 kHz
        Self {
            pulses_per_rev: 800,
            min_delay: Duration::from_micros(500),
            max_delay: Duration::from_millis(2),
        }
    }
}

impl MotorProfile {
    /// Slowest instantaneous frequency (Hz).
    #[must_use]
    pub fn min_freq(&self) -> f64 {
        1.0 / self.max_delay.as_secs_f64()
    }

    /// Fastest instantaneous frequency (Hz).
    #[must_use]
    pub fn max_freq(&self) -> f64 {
        1.0 / self.min_delay.as_secs_f64()
    }

    /// Pulses for a rotation of `angle_degrees`. Zero for non-positive
    /// angles.
    #[must_use]
    pub fn pulses_for_angle(&self, angle_degrees: f64) -> u32 {
        if angle_degrees <= 0.0 {
            return 0;
        }
        (angle_degrees / 360.0 * f64::from(self.pulses_per_rev)).round() as u32
    }

    /// Per-pulse period schedule for a train of `total` pulses.
    ///
    /// Trapezoidal velocity: the first 20% of pulses accelerate, the
    /// middle 60% cruise, the last 20% decelerate. Instantaneous
    /// frequency rises linearly from `min_freq` to `max_freq` across the
    /// acceleration phase, holds at `max_freq`, then falls linearly back
    /// to `min_freq`. A degenerate ramp (fewer than 5 ramp pulses) is
    /// skipped and the whole train runs at `max_freq`.
    #[must_use]
    pub fn pulse_schedule(&self, total: u32) -> Vec<Duration> {
        let min_period = self.min_delay.as_secs_f64();
        let max_period = self.max_delay.as_secs_f64();
        let min_freq = self.min_freq();
        let max_freq = self.max_freq();

        let ramp = (f64::from(total) * RAMP_FRACTION) as u32;
        if ramp < MIN_RAMP_PULSES {
            return vec![self.min_delay; total as usize];
        }

        let span = max_freq - min_freq;
        (0..total)
            .map(|i| {
                let freq = if i < ramp {
                    // Acceleration: min_freq at the first pulse
                    min_freq + span * f64::from(i) / f64::from(ramp)
                } else if i >= total - ramp {
                    // Deceleration: min_freq at the last pulse
                    let remaining = total - 1 - i;
                    min_freq + span * f64::from(remaining) / f64::from(ramp)
                } else {
                    max_freq
                };

                let period = (1.0 / freq).clamp(min_period, max_period);
                Duration::from_secs_f64(period)
            })
            .collect()
    }
}
