//! Environment-based configuration.
//!
//! Every tunable has a default matching the deployed hardware and an
//! environment override. Log verbosity is configured separately through
//! `RUST_LOG`.

use facegate_controller::ControllerConfig;
use facegate_core::{Error, Result};
use facegate_motor::MotorProfile;
use facegate_serial::SerialConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Full runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub motor: MotorProfile,
    pub controller: ControllerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            motor: MotorProfile::default(),
            controller: ControllerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration, applying environment overrides on top of the
    /// defaults.
    ///
    /// | Variable | Default | Meaning |
    /// |----------|---------|---------|
    /// | `SERIAL_PORT` | `/dev/ttyUSB0` | Coprocessor serial device |
    /// | `SERIAL_BAUD` | `115200` | Baud rate |
    /// | `SERIAL_TIMEOUT_MS` | `100` | Read poll timeout |
    /// | `FACE_WINDOW_SECS` | `5.0` | Debounce window |
    /// | `FACE_SCORE_THRESHOLD` | `80` | Minimum match score |
    /// | `AUTO_CLOSE_SECS` | `5.0` | Delay before auto-close |
    /// | `STATUS_INTERVAL_SECS` | `30` | Status report cadence |
    /// | `MOTOR_OPEN_ANGLE` | `90.0` | Opening angle (degrees) |
    /// | `MOTOR_PULSES_PER_REV` | `800` | Driver pulses per revolution |
    /// | `MOTOR_MIN_DELAY_US` | `500` | Fastest pulse period |
    /// | `MOTOR_MAX_DELAY_US` | `2000` | Slowest pulse period |
    ///
    /// # Errors
    /// Returns `Error::Config` when an override is present but does not
    /// parse.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let serial = SerialConfig {
            port: env_or("SERIAL_PORT", defaults.serial.port)?,
            baud_rate: env_or("SERIAL_BAUD", defaults.serial.baud_rate)?,
            read_timeout: Duration::from_millis(env_or(
                "SERIAL_TIMEOUT_MS",
                defaults.serial.read_timeout.as_millis() as u64,
            )?),
        };

        let motor = MotorProfile {
            pulses_per_rev: env_or("MOTOR_PULSES_PER_REV", defaults.motor.pulses_per_rev)?,
            min_delay: Duration::from_micros(env_or(
                "MOTOR_MIN_DELAY_US",
                defaults.motor.min_delay.as_micros() as u64,
            )?),
            max_delay: Duration::from_micros(env_or(
                "MOTOR_MAX_DELAY_US",
                defaults.motor.max_delay.as_micros() as u64,
            )?),
        };

        let controller = ControllerConfig {
            face_window: Duration::from_secs_f64(env_or("FACE_WINDOW_SECS", 5.0)?),
            score_threshold: env_or("FACE_SCORE_THRESHOLD", 80)?,
            open_angle: env_or("MOTOR_OPEN_ANGLE", 90.0)?,
            auto_close_delay: Duration::from_secs_f64(env_or("AUTO_CLOSE_SECS", 5.0)?),
            status_interval: Duration::from_secs(env_or("STATUS_INTERVAL_SECS", 30)?),
            tick_interval: defaults.controller.tick_interval,
        };

        Ok(Self {
            serial,
            motor,
            controller,
        })
    }
}

/// Read an environment override, falling back to `default` when unset.
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::Config(format!("invalid {key}: {value:?}"))),
        Err(_) => Ok(default),
    }
}
