//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::pins::MAX_BCM_PIN;
use super::ServiceConfig;

/// Validate a service configuration.
///
/// Checks:
/// - All five lines are assigned, to distinct pins in 0..=27
/// - Pulse delay is non-zero
/// - Start-up microstep mode, if set, is in 0..=5
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    let pins = config.pins.resolve()?.all();

    for (i, &pin) in pins.iter().enumerate() {
        if pin > MAX_BCM_PIN {
            return Err(Error::Config(ConfigError::InvalidPin(pin)));
        }
        if pins[..i].contains(&pin) {
            return Err(Error::Config(ConfigError::DuplicatePin(pin)));
        }
    }

    if config.motor.pulse_delay_us == 0 {
        return Err(Error::Config(ConfigError::InvalidPulseDelay(0)));
    }

    if let Some(mode) = config.motor.microstep_mode {
        if !(0..=5).contains(&mode) {
            return Err(Error::Config(ConfigError::InvalidMicrostepMode(mode)));
        }
    }

    Ok(())
}
