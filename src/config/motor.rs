//! Motor settings from TOML.

use core::time::Duration;

use serde::Deserialize;

/// Motor behaviour settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MotorSettings {
    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Pulse delay in microseconds for calls that do not pass one.
    #[serde(default = "default_pulse_delay_us")]
    pub pulse_delay_us: u32,

    /// Microstep mode (0-5) applied at start-up. Left untouched if unset.
    #[serde(default)]
    pub microstep_mode: Option<i64>,
}

fn default_pulse_delay_us() -> u32 {
    20_000
}

impl Default for MotorSettings {
    fn default() -> Self {
        Self {
            invert_direction: false,
            pulse_delay_us: default_pulse_delay_us(),
            microstep_mode: None,
        }
    }
}

impl MotorSettings {
    /// Default pulse delay as a duration.
    pub fn pulse_delay(&self) -> Duration {
        Duration::from_micros(u64::from(self.pulse_delay_us))
    }
}
