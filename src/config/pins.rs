//! GPIO pin assignment.

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Highest BCM GPIO number on the 40-pin header.
pub const MAX_BCM_PIN: u8 = 27;

/// Pin numbers as configured. Any of them may still be missing when the
/// configuration comes from the environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PinConfig {
    /// STEP line.
    #[serde(default)]
    pub step: Option<u8>,

    /// DIR line.
    #[serde(default)]
    pub direction: Option<u8>,

    /// MS1, MS2, MS3 select lines.
    #[serde(default)]
    pub microstep: [Option<u8>; 3],
}

/// Complete set of BCM pin numbers for the five lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    /// STEP line.
    pub step: u8,
    /// DIR line.
    pub direction: u8,
    /// MS1, MS2, MS3 select lines.
    pub microstep: [u8; 3],
}

impl PinConfig {
    /// Require every line to be assigned.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingPin` naming the first unassigned line.
    pub fn resolve(&self) -> Result<PinAssignment> {
        const MS_NAMES: [&str; 3] = ["ms1", "ms2", "ms3"];

        let step = self.step.ok_or(ConfigError::MissingPin("step"))?;
        let direction = self.direction.ok_or(ConfigError::MissingPin("direction"))?;
        let mut microstep = [0u8; 3];
        for (i, pin) in self.microstep.iter().enumerate() {
            microstep[i] = pin.ok_or(ConfigError::MissingPin(MS_NAMES[i]))?;
        }

        Ok(PinAssignment {
            step,
            direction,
            microstep,
        })
    }
}

impl PinAssignment {
    /// All five pins, STEP first.
    pub fn all(&self) -> [u8; 5] {
        [
            self.step,
            self.direction,
            self.microstep[0],
            self.microstep[1],
            self.microstep[2],
        ]
    }
}
