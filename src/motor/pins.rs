//! GPIO line bundle for a step/direction driver with microstep select.

use core::fmt;

use embedded_hal::digital::OutputPin;

use crate::error::MotorError;

/// One of the five output lines driven by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// STEP line (one high/low pulse per step).
    Step,
    /// DIR line.
    Direction,
    /// Microstep select line MS1..MS3 (index 0..=2).
    Microstep(u8),
}

impl Line {
    /// Line name for logging.
    pub fn name(self) -> &'static str {
        match self {
            Line::Step => "step",
            Line::Direction => "direction",
            Line::Microstep(0) => "ms1",
            Line::Microstep(1) => "ms2",
            Line::Microstep(_) => "ms3",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owned handles for the five driver lines.
///
/// Handed to the controller at construction and returned by
/// [`MotionController::shutdown`](super::MotionController::shutdown).
pub struct StepperPins<STEP, DIR, MS>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
{
    /// STEP pin.
    pub step: STEP,
    /// DIR pin.
    pub dir: DIR,
    /// MS1, MS2, MS3 select pins.
    pub microstep: [MS; 3],
}

impl<STEP, DIR, MS> StepperPins<STEP, DIR, MS>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
{
    /// Bundle the five lines.
    pub fn new(step: STEP, dir: DIR, microstep: [MS; 3]) -> Self {
        Self { step, dir, microstep }
    }

    pub(crate) fn write_step(&mut self, high: bool, pulses_emitted: u64) -> Result<(), MotorError> {
        write_level(&mut self.step, high).map_err(|_| MotorError::Device {
            line: Line::Step,
            pulses_emitted,
        })
    }

    pub(crate) fn write_dir(&mut self, high: bool) -> Result<(), MotorError> {
        write_level(&mut self.dir, high).map_err(|_| MotorError::Device {
            line: Line::Direction,
            pulses_emitted: 0,
        })
    }

    pub(crate) fn write_microstep(&mut self, levels: [bool; 3]) -> Result<(), MotorError> {
        for (index, (pin, high)) in self.microstep.iter_mut().zip(levels).enumerate() {
            write_level(pin, high).map_err(|_| MotorError::Device {
                line: Line::Microstep(index as u8),
                pulses_emitted: 0,
            })?;
        }
        Ok(())
    }
}

fn write_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}
