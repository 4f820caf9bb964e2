//! Builder pattern for MotionController.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::MotorSettings;
use crate::error::{ConfigError, Error, Result};
use crate::store::PositionStore;

use super::controller::{MotionController, DEFAULT_PULSE_DELAY};
use super::microstep::MicrostepMode;
use super::pins::StepperPins;

/// Builder for creating MotionController instances.
pub struct MotionControllerBuilder<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    microstep_pins: Option<[MS; 3]>,
    delay: Option<DELAY>,
    store: Option<S>,
    invert_direction: bool,
    default_pulse_delay: Duration,
    microstep_mode: Option<MicrostepMode>,
}

impl<STEP, DIR, MS, DELAY, S> Default for MotionControllerBuilder<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<STEP, DIR, MS, DELAY, S> MotionControllerBuilder<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            microstep_pins: None,
            delay: None,
            store: None,
            invert_direction: false,
            default_pulse_delay: DEFAULT_PULSE_DELAY,
            microstep_mode: None,
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the MS1, MS2, MS3 select pins.
    pub fn microstep_pins(mut self, pins: [MS; 3]) -> Self {
        self.microstep_pins = Some(pins);
        self
    }

    /// Set all five lines at once.
    pub fn pins(self, pins: StepperPins<STEP, DIR, MS>) -> Self {
        self.step_pin(pins.step)
            .dir_pin(pins.dir)
            .microstep_pins(pins.microstep)
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: DELAY) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the position store.
    pub fn store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set the pulse delay used when a call does not give one.
    pub fn default_pulse_delay(mut self, delay: Duration) -> Self {
        self.default_pulse_delay = delay;
        self
    }

    /// Apply a microstep mode right after start-up.
    pub fn microstep_mode(mut self, mode: MicrostepMode) -> Self {
        self.microstep_mode = Some(mode);
        self
    }

    /// Configure from MotorSettings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured microstep mode is out of range.
    pub fn from_settings(mut self, settings: &MotorSettings) -> Result<Self> {
        self.invert_direction = settings.invert_direction;
        self.default_pulse_delay = settings.pulse_delay();
        if let Some(mode) = settings.microstep_mode {
            self.microstep_mode = Some(
                MicrostepMode::from_index(mode)
                    .map_err(|_| Error::Config(ConfigError::InvalidMicrostepMode(mode)))?,
            );
        }
        Ok(self)
    }

    /// Build the MotionController.
    ///
    /// Loads the stored position, drives STEP and DIR low and applies the
    /// start-up microstep mode if one was set.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, the stored state
    /// cannot be loaded, or a line write fails.
    pub fn build(self) -> Result<MotionController<STEP, DIR, MS, DELAY, S>> {
        let step = self.step_pin.ok_or(ConfigError::MissingPin("step"))?;
        let dir = self.dir_pin.ok_or(ConfigError::MissingPin("direction"))?;
        let microstep = self.microstep_pins.ok_or(ConfigError::MissingPin("microstep"))?;
        let delay = self.delay.ok_or_else(|| required("delay"))?;
        let store = self.store.ok_or_else(|| required("store"))?;

        let mut controller = MotionController::new(
            StepperPins::new(step, dir, microstep),
            delay,
            store,
            self.invert_direction,
            self.default_pulse_delay,
        )?;

        if let Some(mode) = self.microstep_mode {
            controller.apply_microstep_mode(mode)?;
        }

        Ok(controller)
    }
}

impl<STEP, DIR, MS, DELAY, S> MotionController<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    /// Start building a controller.
    pub fn builder() -> MotionControllerBuilder<STEP, DIR, MS, DELAY, S> {
        MotionControllerBuilder::new()
    }
}

fn required(field: &str) -> Error {
    let mut msg = heapless::String::<128>::new();
    let _ = msg.push_str(field);
    let _ = msg.push_str(" is required");
    Error::Config(ConfigError::ParseError(msg))
}
