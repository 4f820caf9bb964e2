//! Position-tracking motion controller.
//!
//! Generic over embedded-hal 1.0 output pins, a `DelayNs` timer and a
//! [`PositionStore`].

use core::fmt::Display;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{truncated, MotorError, PositionError, Result};
use crate::store::{position_name, PositionRecord, PositionStore};

use super::direction::Direction;
use super::microstep::MicrostepMode;
use super::pins::StepperPins;

/// Pulse delay used when a caller does not give one (20 ms).
pub const DEFAULT_PULSE_DELAY: Duration = Duration::from_millis(20);

/// Result of [`MotionController::go_home`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeOutcome {
    /// The motor travelled to the home position.
    Moved,
    /// Already at home; no pulses were emitted.
    AlreadyHome,
}

/// Stepper motion controller with persistent absolute position.
///
/// Every command runs to completion on the calling thread. The position
/// record is written through the store after each mutation; a pulse train
/// is only credited once all of its pulses were emitted.
///
/// Generic over:
/// - `STEP`, `DIR`, `MS`: output pin types for STEP, DIR and MS1..MS3
/// - `DELAY`: delay provider for pulse timing
/// - `S`: position store
pub struct MotionController<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    /// Driver lines.
    pins: StepperPins<STEP, DIR, MS>,

    /// Delay provider for pulse timing.
    delay: DELAY,

    /// Durable copy of `record`.
    store: S,

    /// Current, home and named positions.
    record: PositionRecord,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Last microstep mode written to the select lines.
    microstep_mode: Option<MicrostepMode>,

    /// Pulse delay for callers that do not pass one.
    default_pulse_delay: Duration,
}

impl<STEP, DIR, MS, DELAY, S> MotionController<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    /// Load the stored record and drive STEP and DIR low.
    pub(crate) fn new(
        mut pins: StepperPins<STEP, DIR, MS>,
        delay: DELAY,
        mut store: S,
        invert_direction: bool,
        default_pulse_delay: Duration,
    ) -> Result<Self> {
        let record = store.load()?;
        pins.write_step(false, 0)?;
        pins.write_dir(false)?;

        info!(
            "controller ready at position {} (home {})",
            record.current_position, record.home_position
        );

        Ok(Self {
            pins,
            delay,
            store,
            record,
            invert_direction,
            microstep_mode: None,
            default_pulse_delay,
        })
    }

    /// Current absolute position in steps.
    #[inline]
    pub fn get_position(&self) -> i64 {
        self.record.current_position
    }

    /// Home bookmark in steps.
    #[inline]
    pub fn home_position(&self) -> i64 {
        self.record.home_position
    }

    /// Look up a named position.
    pub fn named_position(&self, name: &str) -> Option<i64> {
        self.record.named(name)
    }

    /// Full in-memory position record.
    #[inline]
    pub fn record(&self) -> &PositionRecord {
        &self.record
    }

    /// Last microstep mode applied, if any since start-up.
    #[inline]
    pub fn microstep_mode(&self) -> Option<MicrostepMode> {
        self.microstep_mode
    }

    /// Pulse delay used when callers omit one.
    #[inline]
    pub fn default_pulse_delay(&self) -> Duration {
        self.default_pulse_delay
    }

    /// Backing store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Set the microstep mode (0 = full step ... 5 = thirty-second step).
    ///
    /// # Errors
    ///
    /// `MotorError::InvalidMode` before any line is touched if `mode` is
    /// outside 0..=5; `MotorError::Device` if a select line write fails.
    pub fn set_microstepping(&mut self, mode: i64) -> Result<MicrostepMode> {
        let mode = MicrostepMode::from_index(mode).map_err(|e| {
            warn!("rejected microstepping mode {}", mode);
            e
        })?;
        self.apply_microstep_mode(mode)?;
        Ok(mode)
    }

    pub(crate) fn apply_microstep_mode(&mut self, mode: MicrostepMode) -> Result<()> {
        self.pins.write_microstep(mode.levels())?;
        self.microstep_mode = Some(mode);
        info!("microstepping set to mode {} (1/{})", mode.index(), mode.divisor());
        Ok(())
    }

    /// Emit `|delta|` step pulses in the direction of `delta`, then credit
    /// `delta` to the position and persist.
    ///
    /// The DIR line is written exactly once, before the first pulse. Each
    /// pulse is STEP high, `pulse_delay`, STEP low, `pulse_delay`.
    ///
    /// # Errors
    ///
    /// - `MotorError::PositionOverflow` if the result would not fit in `i64`
    ///   (checked before any line is touched)
    /// - `MotorError::Device` if a line write fails; the position keeps its
    ///   pre-move value
    /// - a store error if persisting fails; the in-memory position already
    ///   reflects the completed move
    pub fn step(&mut self, delta: i64, pulse_delay: Duration) -> Result<()> {
        let target = self
            .record
            .current_position
            .checked_add(delta)
            .ok_or(MotorError::PositionOverflow)?;

        let direction = Direction::from_delta(delta);
        self.pins.write_dir(direction.pin_level(self.invert_direction))?;

        let pulses = delta.unsigned_abs();
        debug!("pulse train: {} pulses, delta {}", pulses, delta);
        for emitted in 0..pulses {
            if let Err(e) = self.pulse(emitted, pulse_delay) {
                warn!(
                    "pulse train aborted after {} of {} pulses; position stays {}",
                    emitted,
                    pulses,
                    self.record.current_position
                );
                return Err(e);
            }
        }

        self.record.current_position = target;
        self.persist()
    }

    /// Move to an absolute position.
    pub fn move_absolute(&mut self, target: i64, pulse_delay: Duration) -> Result<()> {
        let delta = target
            .checked_sub(self.record.current_position)
            .ok_or(MotorError::PositionOverflow)?;
        self.step(delta, pulse_delay)
    }

    /// Move by `offset` steps from the current position.
    pub fn move_relative(&mut self, offset: i64, pulse_delay: Duration) -> Result<()> {
        self.step(offset, pulse_delay)
    }

    /// Bookmark the current position as home.
    pub fn set_home(&mut self) -> Result<()> {
        self.record.home_position = self.record.current_position;
        info!("home set at {} steps", self.record.home_position);
        self.persist()
    }

    /// Travel to the home position unless already there.
    pub fn go_home(&mut self, pulse_delay: Duration) -> Result<HomeOutcome> {
        let home = self.record.home_position;
        if home == self.record.current_position {
            info!("already at home ({} steps)", home);
            return Ok(HomeOutcome::AlreadyHome);
        }
        self.move_absolute(home, pulse_delay)?;
        info!("moved to home at {} steps", home);
        Ok(HomeOutcome::Moved)
    }

    /// Relabel the current physical location as position 0.
    ///
    /// Bookkeeping only: no pulses are emitted, and home and named positions
    /// keep their absolute values.
    pub fn zero(&mut self) -> Result<()> {
        self.record.current_position = 0;
        info!("position set to zero");
        self.persist()
    }

    /// Save the current position under `name`, overwriting any previous
    /// entry. The name is the `Display` rendering of the value.
    ///
    /// # Errors
    ///
    /// On `no_std` builds, `PositionError::NameTooLong` or
    /// `PositionError::TableFull`, with no state change.
    pub fn save_named<N: Display + ?Sized>(&mut self, name: &N) -> Result<()> {
        let name = position_name(name)?;
        let position = self.record.current_position;
        self.record.set_named(name.as_str(), position)?;
        info!("position '{}' saved at {} steps", name.as_str(), position);
        self.persist()
    }

    /// Travel to a saved position.
    ///
    /// # Errors
    ///
    /// `PositionError::NotFound` if no position has that name; nothing moves.
    pub fn goto_named(&mut self, name: &str, pulse_delay: Duration) -> Result<()> {
        let target = self.record.named(name).ok_or_else(|| {
            warn!("saved position '{}' not found", name);
            PositionError::NotFound(truncated(name))
        })?;
        self.move_absolute(target, pulse_delay)?;
        info!("moved to saved position '{}' at {} steps", name, target);
        Ok(())
    }

    /// Persist the record and hand back the pins and store.
    ///
    /// The controller is consumed; dropping the returned pins releases them.
    pub fn shutdown(mut self) -> Result<(StepperPins<STEP, DIR, MS>, S)> {
        self.persist()?;
        info!("shut down at position {}", self.record.current_position);
        Ok((self.pins, self.store))
    }

    fn pulse(&mut self, emitted: u64, pulse_delay: Duration) -> Result<()> {
        self.pins.write_step(true, emitted)?;
        hold(&mut self.delay, pulse_delay);
        self.pins.write_step(false, emitted)?;
        hold(&mut self.delay, pulse_delay);
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.record).map_err(|e| {
            error!("failed to persist position {}", self.record.current_position);
            e
        })
    }
}

/// Block for `duration`, at nanosecond resolution below ~4.29 s and
/// microsecond resolution above.
fn hold<D: DelayNs>(delay: &mut D, duration: Duration) {
    if let Ok(ns) = u32::try_from(duration.as_nanos()) {
        delay.delay_ns(ns);
        return;
    }
    let mut remaining = duration.as_micros();
    while remaining > 0 {
        let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
        delay.delay_us(chunk);
        remaining -= u128::from(chunk);
    }
}
