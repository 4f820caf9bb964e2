//! Method dispatch onto a shared controller.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use serde_json::{Map, Value};

use crate::error::{truncated, Error, MotorError, Result, RpcError};
use crate::motor::{HomeOutcome, MotionController};
use crate::store::PositionStore;

use super::request::{Params, Reply, Request};

/// Method names accepted by [`Dispatcher::call`], aliases included.
pub const METHODS: &[&str] = &[
    "step",
    "step_motor",
    "move_absolute",
    "move_to_absolute",
    "move_relative",
    "set_home",
    "go_home",
    "go_to_home",
    "zero",
    "set_position_zero",
    "save_named",
    "save_position",
    "goto_named",
    "go_to_saved_position",
    "get_position",
    "get_current_position",
    "get_home_position",
    "get_saved_positions",
    "set_microstepping",
    "shutdown",
    "cleanup",
];

/// Serialises remote calls onto one controller.
///
/// Holds `None` once shut down; every later call fails with
/// `MotorError::ShutDown`.
pub struct Dispatcher<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    controller: Mutex<Option<MotionController<STEP, DIR, MS, DELAY, S>>>,
}

impl<STEP, DIR, MS, DELAY, S> Dispatcher<STEP, DIR, MS, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS: OutputPin,
    DELAY: DelayNs,
    S: PositionStore,
{
    /// Take ownership of a controller.
    pub fn new(controller: MotionController<STEP, DIR, MS, DELAY, S>) -> Self {
        Self {
            controller: Mutex::new(Some(controller)),
        }
    }

    /// Whether the controller has been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.lock().is_none()
    }

    /// Handle one request line. The flag is `true` when the server should stop.
    pub fn handle_line(&self, line: &str) -> (Reply, bool) {
        match Request::parse(line) {
            Ok(Request::Call { method, params }) => {
                let result = self.call(&method, &params);
                if let Err(e) = &result {
                    log::warn!("{} failed: {}", method, e);
                }
                (Reply::from_result(result), false)
            }
            Ok(Request::Terminate) => {
                log::info!("terminate requested");
                (Reply::from_result(self.shutdown().map(|_| Value::Null)), true)
            }
            Err(e) => {
                log::warn!("rejected request: {}", e);
                (Reply::from_result(Err(e)), false)
            }
        }
    }

    /// Invoke `method` with `params`.
    ///
    /// # Errors
    ///
    /// `RpcError::UnknownMethod`, `RpcError::BadArgument`, or whatever the
    /// controller operation returns.
    pub fn call(&self, method: &str, params: &Params) -> Result<Value> {
        if matches!(method, "shutdown" | "cleanup") {
            return self.shutdown().map(|_| Value::Null);
        }
        if !METHODS.contains(&method) {
            return Err(Error::Rpc(RpcError::UnknownMethod(truncated(method))));
        }

        let mut guard = self.lock();
        let motor = guard.as_mut().ok_or(MotorError::ShutDown)?;
        let default_delay = motor.default_pulse_delay();
        let delay = |index: usize| -> Result<Duration> {
            Ok(params.delay(index, "delay")?.unwrap_or(default_delay))
        };

        log::debug!("call {} {:?}", method, params.args);
        match method {
            "step" | "step_motor" => {
                let steps = params.int(0, "steps")?;
                motor.step(steps, delay(1)?)?;
                Ok(Value::Null)
            }
            "move_absolute" | "move_to_absolute" => {
                let target = params.int(0, "target")?;
                motor.move_absolute(target, delay(1)?)?;
                Ok(Value::Null)
            }
            "move_relative" => {
                let offset = params.int(0, "offset")?;
                motor.move_relative(offset, delay(1)?)?;
                Ok(Value::Null)
            }
            "set_home" => {
                motor.set_home()?;
                Ok(Value::Null)
            }
            "go_home" | "go_to_home" => Ok(match motor.go_home(delay(0)?)? {
                HomeOutcome::Moved => Value::from("moved"),
                HomeOutcome::AlreadyHome => Value::from("already_home"),
            }),
            "zero" | "set_position_zero" => {
                motor.zero()?;
                Ok(Value::Null)
            }
            "save_named" | "save_position" => {
                let name = params.name(0, "name")?;
                motor.save_named(name.as_str())?;
                Ok(Value::Null)
            }
            "goto_named" | "go_to_saved_position" => {
                let name = params.name(0, "name")?;
                motor.goto_named(&name, delay(1)?)?;
                Ok(Value::Null)
            }
            "get_position" | "get_current_position" => Ok(Value::from(motor.get_position())),
            "get_home_position" => Ok(Value::from(motor.home_position())),
            "get_saved_positions" => Ok(Value::Object(
                motor
                    .record()
                    .named_positions()
                    .map(|(name, pos)| (name.to_string(), Value::from(pos)))
                    .collect::<Map<_, _>>(),
            )),
            "set_microstepping" => {
                motor.set_microstepping(params.int(0, "mode")?)?;
                Ok(Value::Null)
            }
            _ => Err(Error::Rpc(RpcError::UnknownMethod(truncated(method)))),
        }
    }

    /// Shut the controller down: persist, release pins. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns the store error if the final write fails; the pins are
    /// released either way.
    pub fn shutdown(&self) -> Result<()> {
        match self.lock().take() {
            Some(controller) => controller.shutdown().map(drop),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<MotionController<STEP, DIR, MS, DELAY, S>>> {
        // A panic mid-call leaves the record as of the last completed command.
        self.controller.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
