//! Motor module for stepper-remote.
//!
//! Owns the five GPIO lines of a step/direction driver and turns move
//! requests into pulse trains while keeping the absolute position current.

mod builder;
mod controller;
mod direction;
mod microstep;
mod pins;

pub use builder::MotionControllerBuilder;
pub use controller::{HomeOutcome, MotionController, DEFAULT_PULSE_DELAY};
pub use direction::Direction;
pub use microstep::MicrostepMode;
pub use pins::{Line, StepperPins};
