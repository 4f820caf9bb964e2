//! # stepper-remote
//!
//! Remote control of a step/direction stepper driver with an absolute
//! position that survives restarts.
//!
//! ## Features
//!
//! - **embedded-hal 1.0**: Uses `OutputPin` for STEP/DIR/MS1-3, `DelayNs` for timing
//! - **Position tracking**: Absolute position credited only after a full pulse train
//! - **Bookmarks**: Home position and named positions, persisted with every change
//! - **Microstepping**: Mode 0 (full step) to 5 (1/32 step) via three select lines
//! - **no_std core**: Controller and in-memory store work without the standard library
//! - **Remote calls**: Line-delimited JSON over TCP (`std`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_remote::{JsonFileStore, MotionController};
//! use std::time::Duration;
//!
//! let mut motor = MotionController::builder()
//!     .step_pin(step_pin)
//!     .dir_pin(dir_pin)
//!     .microstep_pins([ms1, ms2, ms3])
//!     .delay(delay)
//!     .store(JsonFileStore::new("motor_position.json"))
//!     .build()?;
//!
//! motor.move_relative(200, Duration::from_millis(2))?;
//! motor.save_named("park")?;
//! motor.goto_named("park", Duration::from_millis(2))?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): JSON state file, TOML configuration, RPC facade
//! - `defmt`: Routes internal logging to defmt instead of `log`
//! - `server`: Raspberry Pi `stepper-server` binary (rppal backend)

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod motor;
#[cfg(feature = "std")]
pub mod rpc;
pub mod store;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorSettings, PinConfig, ServiceConfig};
pub use error::{Error, Result};
pub use motor::{
    Direction, HomeOutcome, Line, MicrostepMode, MotionController, MotionControllerBuilder,
    StepperPins, DEFAULT_PULSE_DELAY,
};
pub use store::{MemoryStore, PositionRecord, PositionStore};

// File-backed pieces (std only)
#[cfg(feature = "std")]
pub use config::load_config;
#[cfg(feature = "std")]
pub use store::JsonFileStore;
