//! Configuration module for stepper-remote.
//!
//! Provides types for loading and validating the service configuration
//! from TOML files (with `std` feature) or pre-parsed data.

#[cfg(feature = "std")]
mod loader;
mod motor;
mod pins;
mod system;
mod validation;

pub use motor::MotorSettings;
pub use pins::{PinAssignment, PinConfig, MAX_BCM_PIN};
pub use system::{ServerConfig, ServiceConfig, StorageConfig, DEFAULT_BIND};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{apply_env_overrides, apply_overrides, load_config, parse_config, parse_config_with};
