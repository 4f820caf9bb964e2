//! Configuration loading from files and the environment (std only).

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{truncated, ConfigError, Error, Result};

use super::{validate_config, ServiceConfig};

/// Load configuration from a TOML file, apply environment overrides and
/// validate the result.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or fails validation.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_remote::load_config;
///
/// let config = load_config("stepper.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = format!("{}: {}", path.as_ref().display(), e);
        Error::Config(ConfigError::IoError(truncated(&msg)))
    })?;

    parse_config_with(&content, |key| std::env::var(key).ok())
}

/// Parse configuration from a TOML string and validate it.
///
/// Environment variables are not consulted; use [`parse_config_with`] or
/// [`load_config`] for that.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    parse_config_with(content, |_| None)
}

/// Parse configuration from a TOML string, apply overrides from `lookup`
/// (see [`apply_overrides`]) and validate the result.
///
/// [`load_config`] is this with the process environment as `lookup`.
///
/// # Errors
///
/// Returns an error if the TOML is invalid, an override does not parse, or
/// the result fails validation.
pub fn parse_config_with<F>(content: &str, lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config: ServiceConfig = toml::from_str(content).map_err(|e| {
        Error::Config(ConfigError::ParseError(truncated(e.message())))
    })?;

    let config = apply_overrides(config, lookup)?;
    validate_config(&config)?;
    Ok(config)
}

impl ServiceConfig {
    /// Build a configuration from environment variables alone.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the result fails
    /// validation.
    pub fn from_env() -> Result<Self> {
        let config = apply_env_overrides(Self::default())?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Apply `STEP_PIN`, `DIRECTION_PIN`, `MICROSTEPPING_PIN_0..2`,
/// `STEPPER_STATE_FILE` and `STEPPER_BIND` from the process environment.
pub fn apply_env_overrides(config: ServiceConfig) -> Result<ServiceConfig> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary variable lookup.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` naming the variable if a value does
/// not parse.
pub fn apply_overrides<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    const MS_VARS: [&str; 3] = [
        "MICROSTEPPING_PIN_0",
        "MICROSTEPPING_PIN_1",
        "MICROSTEPPING_PIN_2",
    ];

    if let Some(pin) = parse_var(&lookup, "STEP_PIN")? {
        config.pins.step = Some(pin);
    }
    if let Some(pin) = parse_var(&lookup, "DIRECTION_PIN")? {
        config.pins.direction = Some(pin);
    }
    for (slot, var) in config.pins.microstep.iter_mut().zip(MS_VARS) {
        if let Some(pin) = parse_var(&lookup, var)? {
            *slot = Some(pin);
        }
    }
    if let Some(path) = lookup("STEPPER_STATE_FILE") {
        config.storage.path = heapless::String::try_from(path.as_str())
            .map_err(|_| parse_error("STEPPER_STATE_FILE", "path too long"))?;
    }
    if let Some(bind) = lookup("STEPPER_BIND") {
        config.server.bind = heapless::String::try_from(bind.as_str())
            .map_err(|_| parse_error("STEPPER_BIND", "address too long"))?;
    }

    Ok(config)
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| parse_error(key, &e.to_string())),
    }
}

fn parse_error(key: &str, reason: &str) -> Error {
    Error::Config(ConfigError::ParseError(truncated(&format!("{}: {}", key, reason))))
}
