//! Service configuration - root configuration structure.

use heapless::String;
use serde::Deserialize;

use super::motor::MotorSettings;
use super::pins::PinConfig;

/// Default RPC listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:4000";

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// GPIO pin numbers.
    #[serde(default)]
    pub pins: PinConfig,

    /// Motor behaviour.
    #[serde(default)]
    pub motor: MotorSettings,

    /// Position state file.
    #[serde(default)]
    pub storage: StorageConfig,

    /// RPC listener.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the position record lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageConfig {
    /// State file path.
    #[serde(default = "default_path")]
    pub path: String<128>,
}

/// RPC listener settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    #[serde(default = "default_bind")]
    pub bind: String<64>,
}

fn default_path() -> String<128> {
    String::try_from("motor_position.json").unwrap_or_default()
}

fn default_bind() -> String<64> {
    String::try_from(DEFAULT_BIND).unwrap_or_default()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}
