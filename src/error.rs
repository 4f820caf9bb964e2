//! Error types for stepper-remote.
//!
//! Provides unified error handling across configuration, motor control,
//! position bookkeeping, persistence and the RPC facade.

use core::fmt;

use crate::motor::Line;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-remote operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor or GPIO operation error
    Motor(MotorError),
    /// Home / named position bookkeeping error
    Position(PositionError),
    /// Persistent state error
    Store(StoreError),
    /// Malformed or unknown remote call
    Rpc(RpcError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration or an environment value
    ParseError(heapless::String<128>),
    /// A required pin was not configured
    MissingPin(&'static str),
    /// Pin number outside the BCM range 0..=27
    InvalidPin(u8),
    /// Same pin assigned to more than one line
    DuplicatePin(u8),
    /// Pulse delay must be greater than zero
    InvalidPulseDelay(u32),
    /// Start-up microstep mode outside 0..=5
    InvalidMicrostepMode(i64),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Microstep mode outside 0..=5; no select line was written
    InvalidMode(i64),
    /// Writing a GPIO line failed.
    ///
    /// Pulses already emitted in the aborted train are not reflected in the
    /// tracked position.
    Device {
        /// Line whose write failed
        line: Line,
        /// Step pulses completed before the failure
        pulses_emitted: u64,
    },
    /// Move would take the position outside the `i64` range
    PositionOverflow,
    /// Controller has been shut down and released its pins
    ShutDown,
}

/// Home and named position errors.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionError {
    /// No saved position with this name
    NotFound(heapless::String<32>),
    /// Position name longer than 32 bytes
    NameTooLong,
    /// Named position table has no room for another name
    TableFull,
}

/// Persistent state errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Stored state exists but cannot be decoded
    CorruptState(heapless::String<128>),
    /// Reading or writing the backing storage failed
    Io(heapless::String<128>),
}

/// Remote call errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcError {
    /// Request line is not a valid request object
    Malformed(heapless::String<128>),
    /// No method with this name
    UnknownMethod(heapless::String<32>),
    /// Missing or mistyped argument
    BadArgument(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Position(e) => write!(f, "Position error: {}", e),
            Error::Store(e) => write!(f, "Store error: {}", e),
            Error::Rpc(e) => write!(f, "RPC error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MissingPin(line) => write!(f, "No pin configured for {}", line),
            ConfigError::InvalidPin(p) => write!(f, "Invalid pin {}. Must be 0-27", p),
            ConfigError::DuplicatePin(p) => write!(f, "Pin {} assigned to more than one line", p),
            ConfigError::InvalidPulseDelay(v) => {
                write!(f, "Invalid pulse delay: {} us. Must be > 0", v)
            }
            ConfigError::InvalidMicrostepMode(m) => {
                write!(f, "Invalid microstep mode: {}. Must be 0-5", m)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::InvalidMode(m) => {
                write!(f, "Invalid microstepping mode: {}. Must be 0-5", m)
            }
            MotorError::Device { line, pulses_emitted } => write!(
                f,
                "GPIO write to {} line failed after {} pulses; position not updated",
                line, pulses_emitted
            ),
            MotorError::PositionOverflow => write!(f, "Move exceeds the position range"),
            MotorError::ShutDown => write!(f, "Motor has been shut down"),
        }
    }
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::NotFound(name) => write!(f, "Saved position '{}' not found", name),
            PositionError::NameTooLong => write!(f, "Position name too long (max 32 bytes)"),
            PositionError::TableFull => write!(f, "Too many saved positions"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::CorruptState(msg) => write!(f, "Corrupt position state: {}", msg),
            StoreError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Malformed(msg) => write!(f, "Malformed request: {}", msg),
            RpcError::UnknownMethod(name) => write!(f, "Unknown method '{}'", name),
            RpcError::BadArgument(arg) => write!(f, "Missing or invalid argument '{}'", arg),
        }
    }
}

impl Error {
    /// Short machine-readable kind, used in RPC failure replies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "ConfigError",
            Error::Motor(MotorError::InvalidMode(_)) => "InvalidModeError",
            Error::Motor(MotorError::Device { .. }) => "DeviceError",
            Error::Motor(MotorError::PositionOverflow) => "PositionOverflowError",
            Error::Motor(MotorError::ShutDown) => "ShutDownError",
            Error::Position(PositionError::NotFound(_)) => "NamedPositionNotFoundError",
            Error::Position(_) => "NamedPositionError",
            Error::Store(StoreError::CorruptState(_)) => "CorruptStateError",
            Error::Store(StoreError::Io(_)) => "StorageError",
            Error::Rpc(_) => "RequestError",
        }
    }
}

/// Truncate a message into a fixed-capacity string, keeping what fits.
pub(crate) fn truncated<const N: usize>(msg: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in msg.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<PositionError> for Error {
    fn from(e: PositionError) -> Self {
        Error::Position(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<RpcError> for Error {
    fn from(e: RpcError) -> Self {
        Error::Rpc(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for PositionError {}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}

#[cfg(feature = "std")]
impl std::error::Error for RpcError {}
