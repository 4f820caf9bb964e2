//! Position persistence.
//!
//! The controller keeps a [`PositionRecord`] in memory and writes the whole
//! record through a [`PositionStore`] after every mutation.

#[cfg(feature = "std")]
mod json;
mod memory;

#[cfg(feature = "std")]
pub use json::{JsonFileStore, DEFAULT_STATE_FILE};
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::error::{PositionError, Result};

/// Maximum length of a position name in bytes (`no_std` table only).
#[cfg(not(feature = "std"))]
pub const MAX_NAME_LEN: usize = 32;

/// Maximum number of named positions (`no_std` table only).
#[cfg(not(feature = "std"))]
pub const MAX_NAMED_POSITIONS: usize = 32;

/// Position name.
#[cfg(feature = "std")]
pub type PositionName = std::string::String;

/// Position name.
#[cfg(not(feature = "std"))]
pub type PositionName = heapless::String<MAX_NAME_LEN>;

/// Named position table (name → absolute steps).
#[cfg(feature = "std")]
pub type NamedPositions = std::collections::BTreeMap<PositionName, i64>;

/// Named position table (name → absolute steps).
#[cfg(not(feature = "std"))]
pub type NamedPositions = heapless::FnvIndexMap<PositionName, i64, MAX_NAMED_POSITIONS>;

/// Everything that survives a restart.
///
/// Serialized with exactly three keys: `current_position`, `home_position`
/// and `saved_positions`. Missing keys read as their zero default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionRecord {
    /// Absolute position in steps.
    pub current_position: i64,
    /// Home bookmark in steps.
    pub home_position: i64,
    /// Named bookmarks.
    pub saved_positions: NamedPositions,
}

impl PositionRecord {
    /// Look up a named position.
    #[cfg(feature = "std")]
    pub fn named(&self, name: &str) -> Option<i64> {
        self.saved_positions.get(name).copied()
    }

    /// Look up a named position.
    #[cfg(not(feature = "std"))]
    pub fn named(&self, name: &str) -> Option<i64> {
        self.saved_positions
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| *v)
    }

    /// Insert or overwrite a named position.
    ///
    /// # Errors
    ///
    /// Only on `no_std` builds: `NameTooLong` if the name does not fit,
    /// `TableFull` if the name is new and the table has no free slot. The
    /// record is unchanged on error.
    pub fn set_named(&mut self, name: &str, position: i64) -> core::result::Result<(), PositionError> {
        #[cfg(feature = "std")]
        {
            self.saved_positions.insert(name.into(), position);
            Ok(())
        }
        #[cfg(not(feature = "std"))]
        {
            let key = PositionName::try_from(name).map_err(|_| PositionError::NameTooLong)?;
            self.saved_positions
                .insert(key, position)
                .map(|_| ())
                .map_err(|_| PositionError::TableFull)
        }
    }

    /// Iterate over named positions.
    pub fn named_positions(&self) -> impl Iterator<Item = (&str, i64)> {
        self.saved_positions.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Render any displayable value as a position name.
///
/// # Errors
///
/// Only on `no_std` builds: `PositionError::NameTooLong` if the rendered
/// text exceeds [`MAX_NAME_LEN`] bytes.
pub fn position_name<N: core::fmt::Display + ?Sized>(
    name: &N,
) -> core::result::Result<PositionName, PositionError> {
    #[cfg(feature = "std")]
    {
        Ok(name.to_string())
    }
    #[cfg(not(feature = "std"))]
    {
        use core::fmt::Write;

        let mut out = PositionName::new();
        write!(out, "{}", name).map_err(|_| PositionError::NameTooLong)?;
        Ok(out)
    }
}

/// Durable storage for a [`PositionRecord`].
pub trait PositionStore {
    /// Read the stored record.
    ///
    /// Returns the zero default when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// `StoreError::CorruptState` if stored data cannot be decoded,
    /// `StoreError::Io` if it cannot be read.
    fn load(&mut self) -> Result<PositionRecord>;

    /// Replace the stored record with `record`.
    ///
    /// # Errors
    ///
    /// `StoreError::Io` if the write fails.
    fn save(&mut self, record: &PositionRecord) -> Result<()>;
}

impl<S: PositionStore + ?Sized> PositionStore for &mut S {
    fn load(&mut self) -> Result<PositionRecord> {
        (**self).load()
    }

    fn save(&mut self, record: &PositionRecord) -> Result<()> {
        (**self).save(record)
    }
}
