//! JSON file position store (std only).

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{truncated, Result, StoreError};

use super::{PositionRecord, PositionStore};

/// Default state file name.
pub const DEFAULT_STATE_FILE: &str = "motor_position.json";

/// Position store backed by a JSON file.
///
/// Every save writes the full record to `<path>.tmp`, syncs it and renames
/// it over `path`, so a crash mid-write leaves the previous state intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the file at `path`. Nothing is read until `load`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

impl PositionStore for JsonFileStore {
    fn load(&mut self) -> Result<PositionRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no state file at {}, starting at zero", self.path.display());
                return Ok(PositionRecord::default());
            }
            Err(e) => return Err(io_error(&self.path, &e).into()),
        };

        let record: PositionRecord = serde_json::from_str(&content).map_err(|e| {
            let msg = format!("{}: {}", self.path.display(), e);
            StoreError::CorruptState(truncated(&msg))
        })?;

        log::debug!(
            "loaded state from {}: position {}, home {}, {} named",
            self.path.display(),
            record.current_position,
            record.home_position,
            record.saved_positions.len()
        );
        Ok(record)
    }

    fn save(&mut self, record: &PositionRecord) -> Result<()> {
        let data = serde_json::to_vec(record).map_err(|e| StoreError::Io(truncated(&e.to_string())))?;
        let tmp = self.temp_path();

        let mut file = File::create(&tmp).map_err(|e| io_error(&tmp, &e))?;
        file.write_all(&data).map_err(|e| io_error(&tmp, &e))?;
        file.sync_all().map_err(|e| io_error(&tmp, &e))?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, &e))?;

        log::debug!("saved state to {}", self.path.display());
        Ok(())
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> StoreError {
    StoreError::Io(truncated(&format!("{}: {}", path.display(), e)))
}
