//! JSON file snapshot store.
//!
//! One file, one snapshot. Saving replaces the whole file; loading tolerates
//! absence and corruption by returning `None` so a damaged file never takes
//! the pipeline down.

use super::SnapshotStore;
use crate::config::StorageConfig;
use crate::models::MemoryOutput;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Schema version written into the snapshot envelope.
const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Versioned on-disk envelope around the memory output.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    schema_version: u32,
    saved_at: DateTime<Utc>,
    memory: MemoryOutput,
}

/// [`SnapshotStore`] backed by a single JSON file.
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// Creates a store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store from storage configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.snapshot_path)
    }

    /// Returns the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn save(&self, output: &MemoryOutput) -> Result<()> {
        let envelope = StoredSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: Utc::now(),
            memory: output.clone(),
        };

        let json = serde_json::to_string_pretty(&envelope).map_err(|e| {
            Error::OperationFailed {
                operation: "snapshot_save".to_string(),
                cause: format!("serialization failed: {e}"),
            }
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                    operation: "snapshot_save".to_string(),
                    cause: format!("cannot create {}: {e}", parent.display()),
                })?;
            }
        }

        fs::write(&self.path, json).map_err(|e| Error::OperationFailed {
            operation: "snapshot_save".to_string(),
            cause: format!("cannot write {}: {e}", self.path.display()),
        })?;

        tracing::debug!(path = %self.path.display(), "Saved memory snapshot");
        Ok(())
    }

    fn load(&self) -> Result<Option<MemoryOutput>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "snapshot_load".to_string(),
                    cause: format!("cannot read {}: {e}", self.path.display()),
                });
            }
        };

        match serde_json::from_str::<StoredSnapshot>(&raw) {
            Ok(envelope) if envelope.schema_version == SNAPSHOT_SCHEMA_VERSION => {
                Ok(Some(envelope.memory))
            }
            Ok(envelope) => {
                tracing::warn!(
                    path = %self.path.display(),
                    version = envelope.schema_version,
                    "Ignoring snapshot with unknown schema version"
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring corrupt memory snapshot"
                );
                Ok(None)
            }
        }
    }
}
