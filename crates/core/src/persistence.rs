//! Saved measurements
//!
//! The session hands finished measurements to a [`MeasurementStore`]. Two
//! stores ship with the crate: [`MemoryStore`] for hosts that sync elsewhere
//! and [`JsonFileStore`], which keeps a versioned JSON history on disk.

use crate::derive::DerivedMeasurement;
use crate::mode::Mode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const HISTORY_SCHEMA_VERSION: u32 = 1;

/// Error types for measurement stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No store is attached to the session
    #[error("no measurement store attached")]
    Unavailable,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported history version {0}")]
    UnsupportedVersion(u32),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A measurement as handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub mode: Mode,
    pub derived: DerivedMeasurement,
    /// Object label; only volume measurements keep it, otherwise empty
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub project_id: Option<String>,
}

impl MeasurementRecord {
    /// Build a record stamped with the current time
    pub fn new(
        mode: Mode,
        derived: DerivedMeasurement,
        label: &str,
        project_id: Option<String>,
    ) -> Self {
        Self::at(mode, derived, label, project_id, Utc::now())
    }

    /// Build a record with an explicit timestamp
    pub fn at(
        mode: Mode,
        derived: DerivedMeasurement,
        label: &str,
        project_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let label = if mode == Mode::Volume {
            label.to_string()
        } else {
            String::new()
        };
        Self {
            mode,
            derived,
            label,
            timestamp,
            project_id,
        }
    }
}

/// Persistence collaborator
pub trait MeasurementStore: Send {
    /// Persist one record
    fn save(&mut self, record: MeasurementRecord) -> StoreResult<()>;

    /// Everything saved so far, oldest first
    fn load_all(&self) -> StoreResult<Vec<MeasurementRecord>>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<MeasurementRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }
}

impl MeasurementStore for MemoryStore {
    fn save(&mut self, record: MeasurementRecord) -> StoreResult<()> {
        self.records.push(record);
        Ok(())
    }

    fn load_all(&self) -> StoreResult<Vec<MeasurementRecord>> {
        Ok(self.records.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryEnvelope {
    version: u32,
    records: Vec<MeasurementRecord>,
}

/// Store that keeps the history in `measurements.json` under a root directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn history_path(&self) -> PathBuf {
        self.root.join("measurements.json")
    }
}

impl MeasurementStore for JsonFileStore {
    fn save(&mut self, record: MeasurementRecord) -> StoreResult<()> {
        let mut records = self.load_all()?;
        records.push(record);

        fs::create_dir_all(&self.root)?;
        let envelope = HistoryEnvelope {
            version: HISTORY_SCHEMA_VERSION,
            records,
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.history_path(), bytes)?;
        log::debug!("Saved measurement to {}", self.history_path().display());
        Ok(())
    }

    fn load_all(&self) -> StoreResult<Vec<MeasurementRecord>> {
        let path = self.history_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(path)?;
        let envelope: HistoryEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != HISTORY_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion(envelope.version));
        }
        Ok(envelope.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(mode: Mode) -> MeasurementRecord {
        MeasurementRecord::at(
            mode,
            DerivedMeasurement::new("10.0x20.0", "H: 5.0", "1000.00 cm³ | Standard"),
            "Package #1",
            Some("proj-7".to_string()),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn label_only_kept_for_volume() {
        assert_eq!(record(Mode::Volume).label, "Package #1");
        assert_eq!(record(Mode::Distance).label, "");
    }

    #[test]
    fn memory_store_keeps_order() {
        let mut store = MemoryStore::new();
        store.save(record(Mode::Volume)).unwrap();
        store.save(record(Mode::Area)).unwrap();
        let modes: Vec<Mode> = store.records().iter().map(|r| r.mode).collect();
        assert_eq!(modes, vec![Mode::Volume, Mode::Area]);
    }

    #[test]
    fn file_store_appends() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = JsonFileStore::with_root(temp.path().join("history"));
        assert!(store.load_all().unwrap().is_empty());

        store.save(record(Mode::Volume)).expect("save should succeed");
        store.save(record(Mode::Room)).expect("save should succeed");

        let loaded = JsonFileStore::with_root(store.root()).load_all().unwrap();
        assert_eq!(loaded, vec![record(Mode::Volume), record(Mode::Room)]);
    }

    #[test]
    fn file_store_rejects_unknown_version() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        fs::write(
            temp.path().join("measurements.json"),
            r#"{"version": 99, "records": []}"#,
        )
        .unwrap();
        let store = JsonFileStore::with_root(temp.path());
        assert!(matches!(store.load_all(), Err(StoreError::UnsupportedVersion(99))));
    }
}
