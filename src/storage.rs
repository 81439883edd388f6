use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::config::BatchConfig;
use crate::constants::HISTORY_DATE_FORMAT;
use crate::error::{ExtractError, Result};

/// How a sink handled a snapshot payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// A historical snapshot for the date already exists with identical content
    Unchanged,
    /// A historical snapshot for the date already exists with different content and was kept
    Preserved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotWrite {
    pub location: String,
    /// sha256 of the payload, hex encoded
    pub digest: String,
    pub status: WriteStatus,
}

/// Destination for the two per-run snapshots
pub trait SnapshotStore {
    /// Replaces the current snapshot.
    fn write_current(&self, payload: &[u8]) -> Result<SnapshotWrite>;

    /// Stores the snapshot for `run_date` unless one already exists.
    fn write_historical(&self, run_date: NaiveDate, payload: &[u8]) -> Result<SnapshotWrite>;
}

pub fn payload_digest(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// `<DD-MM-YY>_<suffix>.json`
pub fn historical_file_name(run_date: NaiveDate, suffix: &str) -> String {
    format!("{}_{}.json", run_date.format(HISTORY_DATE_FORMAT), suffix)
}

/// Filesystem sinks. Every write goes to a temp file in the target directory and is
/// renamed into place, so readers never observe a partial snapshot.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    current_path: PathBuf,
    history_dir: PathBuf,
    history_suffix: String,
}

impl FsSnapshotStore {
    pub fn new(current_path: PathBuf, history_dir: PathBuf, history_suffix: String) -> Self {
        Self {
            current_path,
            history_dir,
            history_suffix,
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(
            config.output_file.clone(),
            config.history_dir.clone(),
            config.history_suffix.clone(),
        )
    }

    pub fn historical_path(&self, run_date: NaiveDate) -> PathBuf {
        self.history_dir
            .join(historical_file_name(run_date, &self.history_suffix))
    }

    fn stage(path: &Path, payload: &[u8]) -> Result<tempfile::NamedTempFile> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
        staged.write_all(payload)?;
        staged.as_file().sync_all()?;
        Ok(staged)
    }
}

fn snapshot_error(path: &Path, err: impl std::fmt::Display) -> ExtractError {
    ExtractError::Snapshot {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn write_current(&self, payload: &[u8]) -> Result<SnapshotWrite> {
        let staged = Self::stage(&self.current_path, payload)?;
        staged
            .persist(&self.current_path)
            .map_err(|e| snapshot_error(&self.current_path, e))?;
        let digest = payload_digest(payload);
        debug!(digest = %digest, "Wrote current snapshot to {}", self.current_path.display());

        Ok(SnapshotWrite {
            location: self.current_path.to_string_lossy().to_string(),
            digest,
            status: WriteStatus::Written,
        })
    }

    fn write_historical(&self, run_date: NaiveDate, payload: &[u8]) -> Result<SnapshotWrite> {
        let path = self.historical_path(run_date);
        let digest = payload_digest(payload);
        let location = path.to_string_lossy().to_string();

        if path.exists() {
            let existing = fs::read(&path)?;
            let status = if payload_digest(&existing) == digest {
                WriteStatus::Unchanged
            } else {
                warn!(
                    existing_digest = %payload_digest(&existing),
                    digest = %digest,
                    "Historical snapshot {} already exists with different content; keeping it",
                    location
                );
                WriteStatus::Preserved
            };
            return Ok(SnapshotWrite { location, digest, status });
        }

        let staged = Self::stage(&path, payload)?;
        staged
            .persist_noclobber(&path)
            .map_err(|e| snapshot_error(&path, e))?;
        debug!(digest = %digest, "Wrote historical snapshot to {}", location);

        Ok(SnapshotWrite {
            location,
            digest,
            status: WriteStatus::Written,
        })
    }
}

/// In-memory sinks for development/testing
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    current: Mutex<Option<Vec<u8>>>,
    historical: Mutex<BTreeMap<NaiveDate, Vec<u8>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Vec<u8>> {
        self.current.lock().ok().and_then(|c| c.clone())
    }

    pub fn historical(&self, run_date: NaiveDate) -> Option<Vec<u8>> {
        self.historical
            .lock()
            .ok()
            .and_then(|h| h.get(&run_date).cloned())
    }
}

fn poisoned(what: &str) -> ExtractError {
    ExtractError::Snapshot {
        path: format!("memory:{what}"),
        message: "lock poisoned".to_string(),
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn write_current(&self, payload: &[u8]) -> Result<SnapshotWrite> {
        *self.current.lock().map_err(|_| poisoned("current"))? = Some(payload.to_vec());
        Ok(SnapshotWrite {
            location: "memory:current".to_string(),
            digest: payload_digest(payload),
            status: WriteStatus::Written,
        })
    }

    fn write_historical(&self, run_date: NaiveDate, payload: &[u8]) -> Result<SnapshotWrite> {
        let mut historical = self.historical.lock().map_err(|_| poisoned("historical"))?;
        let digest = payload_digest(payload);
        let status = match historical.get(&run_date) {
            Some(existing) if payload_digest(existing) == digest => WriteStatus::Unchanged,
            Some(_) => WriteStatus::Preserved,
            None => {
                historical.insert(run_date, payload.to_vec());
                WriteStatus::Written
            }
        };
        Ok(SnapshotWrite {
            location: format!("memory:{}", run_date.format(HISTORY_DATE_FORMAT)),
            digest,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 12).unwrap()
    }

    #[test]
    fn test_historical_file_name() {
        assert_eq!(historical_file_name(date(), "event_details"), "12-07-25_event_details.json");
    }

    #[test]
    fn test_current_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(
            dir.path().join("out").join("current.json"),
            dir.path().join("history"),
            "event_details".to_string(),
        );

        store.write_current(b"[1]").unwrap();
        let write = store.write_current(b"[2]").unwrap();
        assert_eq!(write.status, WriteStatus::Written);
        assert_eq!(fs::read(dir.path().join("out").join("current.json")).unwrap(), b"[2]");
    }

    #[test]
    fn test_historical_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(
            dir.path().join("current.json"),
            dir.path().join("history"),
            "event_details".to_string(),
        );

        assert_eq!(store.write_historical(date(), b"[1]").unwrap().status, WriteStatus::Written);
        assert_eq!(store.write_historical(date(), b"[1]").unwrap().status, WriteStatus::Unchanged);
        assert_eq!(store.write_historical(date(), b"[9]").unwrap().status, WriteStatus::Preserved);
        assert_eq!(fs::read(store.historical_path(date())).unwrap(), b"[1]");

        // no stray temp files left behind
        let entries: Vec<_> = fs::read_dir(dir.path().join("history")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_in_memory_store_mirrors_fs_semantics() {
        let store = InMemorySnapshotStore::new();
        store.write_current(b"a").unwrap();
        store.write_current(b"b").unwrap();
        assert_eq!(store.current().as_deref(), Some(&b"b"[..]));

        store.write_historical(date(), b"a").unwrap();
        assert_eq!(store.write_historical(date(), b"b").unwrap().status, WriteStatus::Preserved);
        assert_eq!(store.historical(date()).as_deref(), Some(&b"a"[..]));
    }
}
