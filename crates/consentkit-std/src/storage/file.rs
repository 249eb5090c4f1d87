// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! File-based JSON storage backend.
//!
//! [`FileStorage`] persists the consent record to a single JSON file on disk.
//! Every write flushes the file atomically (write-rename) so that a crash
//! mid-write does not corrupt an existing record.
//!
//! ## Layout
//!
//! The JSON file has the shape:
//!
//! ```json
//! {
//!   "cookie_consent": ConsentRecord | null
//! }
//! ```
//!
//! ## Caveats
//!
//! * Every call re-reads the file, so two widget instances sharing a path see
//!   each other's writes.  The last writer wins; there is no locking.
//! * Concurrent access from multiple processes is not synchronised.  Use a
//!   database-backed [`ConsentStorage`] implementation where that matters.

use std::io;
use std::path::{Path, PathBuf};

use consentkit_core::store::{ConsentStorage, StorageError};
use consentkit_core::types::ConsentRecord;
use serde::{Deserialize, Serialize};

/// On-disk shape of the storage file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageSnapshot {
    cookie_consent: Option<ConsentRecord>,
}

/// A file-backed [`ConsentStorage`] implementation that persists the consent
/// record as JSON.
///
/// # Examples
///
/// ```rust,no_run
/// use consentkit_std::FileStorage;
/// use consentkit_core::ConsentStorage;
///
/// let mut storage = FileStorage::new("/tmp/consent.json");
/// assert!(storage.read().unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a storage backed by `path`.  The file is not touched until the
    /// first read or write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path this storage reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_snapshot(&self) -> Result<StorageSnapshot, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(StorageSnapshot::default());
            }
            Err(error) => {
                return Err(StorageError::Unavailable(format!(
                    "cannot read {}: {error}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&raw).map_err(|error| {
            StorageError::Malformed(format!(
                "consent storage JSON parse error in {}: {error}",
                self.path.display()
            ))
        })
    }

    /// Flush a snapshot to disk using an atomic write-rename.
    ///
    /// The file is written to `<path>.tmp` first, then renamed over the
    /// target, so a crash during the write never leaves a partial file.
    fn flush(&self, snapshot: &StorageSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(snapshot).map_err(|error| {
            StorageError::Malformed(format!("consent record serialisation error: {error}"))
        })?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json).map_err(|error| {
            StorageError::Unavailable(format!(
                "cannot write {}: {error}",
                tmp_path.display()
            ))
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|error| {
            StorageError::Unavailable(format!(
                "cannot rename {} over {}: {error}",
                tmp_path.display(),
                self.path.display()
            ))
        })
    }
}

impl ConsentStorage for FileStorage {
    fn read(&self) -> Result<Option<ConsentRecord>, StorageError> {
        Ok(self.load_snapshot()?.cookie_consent)
    }

    fn write(&mut self, record: &ConsentRecord) -> Result<(), StorageError> {
        let snapshot = StorageSnapshot {
            cookie_consent: Some(record.clone()),
        };
        self.flush(&snapshot)
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::Unavailable(format!(
                "cannot remove {}: {error}",
                self.path.display()
            ))),
        }
    }
}
