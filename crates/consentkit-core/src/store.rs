// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! Consent persistence.
//!
//! The [`ConsentStorage`] trait is the single interface between the consent
//! store and any persistence layer.  This crate ships [`InMemoryStorage`]
//! for testing and WASM environments; file-based persistence lives in the
//! `consentkit-std` crate so that this core crate remains `no_std`.
//!
//! [`ConsentStore`] layers the record lifecycle on top of a backend:
//!
//! * [`load`](ConsentStore::load)   — read the persisted decision, if any
//! * [`is_valid`](ConsentStore::is_valid) — freshness check against expiry
//! * [`save`](ConsentStore::save)   — persist a new decision
//! * [`reset`](ConsentStore::reset) — delete the persisted decision
//!
//! Nothing in this module is fatal.  A backend failure degrades to "no
//! consent on file" (read) or a `false` return (write); it is logged and
//! never propagated to the page.

use alloc::borrow::ToOwned;
use alloc::string::String;
use core::fmt;

use log::warn;

use crate::types::{CategoryMap, ConsentAction, ConsentRecord, CONSENT_VERSION};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure modes of a [`ConsentStorage`] backend.
///
/// Both variants are recovered locally by [`ConsentStore`]; they exist so
/// that backends can report *why* an operation failed and tests can assert
/// on the distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store could not be read or written (unavailable, full,
    /// permission denied, ...).
    Unavailable(String),
    /// A persisted record exists but could not be parsed.
    Malformed(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            StorageError::Malformed(reason) => write!(f, "malformed consent record: {reason}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

// ---------------------------------------------------------------------------
// ConsentStorage trait
// ---------------------------------------------------------------------------

/// Pluggable persistence interface for the single consent record.
///
/// Implementations MUST be `Send + Sync` so a widget can be shared across
/// threads when wrapped in `Arc<Mutex<...>>`.
///
/// # Implementing `ConsentStorage`
///
/// ```rust,no_run
/// use consentkit_core::store::{ConsentStorage, StorageError};
/// use consentkit_core::types::ConsentRecord;
///
/// struct MyStorage;
///
/// impl ConsentStorage for MyStorage {
///     fn read(&self) -> Result<Option<ConsentRecord>, StorageError> {
///         Ok(None) // read from your backend
///     }
///     fn write(&mut self, _record: &ConsentRecord) -> Result<(), StorageError> {
///         Ok(())
///     }
///     fn remove(&mut self) -> Result<(), StorageError> {
///         Ok(())
///     }
/// }
/// ```
pub trait ConsentStorage: Send + Sync {
    /// Read the persisted record, `Ok(None)` when nothing is stored.
    fn read(&self) -> Result<Option<ConsentRecord>, StorageError>;

    /// Persist `record`, overwriting any previous decision.
    fn write(&mut self, record: &ConsentRecord) -> Result<(), StorageError>;

    /// Delete the persisted record; deleting an absent record is a no-op.
    fn remove(&mut self) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// InMemoryStorage
// ---------------------------------------------------------------------------

/// A volatile [`ConsentStorage`] implementation.
///
/// All data lives in process memory and is lost when the widget is dropped.
/// Suitable for tests and WASM environments where persistent storage is
/// managed outside the engine.
///
/// # Examples
///
/// ```rust
/// use consentkit_core::store::{ConsentStorage, InMemoryStorage};
///
/// let store = InMemoryStorage::new();
/// assert!(store.read().unwrap().is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    record: Option<ConsentRecord>,
}

impl InMemoryStorage {
    /// Create a new, empty [`InMemoryStorage`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConsentStorage for InMemoryStorage {
    fn read(&self) -> Result<Option<ConsentRecord>, StorageError> {
        Ok(self.record.clone())
    }

    fn write(&mut self, record: &ConsentRecord) -> Result<(), StorageError> {
        self.record = Some(record.clone());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        self.record = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ConsentStore
// ---------------------------------------------------------------------------

/// Record lifecycle on top of a [`ConsentStorage`] backend.
///
/// The store keeps an in-memory cache of the last loaded or saved record so
/// that `has_consent`-style queries do not hit the backend on every call.
/// Freshness ([`is_valid`](Self::is_valid)) is recomputed from wall-clock
/// time on every read, never cached.
///
/// # Examples
///
/// ```rust
/// use consentkit_core::store::{ConsentStore, InMemoryStorage};
/// use consentkit_core::types::{CategoryMap, ConsentAction};
///
/// let mut store = ConsentStore::new(InMemoryStorage::new());
///
/// let mut categories = CategoryMap::new();
/// categories.insert("necessary".into(), true);
/// categories.insert("analytics".into(), false);
///
/// assert!(store.save(categories, ConsentAction::SavePreferences, "en", None));
/// assert!(store.is_valid(365));
///
/// store.reset();
/// assert!(store.load().is_none());
/// ```
pub struct ConsentStore<S: ConsentStorage> {
    storage: S,
    cached: Option<ConsentRecord>,
}

impl<S: ConsentStorage> ConsentStore<S> {
    /// Create a store over `storage` with an empty cache.
    ///
    /// Call [`load`](Self::load) to populate the cache from the backend.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cached: None,
        }
    }

    /// Read the persisted record into the cache and return it.
    ///
    /// Returns `None` when nothing is stored or the stored record is
    /// unparsable; the failure is logged as a warning, never surfaced.
    pub fn load(&mut self) -> Option<&ConsentRecord> {
        match self.storage.read() {
            Ok(record) => self.cached = record,
            Err(error) => {
                warn!("failed to load consent record: {error}");
                self.cached = None;
            }
        }
        self.cached.as_ref()
    }

    /// Borrow the cached record, if any.
    pub fn record(&self) -> Option<&ConsentRecord> {
        self.cached.as_ref()
    }

    /// Whether a cached record exists and is younger than `expiry_days`.
    ///
    /// Pure function of wall-clock time; recomputed on every call.
    pub fn is_valid(&self, expiry_days: u32) -> bool {
        self.cached
            .as_ref()
            .map(|record| record.is_valid_at(expiry_days, current_time_ms()))
            .unwrap_or(false)
    }

    /// Persist a new decision, superseding any previous record.
    ///
    /// Builds a fresh [`ConsentRecord`] with the current timestamp and the
    /// given action tag.  Returns `true` on success; a backend failure is
    /// caught, logged, and reported as `false` — it never panics and never
    /// propagates.  The cache is only updated on success.
    pub fn save(
        &mut self,
        categories: CategoryMap,
        action: ConsentAction,
        language: &str,
        user_agent: Option<&str>,
    ) -> bool {
        let record = ConsentRecord {
            version: CONSENT_VERSION.into(),
            timestamp_ms: current_time_ms(),
            action,
            categories,
            user_agent: user_agent.map(ToOwned::to_owned),
            language: language.into(),
        };

        match self.storage.write(&record) {
            Ok(()) => {
                self.cached = Some(record);
                true
            }
            Err(error) => {
                warn!("failed to persist consent record: {error}");
                false
            }
        }
    }

    /// Delete the persisted record and clear the cache.
    ///
    /// A backend failure is logged; the cache is cleared either way so the
    /// session behaves as if no consent is on file.
    pub fn reset(&mut self) {
        if let Err(error) = self.storage.remove() {
            warn!("failed to delete consent record: {error}");
        }
        self.cached = None;
    }

    /// Borrow the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrow the underlying storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return current Unix epoch milliseconds.
///
/// In `std` mode this delegates to [`std::time::SystemTime`].
/// In `no_std` mode it returns `0` — embedders on such targets should treat
/// freshness via [`ConsentRecord::is_valid_at`] with an injected clock.
pub(crate) fn current_time_ms() -> u64 {
    #[cfg(feature = "std")]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
    #[cfg(not(feature = "std"))]
    {
        0
    }
}
