// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! Shared data types used across all consent sub-systems.
//!
//! All types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`] so they can be serialised to JSON, stored, and
//! transmitted across WASM boundaries without additional conversion steps.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Schema version stamped on every persisted [`ConsentRecord`].
pub const CONSENT_VERSION: &str = "1.0.0";

/// Fixed key under which the consent record is persisted.
pub const STORAGE_KEY: &str = "cookie_consent";

/// One day in milliseconds; expiry arithmetic is done in epoch ms.
pub const DAY_MS: u64 = 86_400_000;

/// Canonical category names recognised by the signal mapping.
pub const CATEGORY_NECESSARY: &str = "necessary";
pub const CATEGORY_ANALYTICS: &str = "analytics";
pub const CATEGORY_MARKETING: &str = "marketing";
pub const CATEGORY_PERSONALIZATION: &str = "personalization";

/// Mapping category-name → granted flag.
pub type CategoryMap = HashMap<String, bool>;

// ---------------------------------------------------------------------------
// Consent actions
// ---------------------------------------------------------------------------

/// The three user decisions that can produce a [`ConsentRecord`].
///
/// There is no other transition; partial acceptance only exists through an
/// explicit [`SavePreferences`](ConsentAction::SavePreferences).
///
/// # Examples
///
/// ```rust
/// use consentkit_core::types::ConsentAction;
///
/// assert_eq!(ConsentAction::AcceptAll.as_str(), "accept_all");
/// assert_eq!(ConsentAction::DeclineAll.as_str(), "decline_all");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentAction {
    /// Every configured category granted.
    AcceptAll,
    /// Every category reduced to its read-only flag value.
    DeclineAll,
    /// Category values taken verbatim from the user's selection.
    SavePreferences,
}

impl ConsentAction {
    /// The wire tag used in persisted records and forwarded events.
    pub fn as_str(self) -> &'static str {
        match self {
            ConsentAction::AcceptAll       => "accept_all",
            ConsentAction::DeclineAll      => "decline_all",
            ConsentAction::SavePreferences => "save_preferences",
        }
    }
}

// ---------------------------------------------------------------------------
// Consent record
// ---------------------------------------------------------------------------

/// The single persisted consent decision.
///
/// Created on a user decision, superseded by any new decision, deleted on an
/// explicit reset.  Every key in `categories` corresponds to a configured
/// category; read-only categories are always `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Schema version ([`CONSENT_VERSION`] at creation time).
    pub version: String,
    /// Unix epoch milliseconds at which the decision was made.
    pub timestamp_ms: u64,
    /// Which user action produced this record.
    pub action: ConsentAction,
    /// Resolved category decisions.
    pub categories: CategoryMap,
    /// Client user agent, when the embedder supplied one.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Language active at decision time.
    #[serde(default)]
    pub language: String,
}

impl ConsentRecord {
    /// Age of this record relative to `now_ms`, saturating at zero for
    /// records stamped in the future (clock skew across tabs).
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp_ms)
    }

    /// Whether this record is still fresh at `now_ms`.
    ///
    /// A record is valid iff it carries a timestamp and
    /// `now - timestamp < expiry_days * 86_400_000`.  This is a pure
    /// function of wall-clock time; callers recompute it on every read.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use consentkit_core::types::{ConsentAction, ConsentRecord, DAY_MS};
    ///
    /// let record = ConsentRecord {
    ///     version: "1.0.0".into(),
    ///     timestamp_ms: 1_000,
    ///     action: ConsentAction::AcceptAll,
    ///     categories: Default::default(),
    ///     user_agent: None,
    ///     language: "en".into(),
    /// };
    ///
    /// assert!(record.is_valid_at(365, 1_000 + 365 * DAY_MS - 1));
    /// assert!(!record.is_valid_at(365, 1_000 + 365 * DAY_MS));
    /// ```
    pub fn is_valid_at(&self, expiry_days: u32, now_ms: u64) -> bool {
        self.timestamp_ms != 0 && self.age_ms(now_ms) < u64::from(expiry_days) * DAY_MS
    }

    /// Names of the categories this record grants, sorted for determinism.
    pub fn granted(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .categories
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// Consent signals
// ---------------------------------------------------------------------------

/// One slot of the outbound consent-signal vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    /// The storage permission is granted.
    Granted,
    /// The storage permission is denied.
    Denied,
}

impl SignalState {
    /// Map a category grant flag to a signal state.
    pub fn from_bool(granted: bool) -> Self {
        if granted { SignalState::Granted } else { SignalState::Denied }
    }

    /// `true` for [`SignalState::Granted`].
    pub fn is_granted(self) -> bool {
        matches!(self, SignalState::Granted)
    }
}

/// The five-slot granted/denied vector consumed by external measurement
/// platforms via the two-phase (`default`, `update`) signal protocol.
///
/// # Examples
///
/// ```rust
/// use consentkit_core::types::{CategoryMap, ConsentSignals, SignalState};
///
/// let mut categories = CategoryMap::new();
/// categories.insert("necessary".into(), true);
/// categories.insert("analytics".into(), true);
/// categories.insert("marketing".into(), false);
/// categories.insert("personalization".into(), false);
///
/// let signals = ConsentSignals::from_categories(&categories);
/// assert_eq!(signals.ad_storage, SignalState::Denied);
/// assert_eq!(signals.analytics_storage, SignalState::Granted);
/// assert_eq!(signals.functionality_storage, SignalState::Granted);
/// assert_eq!(signals.personalization_storage, SignalState::Denied);
/// assert_eq!(signals.security_storage, SignalState::Granted);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSignals {
    /// Advertising storage — driven by the `marketing` category.
    pub ad_storage: SignalState,
    /// Analytics storage — driven by the `analytics` category.
    pub analytics_storage: SignalState,
    /// Functionality storage — driven by the `necessary` category.
    pub functionality_storage: SignalState,
    /// Personalization storage — driven by the `personalization` category.
    pub personalization_storage: SignalState,
    /// Security storage — always granted.
    pub security_storage: SignalState,
}

impl ConsentSignals {
    /// The conservative pre-consent vector: everything denied except
    /// security storage.
    pub fn all_denied() -> Self {
        Self {
            ad_storage:              SignalState::Denied,
            analytics_storage:       SignalState::Denied,
            functionality_storage:   SignalState::Denied,
            personalization_storage: SignalState::Denied,
            security_storage:        SignalState::Granted,
        }
    }

    /// Map resolved category decisions onto the signal vocabulary.
    ///
    /// Categories absent from the map are treated as not granted.
    pub fn from_categories(categories: &CategoryMap) -> Self {
        let granted = |name: &str| categories.get(name).copied().unwrap_or(false);
        Self {
            ad_storage:              SignalState::from_bool(granted(CATEGORY_MARKETING)),
            analytics_storage:       SignalState::from_bool(granted(CATEGORY_ANALYTICS)),
            functionality_storage:   SignalState::from_bool(granted(CATEGORY_NECESSARY)),
            personalization_storage: SignalState::from_bool(granted(CATEGORY_PERSONALIZATION)),
            security_storage:        SignalState::Granted,
        }
    }
}

impl Default for ConsentSignals {
    fn default() -> Self {
        Self::all_denied()
    }
}

// ---------------------------------------------------------------------------
// Consent events
// ---------------------------------------------------------------------------

/// Payload forwarded to the signal sink when consent recording is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentEvent {
    /// The user action that produced the decision.
    pub action: ConsentAction,
    /// Names of the categories that were granted.
    pub granted: Vec<String>,
    /// Unix epoch milliseconds of the decision.
    pub timestamp_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(timestamp_ms: u64) -> ConsentRecord {
        ConsentRecord {
            version: CONSENT_VERSION.into(),
            timestamp_ms,
            action: ConsentAction::AcceptAll,
            categories: CategoryMap::new(),
            user_agent: None,
            language: "en".into(),
        }
    }

    #[test]
    fn validity_is_strict_at_the_expiry_boundary() {
        let record = record_at(10);
        assert!(record.is_valid_at(1, 10 + DAY_MS - 1));
        assert!(!record.is_valid_at(1, 10 + DAY_MS));
    }

    #[test]
    fn zero_timestamp_is_never_valid() {
        let record = record_at(0);
        assert!(!record.is_valid_at(365, 0));
    }

    #[test]
    fn future_timestamp_is_still_valid() {
        // Another tab with a slightly ahead clock may have written the record.
        let record = record_at(5_000);
        assert!(record.is_valid_at(1, 1_000));
    }

    #[test]
    fn signal_vector_matches_the_fixed_mapping() {
        let mut categories = CategoryMap::new();
        categories.insert(CATEGORY_ANALYTICS.into(), true);
        categories.insert(CATEGORY_MARKETING.into(), false);
        categories.insert(CATEGORY_NECESSARY.into(), true);
        categories.insert(CATEGORY_PERSONALIZATION.into(), false);

        let signals = ConsentSignals::from_categories(&categories);
        assert_eq!(signals.ad_storage, SignalState::Denied);
        assert_eq!(signals.analytics_storage, SignalState::Granted);
        assert_eq!(signals.functionality_storage, SignalState::Granted);
        assert_eq!(signals.personalization_storage, SignalState::Denied);
        assert_eq!(signals.security_storage, SignalState::Granted);
    }

    #[test]
    fn all_denied_keeps_security_granted() {
        let signals = ConsentSignals::all_denied();
        assert_eq!(signals.security_storage, SignalState::Granted);
        assert_eq!(signals.ad_storage, SignalState::Denied);
    }

    #[test]
    fn record_serialises_with_snake_case_action_tags() {
        let record = record_at(42);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"accept_all\""));

        let restored: ConsentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn signal_states_serialise_lowercase() {
        let json = serde_json::to_string(&ConsentSignals::all_denied()).unwrap();
        assert!(json.contains("\"ad_storage\":\"denied\""));
        assert!(json.contains("\"security_storage\":\"granted\""));
    }

    #[test]
    fn granted_names_are_sorted() {
        let mut record = record_at(1);
        record.categories.insert("marketing".into(), true);
        record.categories.insert("analytics".into(), true);
        record.categories.insert("personalization".into(), false);
        assert_eq!(record.granted(), ["analytics", "marketing"]);
    }
}
