// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! The consent widget facade — the top-level composition of all components.
//!
//! [`ConsentWidget`] owns the configuration, the [`ConsentStore`], and the
//! [`ConsentApplier`], and exposes the contract the presentation layer calls
//! into.  It is an explicit instance object constructed from a
//! [`ConsentConfig`]; there is no ambient singleton.
//!
//! ## Decision pipeline
//!
//! Every user decision runs the same sequential, non-configurable pipeline:
//!
//! 1. compute the resolved category map for the action
//! 2. persist via the store (failure degrades to `false`, never a panic)
//! 3. forward a [`ConsentEvent`] when consent recording is enabled
//! 4. propagate via the applier (signal update → trackers → change hook)
//! 5. lower the banner visibility flag
//! 6. invoke the action-specific hook
//!
//! Dismissing the banner without saving persists nothing; the in-memory
//! draft selection is the presentation layer's to discard.

use alloc::boxed::Box;
use alloc::string::String;

use crate::apply::ConsentApplier;
use crate::config::{ConsentConfig, ConsentOverrides};
use crate::gate::CookieGate;
use crate::store::{ConsentStorage, ConsentStore};
use crate::types::{CategoryMap, ConsentAction, ConsentEvent, ConsentRecord, ConsentSignals};

/// Action-specific caller callbacks.
///
/// Each hook receives the resolved category map of the decision that fired
/// it.  All hooks are optional.
#[derive(Default)]
pub struct ConsentHooks {
    pub on_accept: Option<Box<dyn FnMut(&CategoryMap) + Send>>,
    pub on_decline: Option<Box<dyn FnMut(&CategoryMap) + Send>>,
    pub on_save: Option<Box<dyn FnMut(&CategoryMap) + Send>>,
}

/// The consent widget core.
///
/// Generic over `S: ConsentStorage` so it can operate with any persistence
/// backend — from the built-in
/// [`InMemoryStorage`](crate::store::InMemoryStorage) to the file-backed
/// store in `consentkit-std`.
///
/// # Examples
///
/// ```rust
/// use consentkit_core::{
///     config::ConsentConfig,
///     store::InMemoryStorage,
///     types::ConsentAction,
///     widget::ConsentWidget,
/// };
///
/// let mut widget = ConsentWidget::new(ConsentConfig::default(), InMemoryStorage::new());
///
/// // Fresh visitor: no consent on file, banner requested.
/// assert!(widget.should_show());
/// assert!(widget.is_visible());
///
/// widget.accept_all();
///
/// assert!(!widget.should_show());
/// assert!(!widget.is_visible());
/// assert!(widget.has_consent("analytics"));
/// assert_eq!(widget.get_consent().unwrap().action, ConsentAction::AcceptAll);
/// ```
pub struct ConsentWidget<S: ConsentStorage> {
    config: ConsentConfig,
    /// Record lifecycle over the injected backend.
    pub store: ConsentStore<S>,
    /// Downstream propagation.
    pub applier: ConsentApplier,
    /// Action-specific caller callbacks.
    pub hooks: ConsentHooks,
    user_agent: Option<String>,
    visible: bool,
}

impl<S: ConsentStorage> ConsentWidget<S> {
    /// Construct a widget with no-op integrations and no hooks.
    pub fn new(config: ConsentConfig, storage: S) -> Self {
        Self::with_parts(config, storage, ConsentApplier::new(), ConsentHooks::default())
    }

    /// Construct a widget from pre-built parts.
    ///
    /// Construction loads the persisted record; when `google_consent_mode`
    /// is on, the two-phase `default` signal is emitted from
    /// `config.default_consent_state`.  A valid existing record is applied
    /// immediately; otherwise, when `auto_show` is on, the banner
    /// visibility flag is raised.
    pub fn with_parts(
        config: ConsentConfig,
        storage: S,
        applier: ConsentApplier,
        hooks: ConsentHooks,
    ) -> Self {
        let mut widget = Self {
            config,
            store: ConsentStore::new(storage),
            applier,
            hooks,
            user_agent: None,
            visible: false,
        };

        widget.store.load();

        if widget.config.google_consent_mode {
            widget.applier.signal_default(&widget.config.default_consent_state);
        }

        if widget.store.is_valid(widget.config.cookie_expiry_days) {
            let categories = widget
                .store
                .record()
                .map(|record| record.categories.clone());
            if let Some(categories) = categories {
                widget.applier.apply(&categories, widget.config.google_consent_mode);
            }
        } else if widget.config.auto_show {
            widget.visible = true;
        }

        widget
    }

    // ------------------------------------------------------------------
    // Presentation-layer contract
    // ------------------------------------------------------------------

    /// Raise the banner visibility flag.
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Lower the banner visibility flag.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Whether the presentation layer should currently render the banner.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the visitor still needs to be asked (no valid consent on
    /// file).  Recomputed from wall-clock time on every call.
    pub fn should_show(&self) -> bool {
        !self.store.is_valid(self.config.cookie_expiry_days)
    }

    /// Grant every configured category.
    ///
    /// Returns the persistence outcome; propagation and hooks run either
    /// way so the page degrades gracefully when storage is unavailable.
    pub fn accept_all(&mut self) -> bool {
        let categories: CategoryMap = self
            .config
            .categories
            .keys()
            .map(|name| (name.clone(), true))
            .collect();
        self.decide(categories, ConsentAction::AcceptAll)
    }

    /// Decline everything declinable.
    ///
    /// Each category resolves to its `read_only` flag value, so only
    /// categories the user cannot disable stay granted.
    pub fn decline_all(&mut self) -> bool {
        let categories: CategoryMap = self
            .config
            .categories
            .iter()
            .map(|(name, def)| (name.clone(), def.read_only))
            .collect();
        self.decide(categories, ConsentAction::DeclineAll)
    }

    /// Persist the user's explicit selection.
    ///
    /// One boolean per configured category key, taken verbatim from
    /// `selections`; read-only categories are forced to `true`, keys absent
    /// from `selections` resolve to `false`, and unknown keys in
    /// `selections` are dropped.
    pub fn save_preferences(&mut self, selections: &CategoryMap) -> bool {
        let categories: CategoryMap = self
            .config
            .categories
            .iter()
            .map(|(name, def)| {
                let granted =
                    def.read_only || selections.get(name).copied().unwrap_or(false);
                (name.clone(), granted)
            })
            .collect();
        self.decide(categories, ConsentAction::SavePreferences)
    }

    /// The selection the preferences dialog should open with: the persisted
    /// decision where one exists, each category's `enabled` default
    /// otherwise.
    pub fn draft_selection(&self) -> CategoryMap {
        let record = self.store.record();
        self.config
            .categories
            .iter()
            .map(|(name, def)| {
                let granted = record
                    .and_then(|r| r.categories.get(name).copied())
                    .unwrap_or(def.enabled);
                (name.clone(), granted)
            })
            .collect()
    }

    /// The persisted decision, if any.
    pub fn get_consent(&self) -> Option<&ConsentRecord> {
        self.store.record()
    }

    /// Whether `category` was granted; `false` when no decision is on file.
    pub fn has_consent(&self, category: &str) -> bool {
        self.store
            .record()
            .and_then(|record| record.categories.get(category).copied())
            .unwrap_or(false)
    }

    /// The signal vector for the current state: the persisted decision when
    /// one exists, the configured default state otherwise.
    pub fn consent_signals(&self) -> ConsentSignals {
        self.store
            .record()
            .map(|record| ConsentSignals::from_categories(&record.categories))
            .unwrap_or(self.config.default_consent_state)
    }

    /// Delete the persisted decision and ask the visitor again.
    pub fn reset(&mut self) {
        self.store.reset();
        self.visible = true;
    }

    /// Merge a partial configuration into the live one.
    pub fn update_config(&mut self, overrides: &ConsentOverrides) {
        self.config.apply(overrides);
    }

    /// Switch the active language code.
    pub fn set_language(&mut self, code: &str) {
        self.config.language = code.into();
    }

    /// Record the client user agent stamped onto future consent records.
    pub fn set_user_agent(&mut self, user_agent: &str) {
        self.user_agent = Some(user_agent.into());
    }

    /// The live configuration.
    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    /// Decision function for the best-effort cookie-write intercept:
    /// blocking while `block_cookies_before_consent` is on and no valid
    /// consent exists.
    pub fn cookie_gate(&self) -> CookieGate {
        CookieGate::new(self.config.block_cookies_before_consent && self.should_show())
    }

    // ------------------------------------------------------------------
    // Decision pipeline
    // ------------------------------------------------------------------

    fn decide(&mut self, categories: CategoryMap, action: ConsentAction) -> bool {
        let saved = self.store.save(
            categories.clone(),
            action,
            &self.config.language,
            self.user_agent.as_deref(),
        );

        if saved && self.config.record_consent {
            if let Some(record) = self.store.record() {
                let event = ConsentEvent {
                    action,
                    granted: record.granted(),
                    timestamp_ms: record.timestamp_ms,
                };
                self.applier.record_event(&event);
            }
        }

        self.applier.apply(&categories, self.config.google_consent_mode);
        self.visible = false;

        let hook = match action {
            ConsentAction::AcceptAll => self.hooks.on_accept.as_mut(),
            ConsentAction::DeclineAll => self.hooks.on_decline.as_mut(),
            ConsentAction::SavePreferences => self.hooks.on_save.as_mut(),
        };
        if let Some(hook) = hook {
            hook(&categories);
        }

        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::{SignalSink, SinkError};
    use crate::config::CategoryOverride;
    use crate::store::{InMemoryStorage, StorageError};
    use crate::types::SignalState;
    use alloc::vec::Vec;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SignalRecorder {
        defaults: Arc<Mutex<Vec<ConsentSignals>>>,
        updates: Arc<Mutex<Vec<ConsentSignals>>>,
        events: Arc<Mutex<Vec<ConsentEvent>>>,
    }

    impl SignalSink for SignalRecorder {
        fn signal_default(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
            self.defaults.lock().unwrap().push(*signals);
            Ok(())
        }
        fn signal_update(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
            self.updates.lock().unwrap().push(*signals);
            Ok(())
        }
        fn record_event(&mut self, event: &ConsentEvent) -> Result<(), SinkError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn widget() -> ConsentWidget<InMemoryStorage> {
        ConsentWidget::new(ConsentConfig::default(), InMemoryStorage::new())
    }

    #[test]
    fn accept_all_grants_every_configured_category() {
        let mut widget = widget();
        assert!(widget.accept_all());

        let record = widget.get_consent().unwrap();
        assert_eq!(record.action, ConsentAction::AcceptAll);
        assert_eq!(record.categories.len(), widget.config().categories.len());
        assert!(record.categories.values().all(|granted| *granted));
    }

    #[test]
    fn decline_all_keeps_only_read_only_categories() {
        let mut widget = widget();
        assert!(widget.decline_all());

        let record = widget.get_consent().unwrap();
        assert_eq!(record.action, ConsentAction::DeclineAll);
        for (name, def) in &widget.config().categories {
            assert_eq!(record.categories[name], def.read_only, "category {name}");
        }
        assert!(record.categories["necessary"]);
        assert!(!record.categories["analytics"]);
    }

    #[test]
    fn save_preferences_takes_the_selection_verbatim() {
        let mut widget = widget();
        let mut selections = CategoryMap::new();
        selections.insert("analytics".into(), true);
        selections.insert("marketing".into(), false);
        selections.insert("bogus".into(), true); // unknown key, dropped

        assert!(widget.save_preferences(&selections));

        let record = widget.get_consent().unwrap();
        assert_eq!(record.action, ConsentAction::SavePreferences);
        assert!(record.categories["analytics"]);
        assert!(!record.categories["marketing"]);
        assert!(!record.categories["personalization"]); // absent → false
        assert!(record.categories["necessary"]); // read-only forced true
        assert!(!record.categories.contains_key("bogus"));
    }

    #[test]
    fn read_only_category_cannot_be_disabled() {
        let mut widget = widget();
        let mut selections = CategoryMap::new();
        selections.insert("necessary".into(), false);
        widget.save_preferences(&selections);
        assert!(widget.has_consent("necessary"));
    }

    #[test]
    fn fresh_visitor_scenario() {
        // No stored record → invalid → banner shown.
        let recorder = SignalRecorder::default();
        let mut widget = ConsentWidget::with_parts(
            ConsentConfig::default(),
            InMemoryStorage::new(),
            ConsentApplier::new().with_signal_sink(Box::new(recorder.clone())),
            ConsentHooks::default(),
        );
        assert!(widget.should_show());
        assert!(widget.is_visible());
        assert_eq!(recorder.defaults.lock().unwrap().len(), 1);
        assert_eq!(
            recorder.defaults.lock().unwrap()[0],
            ConsentSignals::all_denied()
        );

        // Visitor clicks Accept All.
        widget.accept_all();

        let record = widget.get_consent().unwrap();
        assert_eq!(record.action, ConsentAction::AcceptAll);
        assert!(record.categories.values().all(|granted| *granted));

        let updates = recorder.updates.lock().unwrap();
        let vector = updates.last().unwrap();
        assert_eq!(vector.ad_storage, SignalState::Granted);
        assert_eq!(vector.analytics_storage, SignalState::Granted);
        assert_eq!(vector.functionality_storage, SignalState::Granted);
        assert_eq!(vector.personalization_storage, SignalState::Granted);
        assert_eq!(vector.security_storage, SignalState::Granted);

        assert!(!widget.is_visible());
        assert!(!widget.should_show());
    }

    #[test]
    fn consent_event_is_forwarded_when_recording_is_enabled() {
        let recorder = SignalRecorder::default();
        let mut widget = ConsentWidget::with_parts(
            ConsentConfig::default(),
            InMemoryStorage::new(),
            ConsentApplier::new().with_signal_sink(Box::new(recorder.clone())),
            ConsentHooks::default(),
        );

        widget.decline_all();

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, ConsentAction::DeclineAll);
        assert_eq!(events[0].granted, ["necessary"]);
    }

    #[test]
    fn consent_event_is_not_forwarded_when_recording_is_disabled() {
        let recorder = SignalRecorder::default();
        let mut config = ConsentConfig::default();
        config.record_consent = false;
        let mut widget = ConsentWidget::with_parts(
            config,
            InMemoryStorage::new(),
            ConsentApplier::new().with_signal_sink(Box::new(recorder.clone())),
            ConsentHooks::default(),
        );

        widget.accept_all();
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[test]
    fn action_hooks_fire_with_the_resolved_categories() {
        let seen: Arc<Mutex<Vec<CategoryMap>>> = Arc::default();
        let seen_hook = Arc::clone(&seen);

        let mut widget = ConsentWidget::with_parts(
            ConsentConfig::default(),
            InMemoryStorage::new(),
            ConsentApplier::new(),
            ConsentHooks {
                on_decline: Some(Box::new(move |categories| {
                    seen_hook.lock().unwrap().push(categories.clone());
                })),
                ..ConsentHooks::default()
            },
        );

        widget.decline_all();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0]["necessary"]);
        assert!(!seen[0]["marketing"]);
    }

    #[test]
    fn reset_clears_consent_and_reshows_the_banner() {
        let mut widget = widget();
        widget.accept_all();
        assert!(!widget.should_show());

        widget.reset();
        assert!(widget.get_consent().is_none());
        assert!(widget.should_show());
        assert!(widget.is_visible());
    }

    #[test]
    fn existing_valid_record_is_applied_at_construction() {
        let mut storage = InMemoryStorage::new();
        {
            let mut store = ConsentStore::new(storage.clone());
            let mut categories = CategoryMap::new();
            categories.insert("necessary".into(), true);
            categories.insert("analytics".into(), true);
            store.save(categories, ConsentAction::SavePreferences, "en", None);
            storage = store.storage().clone();
        }

        let recorder = SignalRecorder::default();
        let widget = ConsentWidget::with_parts(
            ConsentConfig::default(),
            storage,
            ConsentApplier::new().with_signal_sink(Box::new(recorder.clone())),
            ConsentHooks::default(),
        );

        // Returning visitor: no banner, existing decision propagated.
        assert!(!widget.is_visible());
        assert!(!widget.should_show());
        assert_eq!(recorder.updates.lock().unwrap().len(), 1);
        assert!(widget.has_consent("analytics"));
    }

    #[test]
    fn update_config_merges_into_the_live_config() {
        let mut widget = widget();
        let mut overrides = ConsentOverrides::default();
        overrides.cookie_expiry_days = Some(1);
        overrides.categories.insert(
            "analytics".into(),
            CategoryOverride {
                read_only: Some(true),
                ..CategoryOverride::default()
            },
        );

        widget.update_config(&overrides);
        assert_eq!(widget.config().cookie_expiry_days, 1);
        assert!(widget.config().categories["analytics"].read_only);

        // The now read-only analytics category survives a decline.
        widget.decline_all();
        assert!(widget.has_consent("analytics"));
    }

    #[test]
    fn set_language_is_stamped_onto_the_next_record() {
        let mut widget = widget();
        widget.set_language("de");
        widget.set_user_agent("test-agent/1.0");
        widget.accept_all();

        let record = widget.get_consent().unwrap();
        assert_eq!(record.language, "de");
        assert_eq!(record.user_agent.as_deref(), Some("test-agent/1.0"));
    }

    #[test]
    fn cookie_gate_follows_consent_state() {
        let mut widget = widget();
        let gate = widget.cookie_gate();
        assert!(gate.is_blocking());
        assert!(gate.allows("cookie_consent={}"));
        assert!(!gate.allows("_ga=GA1.2.123"));

        widget.accept_all();
        let gate = widget.cookie_gate();
        assert!(!gate.is_blocking());
        assert!(gate.allows("_ga=GA1.2.123"));
    }

    #[test]
    fn storage_failure_still_propagates_and_dismisses() {
        struct BrokenStorage;
        impl ConsentStorage for BrokenStorage {
            fn read(&self) -> Result<Option<ConsentRecord>, StorageError> {
                Ok(None)
            }
            fn write(&mut self, _record: &ConsentRecord) -> Result<(), StorageError> {
                Err(StorageError::Unavailable("full".into()))
            }
            fn remove(&mut self) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let recorder = SignalRecorder::default();
        let mut widget = ConsentWidget::with_parts(
            ConsentConfig::default(),
            BrokenStorage,
            ConsentApplier::new().with_signal_sink(Box::new(recorder.clone())),
            ConsentHooks::default(),
        );

        assert!(!widget.accept_all());
        // Propagation and dismissal still happen; no event without a record.
        assert_eq!(recorder.updates.lock().unwrap().len(), 1);
        assert!(recorder.events.lock().unwrap().is_empty());
        assert!(!widget.is_visible());
    }

    #[test]
    fn draft_selection_prefers_the_persisted_decision() {
        let mut widget = widget();
        // Fresh: falls back to each category's enabled default.
        let draft = widget.draft_selection();
        assert!(draft["necessary"]);
        assert!(!draft["analytics"]);

        let mut selections = CategoryMap::new();
        selections.insert("analytics".into(), true);
        widget.save_preferences(&selections);

        let draft = widget.draft_selection();
        assert!(draft["analytics"]);
        assert!(!draft["marketing"]);
    }
}
