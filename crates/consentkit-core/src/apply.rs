// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! Consent propagation.
//!
//! [`ConsentApplier`] pushes a resolved category map to the outside world in
//! a fixed order:
//!
//! 1. consent-signal `update` (the five-slot vocabulary)
//! 2. analytics tracker toggle
//! 3. marketing tracker toggle
//! 4. change hook with the resolved categories
//!
//! Downstream integrations are injected capabilities with no-op defaults —
//! an absent analytics or ad library is modelled as the default
//! implementation and silently skipped, never an error.  A *failing*
//! integration is logged and skipped; each call is isolated so one failure
//! never blocks the other propagations.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use log::warn;

use crate::types::{
    CategoryMap, ConsentEvent, ConsentSignals, CATEGORY_ANALYTICS, CATEGORY_MARKETING,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a downstream integration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError(pub String);

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SinkError {}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Outbound consent-signal sink speaking the two-phase protocol.
///
/// All methods default to no-ops so that a partial implementation (or the
/// stock [`NoopSignalSink`]) stands in for an absent measurement platform.
pub trait SignalSink: Send {
    /// Emit the `default` phase, before any user decision exists.
    fn signal_default(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
        let _ = signals;
        Ok(())
    }

    /// Emit the `update` phase after a decision.
    fn signal_update(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
        let _ = signals;
        Ok(())
    }

    /// Forward a consent event (which categories were granted) when consent
    /// recording is enabled.
    fn record_event(&mut self, event: &ConsentEvent) -> Result<(), SinkError> {
        let _ = event;
        Ok(())
    }
}

/// On/off switch for one third-party tracking integration.
pub trait TrackerSink: Send {
    /// Enable or disable the integration.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), SinkError>;
}

/// Stand-in for an absent measurement platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSignalSink;

impl SignalSink for NoopSignalSink {}

/// Stand-in for an absent tracking integration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl TrackerSink for NoopTracker {
    fn set_enabled(&mut self, _enabled: bool) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Change hook invoked with the resolved categories after every propagation.
pub type ChangeHook = Box<dyn FnMut(&CategoryMap) + Send>;

// ---------------------------------------------------------------------------
// ConsentApplier
// ---------------------------------------------------------------------------

/// Propagates category decisions to the injected integrations.
///
/// Integrations are checked in once at construction; there is no runtime
/// global detection.
///
/// # Examples
///
/// ```rust
/// use consentkit_core::apply::{ConsentApplier, SignalSink, SinkError};
/// use consentkit_core::types::{CategoryMap, ConsentSignals};
///
/// #[derive(Default)]
/// struct Recorder(Vec<ConsentSignals>);
///
/// impl SignalSink for Recorder {
///     fn signal_update(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
///         self.0.push(*signals);
///         Ok(())
///     }
/// }
///
/// let mut applier = ConsentApplier::new().with_signal_sink(Box::new(Recorder::default()));
///
/// let mut categories = CategoryMap::new();
/// categories.insert("analytics".into(), true);
/// applier.apply(&categories, true);
/// ```
pub struct ConsentApplier {
    signals: Box<dyn SignalSink>,
    analytics: Box<dyn TrackerSink>,
    marketing: Box<dyn TrackerSink>,
    on_change: Option<ChangeHook>,
}

impl Default for ConsentApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentApplier {
    /// An applier with every integration defaulted to a no-op.
    pub fn new() -> Self {
        Self {
            signals: Box::new(NoopSignalSink),
            analytics: Box::new(NoopTracker),
            marketing: Box::new(NoopTracker),
            on_change: None,
        }
    }

    /// Inject the consent-signal sink.
    pub fn with_signal_sink(mut self, sink: Box<dyn SignalSink>) -> Self {
        self.signals = sink;
        self
    }

    /// Inject the analytics tracking integration.
    pub fn with_analytics(mut self, sink: Box<dyn TrackerSink>) -> Self {
        self.analytics = sink;
        self
    }

    /// Inject the marketing tracking integration.
    pub fn with_marketing(mut self, sink: Box<dyn TrackerSink>) -> Self {
        self.marketing = sink;
        self
    }

    /// Install the change hook.
    pub fn with_on_change(mut self, hook: ChangeHook) -> Self {
        self.on_change = Some(hook);
        self
    }

    /// Emit the `default` phase of the signal protocol.
    pub fn signal_default(&mut self, signals: &ConsentSignals) {
        isolate(self.signals.signal_default(signals), "consent signal default");
    }

    /// Forward a consent event to the signal sink.
    pub fn record_event(&mut self, event: &ConsentEvent) {
        isolate(self.signals.record_event(event), "consent event");
    }

    /// Propagate `categories` to every integration.
    ///
    /// Order: consent-signal update (only when `google_consent_mode` is on),
    /// analytics toggle, marketing toggle, change hook.  Each downstream
    /// call is isolated; a failure is logged and the remaining calls still
    /// run.
    pub fn apply(&mut self, categories: &CategoryMap, google_consent_mode: bool) {
        if google_consent_mode {
            let signals = ConsentSignals::from_categories(categories);
            isolate(self.signals.signal_update(&signals), "consent signal update");
        }

        let analytics = categories.get(CATEGORY_ANALYTICS).copied().unwrap_or(false);
        isolate(self.analytics.set_enabled(analytics), "analytics tracker");

        let marketing = categories.get(CATEGORY_MARKETING).copied().unwrap_or(false);
        isolate(self.marketing.set_enabled(marketing), "marketing tracker");

        if let Some(hook) = self.on_change.as_mut() {
            hook(categories);
        }
    }
}

/// Log-and-continue wrapper around one downstream call.
fn isolate(result: Result<(), SinkError>, what: &str) {
    if let Err(error) = result {
        warn!("{what} failed: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn push(&self, entry: &str) {
            self.0.lock().unwrap().push(entry.into());
        }
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct JournalSignals(Journal);

    impl SignalSink for JournalSignals {
        fn signal_default(&mut self, _signals: &ConsentSignals) -> Result<(), SinkError> {
            self.0.push("default");
            Ok(())
        }
        fn signal_update(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
            self.0.push(if signals.analytics_storage.is_granted() {
                "update:analytics-granted"
            } else {
                "update:analytics-denied"
            });
            Ok(())
        }
        fn record_event(&mut self, _event: &ConsentEvent) -> Result<(), SinkError> {
            self.0.push("event");
            Ok(())
        }
    }

    struct JournalTracker(Journal, &'static str);

    impl TrackerSink for JournalTracker {
        fn set_enabled(&mut self, enabled: bool) -> Result<(), SinkError> {
            self.0.push(if enabled {
                match self.1 {
                    "analytics" => "analytics:on",
                    _ => "marketing:on",
                }
            } else {
                match self.1 {
                    "analytics" => "analytics:off",
                    _ => "marketing:off",
                }
            });
            Ok(())
        }
    }

    struct FailingSignals;

    impl SignalSink for FailingSignals {
        fn signal_update(&mut self, _signals: &ConsentSignals) -> Result<(), SinkError> {
            Err(SinkError("gateway unreachable".into()))
        }
    }

    fn categories(analytics: bool, marketing: bool) -> CategoryMap {
        let mut map = CategoryMap::new();
        map.insert("necessary".into(), true);
        map.insert(CATEGORY_ANALYTICS.into(), analytics);
        map.insert(CATEGORY_MARKETING.into(), marketing);
        map
    }

    #[test]
    fn apply_runs_signal_then_toggles_then_hook() {
        let journal = Journal::default();
        let hook_journal = journal.clone();

        let mut applier = ConsentApplier::new()
            .with_signal_sink(Box::new(JournalSignals(journal.clone())))
            .with_analytics(Box::new(JournalTracker(journal.clone(), "analytics")))
            .with_marketing(Box::new(JournalTracker(journal.clone(), "marketing")))
            .with_on_change(Box::new(move |_| hook_journal.push("hook")));

        applier.apply(&categories(true, false), true);

        assert_eq!(
            journal.entries(),
            [
                "update:analytics-granted",
                "analytics:on",
                "marketing:off",
                "hook",
            ]
        );
    }

    #[test]
    fn signal_update_is_skipped_when_consent_mode_is_off() {
        let journal = Journal::default();
        let mut applier = ConsentApplier::new()
            .with_signal_sink(Box::new(JournalSignals(journal.clone())))
            .with_analytics(Box::new(JournalTracker(journal.clone(), "analytics")))
            .with_marketing(Box::new(JournalTracker(journal.clone(), "marketing")));

        applier.apply(&categories(false, true), false);

        assert_eq!(journal.entries(), ["analytics:off", "marketing:on"]);
    }

    #[test]
    fn failing_signal_sink_does_not_block_the_trackers() {
        let journal = Journal::default();
        let mut applier = ConsentApplier::new()
            .with_signal_sink(Box::new(FailingSignals))
            .with_analytics(Box::new(JournalTracker(journal.clone(), "analytics")))
            .with_marketing(Box::new(JournalTracker(journal.clone(), "marketing")));

        applier.apply(&categories(true, true), true);

        assert_eq!(journal.entries(), ["analytics:on", "marketing:on"]);
    }

    #[test]
    fn noop_defaults_swallow_everything() {
        let mut applier = ConsentApplier::new();
        applier.signal_default(&ConsentSignals::all_denied());
        applier.apply(&categories(true, true), true);
        // No panic, no error: absent integrations are silently skipped.
    }
}
