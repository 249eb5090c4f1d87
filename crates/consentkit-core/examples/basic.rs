// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! # Basic Consent Widget Example
//!
//! Demonstrates the full decision pipeline with printing integrations
//! standing in for a tag manager.  Run with:
//!
//! ```bash
//! cargo run --example basic
//! ```

use consentkit_core::{
    apply::{ConsentApplier, SignalSink, SinkError, TrackerSink},
    config::{ConsentConfig, ConsentOverrides},
    store::InMemoryStorage,
    types::{CategoryMap, ConsentEvent, ConsentSignals},
    widget::{ConsentHooks, ConsentWidget},
};

/// Prints every signal emission instead of pushing it to a tag manager.
struct PrintingSignals;

impl SignalSink for PrintingSignals {
    fn signal_default(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
        println!("  [signal] default: {signals:?}");
        Ok(())
    }
    fn signal_update(&mut self, signals: &ConsentSignals) -> Result<(), SinkError> {
        println!("  [signal] update:  {signals:?}");
        Ok(())
    }
    fn record_event(&mut self, event: &ConsentEvent) -> Result<(), SinkError> {
        println!("  [signal] event:   {:?} granted={:?}", event.action, event.granted);
        Ok(())
    }
}

struct PrintingTracker(&'static str);

impl TrackerSink for PrintingTracker {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), SinkError> {
        println!("  [tracker] {} -> {}", self.0, if enabled { "on" } else { "off" });
        Ok(())
    }
}

fn main() {
    println!("ConsentKit — Basic Example\n");

    // -----------------------------------------------------------------------
    // 1. Merge caller overrides into the defaults
    // -----------------------------------------------------------------------
    let overrides = ConsentOverrides {
        cookie_expiry_days: Some(180),
        ..ConsentOverrides::default()
    };
    let config = ConsentConfig::default().merged(&overrides);
    println!("Configured categories:");
    for (name, def) in &config.categories {
        println!("  {name}: read_only={}, enabled={}", def.read_only, def.enabled);
    }
    println!();

    // -----------------------------------------------------------------------
    // 2. Construct the widget with printing integrations
    // -----------------------------------------------------------------------
    let applier = ConsentApplier::new()
        .with_signal_sink(Box::new(PrintingSignals))
        .with_analytics(Box::new(PrintingTracker("analytics")))
        .with_marketing(Box::new(PrintingTracker("marketing")))
        .with_on_change(Box::new(|categories: &CategoryMap| {
            println!("  [hook] on_change: {} categories resolved", categories.len());
        }));

    let hooks = ConsentHooks {
        on_save: Some(Box::new(|_| println!("  [hook] on_save fired"))),
        ..ConsentHooks::default()
    };

    println!("Constructing widget (fresh visitor):");
    let mut widget = ConsentWidget::with_parts(config, InMemoryStorage::new(), applier, hooks);
    println!("  banner visible: {}\n", widget.is_visible());

    // -----------------------------------------------------------------------
    // 3. The visitor opens the preferences dialog and saves a selection
    // -----------------------------------------------------------------------
    println!("Saving preferences (analytics on, marketing off):");
    let mut selections = widget.draft_selection();
    selections.insert("analytics".into(), true);
    let saved = widget.save_preferences(&selections);
    println!("  persisted: {saved}");
    println!("  banner visible: {}\n", widget.is_visible());

    // -----------------------------------------------------------------------
    // 4. Query the decision
    // -----------------------------------------------------------------------
    let record = widget.get_consent().expect("decision on file");
    println!("Stored decision:");
    println!("  action:  {:?}", record.action);
    println!("  granted: {:?}", record.granted());
    println!("  has_consent(\"marketing\") = {}\n", widget.has_consent("marketing"));

    // -----------------------------------------------------------------------
    // 5. Reset and ask again
    // -----------------------------------------------------------------------
    println!("Resetting:");
    widget.reset();
    println!("  consent on file: {}", widget.get_consent().is_some());
    println!("  banner visible:  {}", widget.is_visible());

    println!("\nDone.");
}
