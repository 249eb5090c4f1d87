// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! # consentkit-core
//!
//! Core consent state machine and propagation engine for the ConsentKit
//! cookie-consent widget.
//!
//! This crate is `no_std`-compatible (requires `alloc`).  Enable the `std`
//! feature (on by default) to lift that restriction and gain access to
//! standard-library conveniences.
//!
//! The banner/modal markup, CSS, translations, and DOM wiring are *not*
//! here — the presentation layer is an external collaborator that calls
//! into [`ConsentWidget`] on user interaction and reads the category
//! decisions back.
//!
//! ## Architecture
//!
//! ```text
//! ConsentWidget<S: ConsentStorage>
//!   ├── ConsentConfig     — typed defaults + key-by-key override merge
//!   ├── ConsentStore<S>   — load / validate / save / reset the record
//!   ├── ConsentApplier    — signal update → tracker toggles → change hook
//!   └── ConsentHooks      — per-action caller callbacks
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use consentkit_core::{
//!     config::ConsentConfig,
//!     store::InMemoryStorage,
//!     widget::ConsentWidget,
//! };
//!
//! let mut widget = ConsentWidget::new(ConsentConfig::default(), InMemoryStorage::new());
//!
//! // Fresh visitor: the banner should be shown.
//! assert!(widget.should_show());
//!
//! // The visitor accepts everything.
//! widget.accept_all();
//! assert!(widget.has_consent("analytics"));
//! assert!(!widget.should_show());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod apply;
pub mod config;
pub mod config_loader;
pub mod gate;
pub mod store;
pub mod types;
pub mod widget;

// Re-export the most commonly used items at the crate root so consumers can
// write `use consentkit_core::ConsentWidget;` instead of the fully
// qualified path.
pub use apply::{ConsentApplier, NoopSignalSink, NoopTracker, SignalSink, SinkError, TrackerSink};
pub use config::{CategoryDefinition, ConsentConfig, ConsentOverrides};
pub use gate::CookieGate;
pub use store::{ConsentStorage, ConsentStore, InMemoryStorage, StorageError};
pub use types::{
    CategoryMap, ConsentAction, ConsentEvent, ConsentRecord, ConsentSignals, SignalState,
};
pub use widget::{ConsentHooks, ConsentWidget};
