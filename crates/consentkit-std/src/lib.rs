// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! # consentkit-std
//!
//! `std`-only storage backends for `consentkit-core`.
//!
//! This crate provides [`FileStorage`], a JSON file-backed implementation of
//! the [`ConsentStorage`](consentkit_core::ConsentStorage) trait suitable for
//! kiosk applications, desktop embedders, and server-side rendering setups
//! where the consent record outlives the process.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use consentkit_std::FileStorage;
//! use consentkit_core::{config::ConsentConfig, widget::ConsentWidget};
//!
//! let storage = FileStorage::new("/var/lib/myapp/consent.json");
//! let mut widget = ConsentWidget::new(ConsentConfig::default(), storage);
//! ```

pub mod storage;

pub use storage::file::FileStorage;
