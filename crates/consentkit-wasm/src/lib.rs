// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! # consentkit-wasm
//!
//! WebAssembly bindings for the ConsentKit widget core.
//!
//! This crate exposes the `consentkit-core` API to JavaScript and TypeScript
//! consumers running in the browser via `wasm-bindgen`.  The JS side owns the
//! DOM — banner markup, cookie writes, GTM dataLayer pushes — and calls into
//! these functions for every state decision.
//!
//! ## Architecture
//!
//! Each handle wraps a [`ConsentWidget<InMemoryStorage>`].  Widget instances
//! are stored in a thread-local registry keyed by integer handles because
//! WASM is single-threaded and `wasm_bindgen` cannot export generic Rust
//! structs across the JS boundary.  Persistence to `localStorage` stays on
//! the JS side: read `get_consent` after each decision and write the record
//! back under the `cookie_consent` key.
//!
//! ## Exported Functions
//!
//! | Function                    | Description                                        |
//! |-----------------------------|----------------------------------------------------|
//! | `create_widget`             | Create a widget with default configuration         |
//! | `create_widget_with_config` | Create a widget with JSON override configuration   |
//! | `destroy_widget`            | Release a widget handle and free its memory        |
//! | `accept_all`                | Grant every configured category                    |
//! | `decline_all`               | Decline everything declinable                      |
//! | `save_preferences`          | Persist an explicit per-category selection         |
//! | `has_consent`               | Whether a single category was granted              |
//! | `get_consent`               | The persisted decision record, or `null`           |
//! | `consent_signals`           | The five-slot signal vector for the current state  |
//! | `should_show`               | Whether the visitor still needs to be asked        |
//! | `show_banner` / `hide_banner` | Drive the banner visibility flag                 |
//! | `reset`                     | Delete the decision and re-raise the banner        |
//! | `set_language`              | Switch the language stamped onto future records    |
//! | `update_config`             | Merge JSON overrides into the live configuration   |
//!
//! ## JavaScript Usage
//!
//! ```js
//! import init, {
//!   create_widget_with_config,
//!   accept_all,
//!   save_preferences,
//!   get_consent,
//!   should_show,
//! } from '@consentkit/wasm';
//!
//! await init();
//!
//! const handle = create_widget_with_config(JSON.stringify({
//!   theme: 'dark',
//!   cookie_expiry_days: 180,
//! }));
//!
//! if (should_show(handle)) {
//!   renderBanner();
//! }
//!
//! // User clicked "Accept all".
//! accept_all(handle);
//! localStorage.setItem('cookie_consent', JSON.stringify(get_consent(handle)));
//!
//! // Or an explicit selection from the preferences dialog.
//! save_preferences(handle, JSON.stringify({ analytics: true, marketing: false }));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use consentkit_core::{
    config::{ConsentConfig, ConsentOverrides},
    store::InMemoryStorage,
    types::CategoryMap,
    widget::ConsentWidget,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Widget registry
// ---------------------------------------------------------------------------

// WASM is single-threaded; RefCell<HashMap<...>> is safe here.
thread_local! {
    static WIDGETS: RefCell<HashMap<u32, ConsentWidget<InMemoryStorage>>> =
        RefCell::new(HashMap::new());
    static NEXT_HANDLE: RefCell<u32> = RefCell::new(0);
}

/// Allocate a new widget handle. Handles wrap around at `u32::MAX - 1` to
/// reserve `u32::MAX` as the error sentinel.
fn next_handle() -> u32 {
    NEXT_HANDLE.with(|counter| {
        let handle = *counter.borrow();
        let next = if handle >= u32::MAX - 1 { 0 } else { handle + 1 };
        *counter.borrow_mut() = next;
        handle
    })
}

fn insert_widget(handle: u32, widget: ConsentWidget<InMemoryStorage>) {
    WIDGETS.with(|widgets| {
        widgets.borrow_mut().insert(handle, widget);
    });
}

/// Helper: run a closure with mutable access to a widget. Returns
/// `Err(message)` if the handle is unknown.
fn with_widget_mut<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&mut ConsentWidget<InMemoryStorage>) -> R,
{
    WIDGETS.with(|widgets| {
        let mut map = widgets.borrow_mut();
        match map.get_mut(&handle) {
            Some(widget) => Ok(callback(widget)),
            None => Err(format!("unknown widget handle {}", handle)),
        }
    })
}

/// Helper: run a closure with shared access to a widget.
fn with_widget<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&ConsentWidget<InMemoryStorage>) -> R,
{
    WIDGETS.with(|widgets| {
        let map = widgets.borrow();
        match map.get(&handle) {
            Some(widget) => Ok(callback(widget)),
            None => Err(format!("unknown widget handle {}", handle)),
        }
    })
}

// ---------------------------------------------------------------------------
// Widget lifecycle
// ---------------------------------------------------------------------------

/// Create a new widget with default configuration and return its integer
/// handle.
///
/// Pass this handle to all subsequent function calls.
#[wasm_bindgen]
pub fn create_widget() -> u32 {
    let handle = next_handle();
    let widget = ConsentWidget::new(ConsentConfig::default(), InMemoryStorage::new());
    insert_widget(handle, widget);
    handle
}

/// Create a new widget with explicit override configuration.
///
/// `config_json` must be a JSON string matching the [`ConsentOverrides`]
/// shape; omitted fields keep their defaults:
///
/// ```json
/// {
///   "position": "bottom",
///   "theme": "dark",
///   "cookie_expiry_days": 180,
///   "categories": { "analytics": { "enabled": true } }
/// }
/// ```
///
/// Returns the integer widget handle, or `u32::MAX` on parse error.
#[wasm_bindgen]
pub fn create_widget_with_config(config_json: &str) -> u32 {
    let overrides: ConsentOverrides = match serde_json::from_str(config_json) {
        Ok(overrides) => overrides,
        Err(_) => return u32::MAX,
    };
    let config = ConsentConfig::default().merged(&overrides);
    let handle = next_handle();
    let widget = ConsentWidget::new(config, InMemoryStorage::new());
    insert_widget(handle, widget);
    handle
}

/// Release the widget associated with `handle`, freeing its memory.
///
/// After calling this function the handle is no longer valid.
#[wasm_bindgen]
pub fn destroy_widget(handle: u32) {
    WIDGETS.with(|widgets| {
        widgets.borrow_mut().remove(&handle);
    });
}

// ---------------------------------------------------------------------------
// Consent decisions
// ---------------------------------------------------------------------------

/// Grant every configured category.
///
/// Returns the persistence outcome (`false` on storage failure or unknown
/// handle); propagation runs either way.
#[wasm_bindgen]
pub fn accept_all(handle: u32) -> bool {
    with_widget_mut(handle, |widget| widget.accept_all()).unwrap_or(false)
}

/// Decline everything declinable; read-only categories stay granted.
#[wasm_bindgen]
pub fn decline_all(handle: u32) -> bool {
    with_widget_mut(handle, |widget| widget.decline_all()).unwrap_or(false)
}

/// Persist the user's explicit selection.
///
/// `selections_json` must be a JSON object mapping category names to
/// booleans, e.g. `{"analytics":true,"marketing":false}`.  Unknown keys are
/// dropped, absent keys resolve to `false`, read-only categories are forced
/// to `true`.
///
/// Returns `false` on parse error, storage failure, or unknown handle.
#[wasm_bindgen]
pub fn save_preferences(handle: u32, selections_json: &str) -> bool {
    let selections: CategoryMap = match serde_json::from_str(selections_json) {
        Ok(selections) => selections,
        Err(_) => return false,
    };
    with_widget_mut(handle, |widget| widget.save_preferences(&selections)).unwrap_or(false)
}

/// Delete the persisted decision and re-raise the banner.
#[wasm_bindgen]
pub fn reset(handle: u32) {
    let _ = with_widget_mut(handle, |widget| widget.reset());
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Whether `category` was granted; `false` when no decision is on file or
/// the handle is unknown.
#[wasm_bindgen]
pub fn has_consent(handle: u32, category: &str) -> bool {
    with_widget(handle, |widget| widget.has_consent(category)).unwrap_or(false)
}

/// The persisted decision record as a JS object, or `null` when no decision
/// exists or the handle is unknown.
#[wasm_bindgen]
pub fn get_consent(handle: u32) -> JsValue {
    with_widget(handle, |widget| {
        widget
            .get_consent()
            .map(|record| serde_wasm_bindgen::to_value(record).unwrap_or(JsValue::NULL))
            .unwrap_or(JsValue::NULL)
    })
    .unwrap_or(JsValue::NULL)
}

/// The five-slot signal vector for the current state as a JS object
/// (persisted decision, or the configured default state).
///
/// Returns `null` on unknown handle.
#[wasm_bindgen]
pub fn consent_signals(handle: u32) -> JsValue {
    with_widget(handle, |widget| {
        serde_wasm_bindgen::to_value(&widget.consent_signals()).unwrap_or(JsValue::NULL)
    })
    .unwrap_or(JsValue::NULL)
}

/// Whether the visitor still needs to be asked (no valid consent on file).
#[wasm_bindgen]
pub fn should_show(handle: u32) -> bool {
    with_widget(handle, |widget| widget.should_show()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Banner visibility and configuration
// ---------------------------------------------------------------------------

/// Raise the banner visibility flag.
#[wasm_bindgen]
pub fn show_banner(handle: u32) {
    let _ = with_widget_mut(handle, |widget| widget.show());
}

/// Lower the banner visibility flag.
#[wasm_bindgen]
pub fn hide_banner(handle: u32) {
    let _ = with_widget_mut(handle, |widget| widget.hide());
}

/// Whether the presentation layer should currently render the banner.
#[wasm_bindgen]
pub fn is_banner_visible(handle: u32) -> bool {
    with_widget(handle, |widget| widget.is_visible()).unwrap_or(false)
}

/// Switch the language code stamped onto future consent records.
#[wasm_bindgen]
pub fn set_language(handle: u32, code: &str) {
    let _ = with_widget_mut(handle, |widget| widget.set_language(code));
}

/// Record the client user agent stamped onto future consent records.
#[wasm_bindgen]
pub fn set_user_agent(handle: u32, user_agent: &str) {
    let _ = with_widget_mut(handle, |widget| widget.set_user_agent(user_agent));
}

/// Merge a JSON [`ConsentOverrides`] document into the live configuration.
///
/// Returns `false` on parse error or unknown handle.
#[wasm_bindgen]
pub fn update_config(handle: u32, config_json: &str) -> bool {
    let overrides: ConsentOverrides = match serde_json::from_str(config_json) {
        Ok(overrides) => overrides,
        Err(_) => return false,
    };
    with_widget_mut(handle, |widget| {
        widget.update_config(&overrides);
        true
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// wasm-bindgen-test stubs
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Native unit tests (run with `cargo test` outside of WASM)
// ---------------------------------------------------------------------------
