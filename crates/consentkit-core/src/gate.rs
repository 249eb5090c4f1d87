// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! Best-effort cookie-write gating.
//!
//! The embedder intercepts `document.cookie` writes (or the platform
//! equivalent) itself; [`CookieGate`] only supplies the decision.  Before
//! valid consent exists, only a short list of essential cookies may be
//! written.

use log::warn;

/// Cookies that may always be written, matched as `name=` substrings of the
/// raw cookie string.
const ESSENTIAL_COOKIES: &[&str] = &[
    "cookie_consent",
    "PHPSESSID",
    "csrftoken",
    "_csrf",
    "sessionid",
];

/// Whether `cookie` (a raw `name=value; ...` string) sets an essential cookie.
pub fn is_essential_cookie(cookie: &str) -> bool {
    ESSENTIAL_COOKIES.iter().any(|name| {
        let prefix_len = name.len();
        cookie
            .match_indices(*name)
            .any(|(index, _)| cookie[index + prefix_len..].starts_with('='))
    })
}

/// Decision function for the cookie-write intercept.
///
/// # Examples
///
/// ```rust
/// use consentkit_core::gate::CookieGate;
///
/// let gate = CookieGate::new(true);
/// assert!(gate.allows("sessionid=abc123; Path=/"));
/// assert!(!gate.allows("_fbp=fb.1.12345"));
///
/// let open = CookieGate::new(false);
/// assert!(open.allows("_fbp=fb.1.12345"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CookieGate {
    blocking: bool,
}

impl CookieGate {
    /// A gate that blocks non-essential writes when `blocking` is true.
    pub fn new(blocking: bool) -> Self {
        Self { blocking }
    }

    /// Whether non-essential writes are currently blocked.
    pub fn is_blocking(self) -> bool {
        self.blocking
    }

    /// Whether the given cookie write should go through.
    ///
    /// Blocked writes are logged; they are never an error.
    pub fn allows(self, cookie: &str) -> bool {
        if !self.blocking || is_essential_cookie(cookie) {
            true
        } else {
            warn!("cookie write blocked before consent: {cookie}");
            false
        }
    }
}
