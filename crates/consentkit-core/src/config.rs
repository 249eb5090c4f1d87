// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! Widget configuration and the configuration merger.
//!
//! [`ConsentConfig`] is a fully typed configuration struct; the arbitrary
//! nested merge of ad-hoc option objects is replaced by [`ConsentOverrides`],
//! a partial override whose fields are merged key-by-key (override wins,
//! unspecified fields keep the default).  Merging never mutates the default
//! template and has no error conditions.

use alloc::string::String;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::types::{
    ConsentSignals, CATEGORY_ANALYTICS, CATEGORY_MARKETING, CATEGORY_NECESSARY,
    CATEGORY_PERSONALIZATION,
};

// ---------------------------------------------------------------------------
// Enumerated presentation options
// ---------------------------------------------------------------------------

/// Where the presentation layer anchors the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerPosition {
    Top,
    #[default]
    Bottom,
}

/// Colour theme hint for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

// ---------------------------------------------------------------------------
// Categories and content
// ---------------------------------------------------------------------------

/// Definition of one consent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    /// Whether the category is pre-enabled in a fresh selection draft.
    pub enabled: bool,
    /// Read-only categories cannot be disabled by the user; their resolved
    /// value is always `true`.
    pub read_only: bool,
    /// Display label.
    pub label: String,
    /// Display description.
    pub description: String,
}

/// Text content handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStrings {
    pub header: String,
    pub message: String,
    pub accept_button: String,
    pub decline_button: String,
    pub settings_button: String,
    pub save_button: String,
    pub close_button: String,
    pub privacy_policy: String,
    pub cookie_policy: String,
}

impl Default for ContentStrings {
    fn default() -> Self {
        Self {
            header: "We use cookies".into(),
            message: "This website uses cookies to enhance your browsing experience \
                      and provide personalized content. By clicking \"Accept All\", \
                      you consent to our use of cookies."
                .into(),
            accept_button: "Accept All".into(),
            decline_button: "Decline All".into(),
            settings_button: "Cookie Settings".into(),
            save_button: "Save Preferences".into(),
            close_button: "Close".into(),
            privacy_policy: "Privacy Policy".into(),
            cookie_policy: "Cookie Policy".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConsentConfig
// ---------------------------------------------------------------------------

/// Top-level widget configuration.
///
/// Immutable after merge except via an explicit
/// [`ConsentWidget::update_config`](crate::widget::ConsentWidget::update_config)
/// call.  Callback hooks are deliberately not part of this struct (closures
/// cannot be serialised); they live in
/// [`ConsentHooks`](crate::widget::ConsentHooks).
///
/// # Examples
///
/// ```rust
/// use consentkit_core::config::{ConsentConfig, ConsentOverrides};
///
/// let overrides = ConsentOverrides {
///     cookie_expiry_days: Some(30),
///     ..ConsentOverrides::default()
/// };
/// let config = ConsentConfig::default().merged(&overrides);
/// assert_eq!(config.cookie_expiry_days, 30);
/// assert!(config.auto_show); // unspecified fields keep the default
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentConfig {
    // Basic settings
    pub position: BannerPosition,
    pub theme: Theme,
    pub language: String,
    pub auto_show: bool,
    pub cookie_expiry_days: u32,

    // Compliance settings
    pub strict_mode: bool,
    pub show_decline_button: bool,
    pub block_cookies_before_consent: bool,
    pub record_consent: bool,

    // Consent-signal protocol
    pub google_consent_mode: bool,
    /// Vector emitted in the `default` phase before any decision exists.
    pub default_consent_state: ConsentSignals,

    // Presentation hints
    pub show_icon: bool,

    /// Configured categories, keyed by category name.
    pub categories: HashMap<String, CategoryDefinition>,

    /// Text content for the presentation layer.
    pub content: ContentStrings,

    // Policy links
    pub privacy_policy_url: String,
    pub cookie_policy_url: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        let mut categories = HashMap::new();
        categories.insert(
            CATEGORY_NECESSARY.into(),
            CategoryDefinition {
                enabled: true,
                read_only: true,
                label: "Strictly Necessary".into(),
                description: "These cookies are essential for the website to function properly."
                    .into(),
            },
        );
        categories.insert(
            CATEGORY_ANALYTICS.into(),
            CategoryDefinition {
                enabled: false,
                read_only: false,
                label: "Analytics".into(),
                description:
                    "These cookies help us understand how visitors interact with our website."
                        .into(),
            },
        );
        categories.insert(
            CATEGORY_MARKETING.into(),
            CategoryDefinition {
                enabled: false,
                read_only: false,
                label: "Marketing".into(),
                description: "These cookies are used to track visitors and display relevant \
                              advertisements."
                    .into(),
            },
        );
        categories.insert(
            CATEGORY_PERSONALIZATION.into(),
            CategoryDefinition {
                enabled: false,
                read_only: false,
                label: "Personalization".into(),
                description: "These cookies help us provide personalized content and experiences."
                    .into(),
            },
        );

        Self {
            position: BannerPosition::Bottom,
            theme: Theme::Light,
            language: "en".into(),
            auto_show: true,
            cookie_expiry_days: 365,
            strict_mode: true,
            show_decline_button: true,
            block_cookies_before_consent: true,
            record_consent: true,
            google_consent_mode: true,
            default_consent_state: ConsentSignals::all_denied(),
            show_icon: true,
            categories,
            content: ContentStrings::default(),
            privacy_policy_url: "#".into(),
            cookie_policy_url: "#".into(),
        }
    }
}

impl ConsentConfig {
    /// Return a copy of this configuration with `overrides` merged in.
    ///
    /// `self` is left untouched; the merge operates on a clone.
    pub fn merged(&self, overrides: &ConsentOverrides) -> ConsentConfig {
        let mut merged = self.clone();
        merged.apply(overrides);
        merged
    }

    /// Merge `overrides` into this configuration in place.
    ///
    /// Scalar fields are replaced wholesale; the `categories` and `content`
    /// mappings are merged key-by-key.
    pub fn apply(&mut self, overrides: &ConsentOverrides) {
        if let Some(value) = overrides.position {
            self.position = value;
        }
        if let Some(value) = overrides.theme {
            self.theme = value;
        }
        if let Some(ref value) = overrides.language {
            self.language = value.clone();
        }
        if let Some(value) = overrides.auto_show {
            self.auto_show = value;
        }
        if let Some(value) = overrides.cookie_expiry_days {
            self.cookie_expiry_days = value;
        }
        if let Some(value) = overrides.strict_mode {
            self.strict_mode = value;
        }
        if let Some(value) = overrides.show_decline_button {
            self.show_decline_button = value;
        }
        if let Some(value) = overrides.block_cookies_before_consent {
            self.block_cookies_before_consent = value;
        }
        if let Some(value) = overrides.record_consent {
            self.record_consent = value;
        }
        if let Some(value) = overrides.google_consent_mode {
            self.google_consent_mode = value;
        }
        if let Some(value) = overrides.default_consent_state {
            self.default_consent_state = value;
        }
        if let Some(value) = overrides.show_icon {
            self.show_icon = value;
        }
        if let Some(ref value) = overrides.privacy_policy_url {
            self.privacy_policy_url = value.clone();
        }
        if let Some(ref value) = overrides.cookie_policy_url {
            self.cookie_policy_url = value.clone();
        }

        for (name, over) in &overrides.categories {
            match self.categories.get_mut(name) {
                Some(def) => {
                    if let Some(enabled) = over.enabled {
                        def.enabled = enabled;
                    }
                    if let Some(read_only) = over.read_only {
                        def.read_only = read_only;
                    }
                    if let Some(ref label) = over.label {
                        def.label = label.clone();
                    }
                    if let Some(ref description) = over.description {
                        def.description = description.clone();
                    }
                }
                None => {
                    // A new category introduced by the caller.
                    self.categories.insert(
                        name.clone(),
                        CategoryDefinition {
                            enabled: over.enabled.unwrap_or(false),
                            read_only: over.read_only.unwrap_or(false),
                            label: over.label.clone().unwrap_or_else(|| name.clone()),
                            description: over.description.clone().unwrap_or_default(),
                        },
                    );
                }
            }
        }

        if let Some(ref content) = overrides.content {
            content.apply(&mut self.content);
        }
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Partial override for one [`CategoryDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryOverride {
    pub enabled: Option<bool>,
    pub read_only: Option<bool>,
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Partial override for [`ContentStrings`], merged field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOverrides {
    pub header: Option<String>,
    pub message: Option<String>,
    pub accept_button: Option<String>,
    pub decline_button: Option<String>,
    pub settings_button: Option<String>,
    pub save_button: Option<String>,
    pub close_button: Option<String>,
    pub privacy_policy: Option<String>,
    pub cookie_policy: Option<String>,
}

impl ContentOverrides {
    fn apply(&self, content: &mut ContentStrings) {
        if let Some(ref value) = self.header {
            content.header = value.clone();
        }
        if let Some(ref value) = self.message {
            content.message = value.clone();
        }
        if let Some(ref value) = self.accept_button {
            content.accept_button = value.clone();
        }
        if let Some(ref value) = self.decline_button {
            content.decline_button = value.clone();
        }
        if let Some(ref value) = self.settings_button {
            content.settings_button = value.clone();
        }
        if let Some(ref value) = self.save_button {
            content.save_button = value.clone();
        }
        if let Some(ref value) = self.close_button {
            content.close_button = value.clone();
        }
        if let Some(ref value) = self.privacy_policy {
            content.privacy_policy = value.clone();
        }
        if let Some(ref value) = self.cookie_policy {
            content.cookie_policy = value.clone();
        }
    }
}

/// Caller-supplied partial configuration.
///
/// Every field is optional; `None` keeps the default.  Deserialises directly
/// from partial JSON or TOML documents.
///
/// # Examples
///
/// ```rust
/// use consentkit_core::config::ConsentOverrides;
///
/// let json = r#"{ "theme": "dark", "cookie_expiry_days": 90 }"#;
/// let overrides: ConsentOverrides = serde_json::from_str(json).unwrap();
/// assert_eq!(overrides.cookie_expiry_days, Some(90));
/// assert!(overrides.language.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentOverrides {
    pub position: Option<BannerPosition>,
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub auto_show: Option<bool>,
    pub cookie_expiry_days: Option<u32>,
    pub strict_mode: Option<bool>,
    pub show_decline_button: Option<bool>,
    pub block_cookies_before_consent: Option<bool>,
    pub record_consent: Option<bool>,
    pub google_consent_mode: Option<bool>,
    pub default_consent_state: Option<ConsentSignals>,
    pub show_icon: Option<bool>,
    pub categories: HashMap<String, CategoryOverride>,
    pub content: Option<ContentOverrides>,
    pub privacy_policy_url: Option<String>,
    pub cookie_policy_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_replaces_scalars_and_keeps_unspecified_fields() {
        let overrides = ConsentOverrides {
            theme: Some(Theme::Dark),
            cookie_expiry_days: Some(30),
            ..ConsentOverrides::default()
        };

        let defaults = ConsentConfig::default();
        let merged = defaults.merged(&overrides);

        assert_eq!(merged.theme, Theme::Dark);
        assert_eq!(merged.cookie_expiry_days, 30);
        assert_eq!(merged.position, BannerPosition::Bottom);
        assert_eq!(merged.language, "en");
    }

    #[test]
    fn merge_does_not_mutate_the_default_template() {
        let defaults = ConsentConfig::default();
        let snapshot = defaults.clone();

        let mut overrides = ConsentOverrides::default();
        overrides.theme = Some(Theme::Dark);
        overrides.categories.insert(
            "analytics".into(),
            CategoryOverride {
                enabled: Some(true),
                ..CategoryOverride::default()
            },
        );
        let _ = defaults.merged(&overrides);

        assert_eq!(defaults, snapshot);
    }

    #[test]
    fn categories_merge_key_by_key() {
        let mut overrides = ConsentOverrides::default();
        overrides.categories.insert(
            "analytics".into(),
            CategoryOverride {
                enabled: Some(true),
                label: Some("Site analytics".into()),
                ..CategoryOverride::default()
            },
        );

        let merged = ConsentConfig::default().merged(&overrides);
        let analytics = &merged.categories["analytics"];
        assert!(analytics.enabled);
        assert_eq!(analytics.label, "Site analytics");
        // Unspecified keys of the same category keep their defaults.
        assert!(!analytics.read_only);
        // Untouched categories are carried over verbatim.
        assert!(merged.categories["necessary"].read_only);
    }

    #[test]
    fn unknown_category_override_introduces_the_category() {
        let mut overrides = ConsentOverrides::default();
        overrides.categories.insert(
            "social".into(),
            CategoryOverride {
                enabled: Some(true),
                ..CategoryOverride::default()
            },
        );

        let merged = ConsentConfig::default().merged(&overrides);
        let social = &merged.categories["social"];
        assert!(social.enabled);
        assert!(!social.read_only);
        assert_eq!(social.label, "social");
    }

    #[test]
    fn content_merges_field_by_field() {
        let mut overrides = ConsentOverrides::default();
        overrides.content = Some(ContentOverrides {
            header: Some("Cookies?".into()),
            ..ContentOverrides::default()
        });

        let merged = ConsentConfig::default().merged(&overrides);
        assert_eq!(merged.content.header, "Cookies?");
        assert_eq!(merged.content.accept_button, "Accept All");
    }

    #[test]
    fn overrides_deserialise_from_partial_json() {
        let json = r#"{
            "position": "top",
            "categories": { "marketing": { "enabled": true } }
        }"#;
        let overrides: ConsentOverrides = serde_json::from_str(json).unwrap();
        assert_eq!(overrides.position, Some(BannerPosition::Top));
        assert_eq!(overrides.categories["marketing"].enabled, Some(true));
        assert!(overrides.theme.is_none());
    }
}
