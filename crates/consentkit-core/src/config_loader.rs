// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ConsentKit Contributors

//! Configuration-override loaders.
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_overrides`] reads and deserialises a TOML file
//!    into a [`ConsentOverrides`] struct.
//! 2. **Environment variables** — [`load_overrides_from_env`] reads
//!    `CONSENT_`-prefixed environment variables.
//!
//! Both loaders are only available when the `config-loader` feature is
//! active.
//!
//! # File format
//!
//! ```toml
//! position           = "top"        # "top" | "bottom"
//! theme              = "dark"       # "light" | "dark"
//! language           = "de"
//! cookie_expiry_days = 90
//!
//! [categories.analytics]
//! enabled = true
//! ```
//!
//! # Environment variables
//!
//! | Variable                       | Type    |
//! |--------------------------------|---------|
//! | `CONSENT_POSITION`             | string  |
//! | `CONSENT_THEME`                | string  |
//! | `CONSENT_LANGUAGE`             | string  |
//! | `CONSENT_COOKIE_EXPIRY`        | integer |
//! | `CONSENT_AUTO_SHOW`            | boolean |
//! | `CONSENT_RECORD_CONSENT`       | boolean |
//! | `CONSENT_GOOGLE_CONSENT_MODE`  | boolean |
//! | `CONSENT_SHOW_DECLINE_BUTTON`  | boolean |
//!
//! Unset variables leave the corresponding override at `None`.

// Only compile this module when the "config-loader" feature is enabled.
// "config-loader" implies "std", so std facilities are always available here.
#![cfg(feature = "config-loader")]

use std::fmt;
use std::fs;
use std::num::ParseIntError;

use crate::config::{BannerPosition, ConsentOverrides, Theme};

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or parsing configuration overrides.
#[derive(Debug)]
pub enum ConfigError {
    /// A required file could not be opened.
    FileRead { path: String, source: std::io::Error },
    /// The TOML content could not be deserialised.
    TomlParse { source: toml::de::Error },
    /// A field could not be parsed to its expected type.
    ParseField { field: String, value: String, reason: String },
    /// A field value is outside the permitted range.
    InvalidRange { field: String, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead { path, source } =>
                write!(f, "Failed to read config file \"{path}\": {source}"),
            ConfigError::TomlParse { source } =>
                write!(f, "Failed to parse TOML config: {source}"),
            ConfigError::ParseField { field, value, reason } =>
                write!(f, "Field \"{field}\": cannot parse \"{value}\": {reason}"),
            ConfigError::InvalidRange { field, value, reason } =>
                write!(f, "Field \"{field}\": value \"{value}\" out of range: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            ConfigError::TomlParse { source }    => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load [`ConsentOverrides`] from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, if the TOML content
/// does not match the expected schema, or if `cookie_expiry_days` is zero.
///
/// # Example
///
/// ```rust,no_run
/// use consentkit_core::config::ConsentConfig;
/// use consentkit_core::config_loader::load_overrides;
///
/// let overrides = load_overrides("/etc/consentkit/widget.toml").unwrap();
/// let config = ConsentConfig::default().merged(&overrides);
/// ```
pub fn load_overrides(path: &str) -> Result<ConsentOverrides, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_owned(),
        source,
    })?;
    parse_overrides(&content)
}

/// Parse a TOML document into [`ConsentOverrides`].
pub fn parse_overrides(content: &str) -> Result<ConsentOverrides, ConfigError> {
    let overrides = toml::from_str::<ConsentOverrides>(content)
        .map_err(|source| ConfigError::TomlParse { source })?;
    validate(&overrides)?;
    Ok(overrides)
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Load [`ConsentOverrides`] from `CONSENT_`-prefixed environment variables.
///
/// Unset variables leave the corresponding field at `None`.  Type conversion
/// errors are reported as [`ConfigError::ParseField`].
pub fn load_overrides_from_env() -> Result<ConsentOverrides, ConfigError> {
    let mut overrides = ConsentOverrides::default();

    if let Ok(value) = std::env::var("CONSENT_POSITION") {
        overrides.position = Some(parse_position(&value)?);
    }
    if let Ok(value) = std::env::var("CONSENT_THEME") {
        overrides.theme = Some(parse_theme(&value)?);
    }
    if let Ok(value) = std::env::var("CONSENT_LANGUAGE") {
        overrides.language = Some(value);
    }
    overrides.cookie_expiry_days = read_env_u32("CONSENT_COOKIE_EXPIRY")?;
    overrides.auto_show = read_env_bool("CONSENT_AUTO_SHOW")?;
    overrides.record_consent = read_env_bool("CONSENT_RECORD_CONSENT")?;
    overrides.google_consent_mode = read_env_bool("CONSENT_GOOGLE_CONSENT_MODE")?;
    overrides.show_decline_button = read_env_bool("CONSENT_SHOW_DECLINE_BUTTON")?;

    validate(&overrides)?;
    Ok(overrides)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn validate(overrides: &ConsentOverrides) -> Result<(), ConfigError> {
    if let Some(days) = overrides.cookie_expiry_days {
        if days == 0 {
            return Err(ConfigError::InvalidRange {
                field: "cookie_expiry_days".into(),
                value: days.to_string(),
                reason: "must be at least 1 day".into(),
            });
        }
    }
    Ok(())
}

fn parse_position(value: &str) -> Result<BannerPosition, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "top"    => Ok(BannerPosition::Top),
        "bottom" => Ok(BannerPosition::Bottom),
        other => Err(ConfigError::ParseField {
            field: "CONSENT_POSITION".into(),
            value: other.into(),
            reason: "expected one of: top, bottom".into(),
        }),
    }
}

fn parse_theme(value: &str) -> Result<Theme, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "light" => Ok(Theme::Light),
        "dark"  => Ok(Theme::Dark),
        other => Err(ConfigError::ParseField {
            field: "CONSENT_THEME".into(),
            value: other.into(),
            reason: "expected one of: light, dark".into(),
        }),
    }
}

fn read_env_u32(key: &str) -> Result<Option<u32>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|source: ParseIntError| ConfigError::ParseField {
                field: key.to_owned(),
                value,
                reason: source.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn read_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true"  | "1" | "yes" | "on"  => Ok(Some(true)),
            "false" | "0" | "no"  | "off" => Ok(Some(false)),
            other => Err(ConfigError::ParseField {
                field: key.to_owned(),
                value: other.to_owned(),
                reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
            }),
        },
        Err(_) => Ok(None),
    }
}
