//! Settings store.
//!
//! Settings live under [`SETTINGS_KEY`] as a JSON object with the keys
//! `theme`, `fontSize`, and `saveHistory`. Reads tolerate anything: a missing
//! key, a malformed object, or an unknown enum value all fall back to the
//! default for that field. Writes are read-merge-write, so keys this client
//! does not know about are preserved.

use serde_json::{Map, Value};

use super::Persistence;
use crate::storage::{DRAFT_KEY, HISTORY_KEY, KeyValueStore, SETTINGS_KEY};

/// Colour theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// Follow the system colour scheme.
    #[default]
    Auto,
    Dark,
    LightDefault,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Dark => "dark",
            Self::LightDefault => "light-default",
        }
    }

    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "dark" => Some(Self::Dark),
            "light-default" | "light" => Some(Self::LightDefault),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transcript font size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            _ => None,
        }
    }
}

impl std::fmt::Display for FontSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub theme: Theme,
    pub font_size: FontSize,
    pub save_history: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            font_size: FontSize::Medium,
            save_history: true,
        }
    }
}

/// Partial settings change; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub font_size: Option<FontSize>,
    pub save_history: Option<bool>,
}

impl SettingsUpdate {
    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn font_size(font_size: FontSize) -> Self {
        Self {
            font_size: Some(font_size),
            ..Self::default()
        }
    }

    pub fn save_history(save: bool) -> Self {
        Self {
            save_history: Some(save),
            ..Self::default()
        }
    }
}

impl<S: KeyValueStore> Persistence<S> {
    /// Load settings with defaults applied.
    pub fn load_settings(&self) -> Settings {
        let raw = self.raw_settings();
        let defaults = Settings::default();

        Settings {
            theme: raw
                .get("theme")
                .and_then(Value::as_str)
                .and_then(Theme::parse)
                .unwrap_or(defaults.theme),
            font_size: raw
                .get("fontSize")
                .and_then(Value::as_str)
                .and_then(FontSize::parse)
                .unwrap_or(defaults.font_size),
            // Only an explicit `false` turns history off.
            save_history: raw.get("saveHistory") != Some(&Value::Bool(false)),
        }
    }

    /// Whether history and draft persistence are enabled.
    pub fn save_history_enabled(&self) -> bool {
        self.load_settings().save_history
    }

    /// Merge `update` into the stored settings object.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        let mut raw = self.raw_settings();
        if let Some(theme) = update.theme {
            raw.insert("theme".into(), Value::from(theme.as_str()));
        }
        if let Some(size) = update.font_size {
            raw.insert("fontSize".into(), Value::from(size.as_str()));
        }
        if let Some(save) = update.save_history {
            raw.insert("saveHistory".into(), Value::Bool(save));
        }

        let encoded = Value::Object(raw).to_string();
        self.write(SETTINGS_KEY, &encoded);
    }

    /// Persist the save-history flag.
    ///
    /// Turning it off deletes the saved history and draft outright; turning
    /// it back on starts from nothing.
    pub fn set_save_history(&mut self, save: bool) {
        self.update_settings(SettingsUpdate::save_history(save));
        if !save {
            self.delete(HISTORY_KEY);
            self.delete(DRAFT_KEY);
        }
    }

    fn raw_settings(&self) -> Map<String, Value> {
        self.store()
            .get(SETTINGS_KEY)
            .and_then(|s| serde_json::from_str::<Value>(&s).ok())
            .and_then(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default()
    }
}
