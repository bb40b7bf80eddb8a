//! JSON-based widget configuration.
//!
//! Stores user preferences including:
//! - Work and break durations and their display labels
//! - Window opacity and geometry
//! - Selected theme
//! - Notification and auto-start flags
//!
//! Configuration is stored at `~/.config/pomodesk/config.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::write_atomic;
use crate::error::{ConfigError, CoreError, ValidationError};
use crate::theme::{ThemeRegistry, DEFAULT_THEME_KEY};

/// Minimum window width accepted by the settings validation (exclusive).
pub const MIN_WINDOW_WIDTH: u32 = 150;
/// Minimum window height accepted by the settings validation (exclusive).
pub const MIN_WINDOW_HEIGHT: u32 = 80;

/// Application configuration.
///
/// Field names on disk follow the historic `config.json` schema, so the Rust
/// names are mapped with `rename`. Every field has a default, which makes a
/// partial file merge over the default table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "work_time_minutes", default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(rename = "break_time_minutes", default = "default_break_minutes")]
    pub break_minutes: u32,
    #[serde(rename = "window_opacity", default = "default_opacity")]
    pub opacity: f64,
    #[serde(rename = "window_position_x", default = "default_position")]
    pub x: i32,
    #[serde(rename = "window_position_y", default = "default_position")]
    pub y: i32,
    #[serde(rename = "window_width", default = "default_width")]
    pub width: u32,
    #[serde(rename = "window_height", default = "default_height")]
    pub height: u32,
    #[serde(rename = "theme", default = "default_theme")]
    pub theme_key: String,
    #[serde(rename = "show_notifications", default = "default_true")]
    pub sound_enabled: bool,
    #[serde(rename = "auto_start_break", default = "default_true")]
    pub auto_start_next: bool,
    #[serde(rename = "work_text", default = "default_work_label")]
    pub work_label: String,
    #[serde(rename = "break_text", default = "default_break_label")]
    pub break_label: String,
}

/// Window position and size as last reported by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

// Default functions
fn default_work_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}
fn default_opacity() -> f64 {
    0.95
}
fn default_position() -> i32 {
    100
}
fn default_width() -> u32 {
    240
}
fn default_height() -> u32 {
    100
}
fn default_theme() -> String {
    DEFAULT_THEME_KEY.into()
}
fn default_true() -> bool {
    true
}
fn default_work_label() -> String {
    "WORK".into()
}
fn default_break_label() -> String {
    "BREAK".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            opacity: default_opacity(),
            x: default_position(),
            y: default_position(),
            width: default_width(),
            height: default_height(),
            theme_key: default_theme(),
            sound_enabled: true,
            auto_start_next: true,
            work_label: default_work_label(),
            break_label: default_break_label(),
        }
    }
}

impl Config {
    pub fn work_seconds(&self) -> u64 {
        u64::from(self.work_minutes) * 60
    }

    pub fn break_seconds(&self) -> u64 {
        u64::from(self.break_minutes) * 60
    }

    pub fn geometry(&self) -> WindowGeometry {
        WindowGeometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_geometry(&mut self, geometry: WindowGeometry) {
        self.x = geometry.x;
        self.y = geometry.y;
        self.width = geometry.width;
        self.height = geometry.height;
    }

    /// Check every field against the settings rules. Reports the first
    /// offending field by its on-disk key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.work_minutes == 0 {
            return Err(ValidationError::invalid(
                "work_time_minutes",
                "must be a positive number of minutes",
            ));
        }
        if self.break_minutes == 0 {
            return Err(ValidationError::invalid(
                "break_time_minutes",
                "must be a positive number of minutes",
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ValidationError::invalid(
                "window_opacity",
                "must be between 0.0 and 1.0",
            ));
        }
        if self.width <= MIN_WINDOW_WIDTH {
            return Err(ValidationError::invalid(
                "window_width",
                format!("must be greater than {MIN_WINDOW_WIDTH}"),
            ));
        }
        if self.height <= MIN_WINDOW_HEIGHT {
            return Err(ValidationError::invalid(
                "window_height",
                format!("must be greater than {MIN_WINDOW_HEIGHT}"),
            ));
        }
        if self.work_label.trim().is_empty() {
            return Err(ValidationError::invalid("work_text", "must not be empty"));
        }
        if self.break_label.trim().is_empty() {
            return Err(ValidationError::invalid("break_text", "must not be empty"));
        }
        Ok(())
    }

    /// Coerce every field that fails validation back to its default.
    /// Returns the on-disk keys that were replaced.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let defaults = Config::default();
        let mut replaced = Vec::new();

        if self.work_minutes == 0 {
            self.work_minutes = defaults.work_minutes;
            replaced.push("work_time_minutes");
        }
        if self.break_minutes == 0 {
            self.break_minutes = defaults.break_minutes;
            replaced.push("break_time_minutes");
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            self.opacity = defaults.opacity;
            replaced.push("window_opacity");
        }
        if self.width <= MIN_WINDOW_WIDTH {
            self.width = defaults.width;
            replaced.push("window_width");
        }
        if self.height <= MIN_WINDOW_HEIGHT {
            self.height = defaults.height;
            replaced.push("window_height");
        }
        if self.theme_key.trim().is_empty() {
            self.theme_key = defaults.theme_key;
            replaced.push("theme");
        }
        if self.work_label.trim().is_empty() {
            self.work_label = defaults.work_label;
            replaced.push("work_text");
        }
        if self.break_label.trim().is_empty() {
            self.break_label = defaults.break_label;
            replaced.push("break_text");
        }
        replaced
    }

    /// The configured theme key if the registry knows it, otherwise `dark`.
    pub fn resolve_theme(&self, registry: &ThemeRegistry) -> String {
        if registry.contains(&self.theme_key) {
            self.theme_key.clone()
        } else {
            tracing::warn!(
                theme = %self.theme_key,
                "configured theme is not registered, falling back to '{DEFAULT_THEME_KEY}'"
            );
            DEFAULT_THEME_KEY.to_string()
        }
    }

    /// Merge a parsed JSON object over the default table.
    ///
    /// Each known key is taken from `loaded` only if the record still
    /// deserializes with it; keys of the wrong shape keep their default.
    fn merge_over_defaults(loaded: &Map<String, Value>) -> Self {
        let mut merged = match serde_json::to_value(Config::default()) {
            Ok(Value::Object(map)) => map,
            _ => return Config::default(),
        };

        let known: Vec<String> = merged.keys().cloned().collect();
        for key in known {
            let Some(value) = loaded.get(&key) else {
                continue;
            };
            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value.clone());
            if serde_json::from_value::<Config>(Value::Object(candidate)).is_ok() {
                merged.insert(key, value.clone());
            } else {
                tracing::warn!(key = %key, value = %value, "ignoring config value of the wrong type");
            }
        }

        for key in loaded.keys().filter(|k| !merged.contains_key(*k)) {
            tracing::debug!(key = %key, "dropping unknown config key");
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    /// Get a config value as string by its on-disk key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by its on-disk key, parsing `value` according to the
    /// type of the current value. The record is validated before it replaces
    /// `self`; nothing is persisted here.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, or
    /// the updated record fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let new_value = match existing {
            Value::Bool(_) => Value::Bool(value.parse::<bool>().map_err(|_| invalid())?),
            Value::Number(n) if n.is_f64() => value
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(invalid)?,
            Value::Number(_) => Value::Number(value.parse::<i64>().map_err(|_| invalid())?.into()),
            _ => Value::String(value.into()),
        };
        obj.insert(key.to_string(), new_value);

        let updated: Config = serde_json::from_value(json).map_err(|_| invalid())?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Loads and persists the single [`Config`] record.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load from disk, merging over defaults. Never fails.
    ///
    /// A missing or unparseable file yields the defaults; either way the
    /// merged record is written back so the file always carries the full
    /// schema.
    pub fn load(&self) -> Config {
        let mut config = match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => Config::merge_over_defaults(&map),
                Ok(_) => {
                    tracing::warn!(path = %self.path.display(), "config is not a JSON object, using defaults");
                    Config::default()
                }
                Err(e) => {
                    let err = ConfigError::ParseFailed(e.to_string());
                    tracing::warn!(path = %self.path.display(), "{err}, using defaults");
                    Config::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read config, using defaults");
                Config::default()
            }
        };

        for key in config.sanitize() {
            tracing::warn!(key, "invalid config value replaced with default");
        }

        self.save(&config);
        config
    }

    /// Persist to disk. Returns `false` (after logging) if the write failed.
    pub fn save(&self, config: &Config) -> bool {
        match self.try_save(config) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        }
    }

    /// Validate, then persist.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first bad field, or a save error.
    pub fn update(&self, config: &Config) -> Result<(), CoreError> {
        config.validate()?;
        self.try_save(config)?;
        Ok(())
    }

    fn try_save(&self, config: &Config) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: self.path.clone(),
            message,
        };
        let content =
            serde_json::to_string_pretty(config).map_err(|e| save_failed(e.to_string()))?;
        write_atomic(&self.path, &content).map_err(|e| save_failed(e.to_string()))
    }
}
