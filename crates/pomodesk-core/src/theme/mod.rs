//! Visual themes for the widget.
//!
//! A theme is a JSON file `<key>.json` in the theme directory holding a
//! display name, the widget colors and three font descriptors. The `dark`
//! theme is built in and always present.

mod builtin;
mod registry;

pub use builtin::{builtin_themes, dark_theme};
pub use registry::{ThemeRegistry, REQUIRED_FIELDS};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::storage::IntervalType;

/// Key of the protected built-in theme.
pub const DEFAULT_THEME_KEY: &str = "dark";

/// A font as `[family, size, (weight)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    pub size: i32,
    pub weight: Option<String>,
}

impl FontSpec {
    pub fn new(family: &str, size: i32, weight: Option<&str>) -> Self {
        Self {
            family: family.to_string(),
            size,
            weight: weight.map(str::to_string),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawFont {
    Weighted(String, i32, String),
    Plain(String, i32),
}

impl Serialize for FontSpec {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let raw = match &self.weight {
            Some(weight) => RawFont::Weighted(self.family.clone(), self.size, weight.clone()),
            None => RawFont::Plain(self.family.clone(), self.size),
        };
        raw.serialize(s)
    }
}

impl<'de> Deserialize<'de> for FontSpec {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match RawFont::deserialize(d)? {
            RawFont::Weighted(family, size, weight) => FontSpec {
                family,
                size,
                weight: Some(weight),
            },
            RawFont::Plain(family, size) => FontSpec {
                family,
                size,
                weight: None,
            },
        })
    }
}

/// A theme record.
///
/// `name`, `bg_primary`, `fg_primary` and `font_time` are required; the other
/// colors and fonts fall back to the dark palette. Keys the widget does not
/// know are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Derived from the file name, never stored inside the file.
    #[serde(skip)]
    pub key: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub bg_primary: String,
    #[serde(default = "defaults::bg_secondary")]
    pub bg_secondary: String,
    #[serde(default = "defaults::bg_button")]
    pub bg_button: String,
    #[serde(default = "defaults::bg_button_active")]
    pub bg_button_active: String,
    pub fg_primary: String,
    #[serde(default = "defaults::fg_secondary")]
    pub fg_secondary: String,
    #[serde(default = "defaults::fg_accent")]
    pub fg_accent: String,
    #[serde(default = "defaults::fg_break")]
    pub fg_break: String,
    #[serde(default = "defaults::fg_pause")]
    pub fg_pause: String,
    #[serde(default = "defaults::btn_close_bg")]
    pub btn_close_bg: String,
    #[serde(default = "defaults::btn_close_fg")]
    pub btn_close_fg: String,
    pub font_time: FontSpec,
    #[serde(default = "defaults::font_text")]
    pub font_text: FontSpec,
    #[serde(default = "defaults::font_button")]
    pub font_button: FontSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Theme {
    /// Color of the countdown text: the pause color while paused, otherwise
    /// the accent for Work and the break color for Break.
    pub fn time_color(&self, mode: IntervalType, paused: bool) -> &str {
        if paused {
            return &self.fg_pause;
        }
        match mode {
            IntervalType::Work => &self.fg_accent,
            IntervalType::Break => &self.fg_break,
        }
    }
}

mod defaults {
    use super::FontSpec;

    pub fn bg_secondary() -> String {
        "#2a2a2a".into()
    }
    pub fn bg_button() -> String {
        "#333333".into()
    }
    pub fn bg_button_active() -> String {
        "#555555".into()
    }
    pub fn fg_secondary() -> String {
        "#888888".into()
    }
    pub fn fg_accent() -> String {
        "#4CAF50".into()
    }
    pub fn fg_break() -> String {
        "#2196F3".into()
    }
    pub fn fg_pause() -> String {
        "#FF9800".into()
    }
    pub fn btn_close_bg() -> String {
        "#ff4444".into()
    }
    pub fn btn_close_fg() -> String {
        "#ffffff".into()
    }
    pub fn font_text() -> FontSpec {
        FontSpec::new("Arial", 10, Some("bold"))
    }
    pub fn font_button() -> FontSpec {
        FontSpec::new("Arial", 11, None)
    }
}
