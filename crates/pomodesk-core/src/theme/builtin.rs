use serde_json::Map;
use std::collections::BTreeMap;

use super::{FontSpec, Theme, DEFAULT_THEME_KEY};

struct Palette {
    name: &'static str,
    bg_primary: &'static str,
    bg_secondary: &'static str,
    bg_button: &'static str,
    bg_button_active: &'static str,
    fg_primary: &'static str,
    fg_secondary: &'static str,
    fg_accent: &'static str,
    fg_break: &'static str,
    fg_pause: &'static str,
    btn_close_bg: &'static str,
    btn_close_fg: &'static str,
    font_family: &'static str,
    time_family: &'static str,
}

const DARK: Palette = Palette {
    name: "Dark",
    bg_primary: "#1a1a1a",
    bg_secondary: "#2a2a2a",
    bg_button: "#333333",
    bg_button_active: "#555555",
    fg_primary: "#ffffff",
    fg_secondary: "#888888",
    fg_accent: "#4CAF50",
    fg_break: "#2196F3",
    fg_pause: "#FF9800",
    btn_close_bg: "#ff4444",
    btn_close_fg: "#ffffff",
    font_family: "Arial",
    time_family: "Helvetica",
};

const LIGHT: Palette = Palette {
    name: "Light",
    bg_primary: "#f5f5f5",
    bg_secondary: "#ffffff",
    bg_button: "#e0e0e0",
    bg_button_active: "#c0c0c0",
    fg_primary: "#333333",
    fg_secondary: "#666666",
    fg_accent: "#2E7D32",
    fg_break: "#1565C0",
    fg_pause: "#EF6C00",
    btn_close_bg: "#d32f2f",
    btn_close_fg: "#ffffff",
    font_family: "Arial",
    time_family: "Helvetica",
};

const BLUE: Palette = Palette {
    name: "Blue",
    bg_primary: "#0d1b2a",
    bg_secondary: "#1b263b",
    bg_button: "#415a77",
    bg_button_active: "#778da9",
    fg_primary: "#e0e1dd",
    fg_secondary: "#a0a0a0",
    fg_accent: "#00b4d8",
    fg_break: "#90e0ef",
    fg_pause: "#ffb703",
    btn_close_bg: "#e63946",
    btn_close_fg: "#ffffff",
    font_family: "Segoe UI",
    time_family: "Segoe UI",
};

impl Palette {
    fn theme(&self, key: &str) -> Theme {
        Theme {
            key: key.to_string(),
            display_name: self.name.to_string(),
            bg_primary: self.bg_primary.to_string(),
            bg_secondary: self.bg_secondary.to_string(),
            bg_button: self.bg_button.to_string(),
            bg_button_active: self.bg_button_active.to_string(),
            fg_primary: self.fg_primary.to_string(),
            fg_secondary: self.fg_secondary.to_string(),
            fg_accent: self.fg_accent.to_string(),
            fg_break: self.fg_break.to_string(),
            fg_pause: self.fg_pause.to_string(),
            btn_close_bg: self.btn_close_bg.to_string(),
            btn_close_fg: self.btn_close_fg.to_string(),
            font_time: FontSpec::new(self.time_family, 32, Some("bold")),
            font_text: FontSpec::new(self.font_family, 10, Some("bold")),
            font_button: FontSpec::new(self.font_family, 11, None),
            extra: Map::new(),
        }
    }
}

/// The themes seeded into an empty theme directory: `dark`, `light`, `blue`.
pub fn builtin_themes() -> BTreeMap<String, Theme> {
    [("dark", &DARK), ("light", &LIGHT), ("blue", &BLUE)]
        .into_iter()
        .map(|(key, palette)| (key.to_string(), palette.theme(key)))
        .collect()
}

/// The protected default theme.
pub fn dark_theme() -> Theme {
    DARK.theme(DEFAULT_THEME_KEY)
}
