//! Directory-backed theme registry.
//!
//! Every `<key>.json` file in the theme directory is one theme. An absent or
//! empty directory is seeded with the built-in themes, and the `dark` theme is
//! restored whenever it is missing.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::builtin::dark_theme;
use super::{builtin_themes, Theme, DEFAULT_THEME_KEY};
use crate::error::ThemeError;
use crate::storage::write_atomic;

/// Fields an imported theme must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "bg_primary", "fg_primary", "font_time"];

#[derive(Debug)]
pub struct ThemeRegistry {
    dir: PathBuf,
    themes: BTreeMap<String, Theme>,
}

impl ThemeRegistry {
    /// An empty registry over `dir`. Call [`ThemeRegistry::load_all`] to fill it.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            themes: BTreeMap::new(),
        }
    }

    /// Open the registry at `dir` and load every theme.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let mut registry = Self::new(dir);
        registry.load_all();
        registry
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read every theme file, seeding the built-ins when none load.
    ///
    /// Never comes back without at least the `dark` theme, even if the
    /// directory cannot be written.
    pub fn load_all(&mut self) -> &BTreeMap<String, Theme> {
        self.themes = self.read_dir();

        if self.themes.is_empty() {
            tracing::info!(dir = %self.dir.display(), "no themes found, seeding built-in themes");
            self.seed_builtins();
            self.themes = self.read_dir();
        }

        if self.themes.is_empty() {
            tracing::warn!(dir = %self.dir.display(), "theme directory unusable, keeping built-in themes in memory");
            self.themes = builtin_themes();
        }

        if !self.themes.contains_key(DEFAULT_THEME_KEY) {
            tracing::warn!("built-in '{DEFAULT_THEME_KEY}' theme missing, restoring it");
            if let Err(e) = self.save(DEFAULT_THEME_KEY, dark_theme()) {
                tracing::warn!("{e}");
            }
        }

        &self.themes
    }

    /// Import a theme file. The key is the file name without `.json`.
    ///
    /// # Errors
    /// `Validation` naming the first missing required field, `Parse` when the
    /// file is not a valid theme, `Io` when it cannot be read. The registry is
    /// untouched on any of these. `Io` is also returned when the imported copy
    /// cannot be written; the theme is then registered in memory only.
    pub fn import_from(&mut self, path: &Path) -> Result<Theme, ThemeError> {
        let content = std::fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
        let parse_error = |message: String| ThemeError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let value: Value = serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
        let Some(object) = value.as_object() else {
            return Err(parse_error("theme must be a JSON object".into()));
        };
        if let Some(field) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(ThemeError::Validation {
                field: field.to_string(),
            });
        }

        let mut theme: Theme =
            serde_json::from_value(value).map_err(|e| parse_error(e.to_string()))?;
        let key = key_from_path(path)
            .ok_or_else(|| parse_error("cannot derive a theme key from the file name".into()))?;
        theme.key = key.clone();

        self.save(&key, theme.clone())?;
        tracing::info!(key = %key, name = %theme.display_name, "theme imported");
        Ok(theme)
    }

    /// Write the theme `key` to `destination`.
    ///
    /// # Errors
    /// `NotFound` for an unknown key, `Io` when the destination cannot be
    /// written.
    pub fn export_to(&self, key: &str, destination: &Path) -> Result<(), ThemeError> {
        let theme = self
            .themes
            .get(key)
            .ok_or_else(|| ThemeError::NotFound(key.to_string()))?;
        write_theme(destination, theme)
    }

    /// Remove a theme and its file.
    ///
    /// # Errors
    /// `Protected` for `dark` and `NotFound` for an unknown key, both without
    /// touching the registry. `Io` if the file could not be removed; the entry
    /// is still dropped from memory.
    pub fn delete(&mut self, key: &str) -> Result<(), ThemeError> {
        if key == DEFAULT_THEME_KEY {
            return Err(ThemeError::Protected(key.to_string()));
        }
        if self.themes.remove(key).is_none() {
            return Err(ThemeError::NotFound(key.to_string()));
        }

        let path = self.file_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ThemeError::io(path, e)),
        }
    }

    /// Create or overwrite the theme `key`, in memory and on disk.
    ///
    /// # Errors
    /// `Validation` if `key` is not a plain file stem, `Io` if the file cannot
    /// be written (the in-memory entry is updated regardless).
    pub fn save(&mut self, key: &str, mut theme: Theme) -> Result<(), ThemeError> {
        if !is_valid_key(key) {
            return Err(ThemeError::Validation {
                field: "key".into(),
            });
        }
        theme.key = key.to_string();
        let path = self.file_for(key);
        self.themes.insert(key.to_string(), theme);
        write_theme(&path, &self.themes[key])
    }

    pub fn get(&self, key: &str) -> Option<&Theme> {
        self.themes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.themes.contains_key(key)
    }

    /// The theme `key`, or `dark` when it is unknown.
    pub fn resolve(&self, key: &str) -> &Theme {
        self.themes
            .get(key)
            .or_else(|| self.themes.get(DEFAULT_THEME_KEY))
            .unwrap_or_else(|| &*FALLBACK)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn themes(&self) -> &BTreeMap<String, Theme> {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_dir(&self) -> BTreeMap<String, Theme> {
        let mut themes = BTreeMap::new();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "cannot read theme directory");
                }
                return themes;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = key_from_path(&path) else {
                continue;
            };
            match read_theme(&path) {
                Ok(mut theme) => {
                    theme.key = key.clone();
                    themes.insert(key, theme);
                }
                Err(e) => tracing::warn!("skipping theme: {e}"),
            }
        }
        themes
    }

    fn seed_builtins(&mut self) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "cannot create theme directory");
            return;
        }
        for (key, theme) in builtin_themes() {
            if let Err(e) = write_theme(&self.file_for(&key), &theme) {
                tracing::warn!("{e}");
            }
        }
    }
}

static FALLBACK: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(dark_theme);

fn key_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    is_valid_key(stem).then(|| stem.to_string())
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\'])
}

fn read_theme(path: &Path) -> Result<Theme, ThemeError> {
    let content = std::fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| ThemeError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_theme(path: &Path, theme: &Theme) -> Result<(), ThemeError> {
    let content = serde_json::to_string_pretty(theme).map_err(|e| ThemeError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_atomic(path, &content).map_err(|e| ThemeError::io(path, e))
}
