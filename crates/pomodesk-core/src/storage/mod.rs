mod config;
pub mod history;

pub use config::{Config, ConfigStore, WindowGeometry};
pub use history::{IntervalType, SessionLog, SessionRecord, Stats};

use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns `~/.config/pomodesk[-dev]/` based on POMODESK_ENV.
///
/// Set POMODESK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMODESK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomodesk-dev")
    } else {
        base_dir.join("pomodesk")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Locations of every file the widget persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub config_file: PathBuf,
    pub history_file: PathBuf,
    pub themes_dir: PathBuf,
}

impl DataPaths {
    /// Lay out the standard file names under `root`.
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_file: root.join("config.json"),
            history_file: root.join("pomodoro_history.json"),
            themes_dir: root.join("themes"),
        }
    }

    /// Paths under [`data_dir`].
    pub fn default_location() -> std::io::Result<Self> {
        Ok(Self::in_dir(data_dir()?))
    }
}

/// Replace `path` with `contents` via a sibling temp file and rename, so a
/// failed write never leaves a truncated file behind.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
