use clap::Subcommand;
use pomodesk_core::{ConfigStore, DataPaths, ThemeRegistry, DEFAULT_THEME_KEY};
use std::path::PathBuf;

use super::CommandResult;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// List installed themes
    List,
    /// Print a theme as JSON
    Show {
        /// Theme key (file name without .json)
        key: String,
    },
    /// Import a theme file; its file name becomes the key
    Import {
        /// Path to the theme JSON file
        path: PathBuf,
    },
    /// Write a theme to a file
    Export {
        /// Theme key
        key: String,
        /// Destination file
        destination: PathBuf,
    },
    /// Delete a theme (the built-in "dark" theme cannot be deleted)
    Delete {
        /// Theme key
        key: String,
    },
    /// Make a theme the active one
    Use {
        /// Theme key
        key: String,
    },
}

pub fn run(paths: &DataPaths, action: ThemeAction) -> CommandResult {
    let mut registry = ThemeRegistry::open(&paths.themes_dir);

    match action {
        ThemeAction::List => {
            let active = ConfigStore::new(&paths.config_file).load().theme_key;
            for (key, theme) in registry.themes() {
                let marker = if *key == active { "*" } else { " " };
                println!("{marker} {key:<12} {}", theme.display_name);
            }
        }
        ThemeAction::Show { key } => {
            let theme = registry
                .get(&key)
                .ok_or_else(|| format!("theme not found: {key}"))?;
            println!("{}", serde_json::to_string_pretty(theme)?);
        }
        ThemeAction::Import { path } => {
            let theme = registry.import_from(&path)?;
            println!("imported '{}' as {}", theme.display_name, theme.key);
        }
        ThemeAction::Export { key, destination } => {
            registry.export_to(&key, &destination)?;
            println!("exported {key} to {}", destination.display());
        }
        ThemeAction::Delete { key } => {
            registry.delete(&key)?;
            let store = ConfigStore::new(&paths.config_file);
            let mut config = store.load();
            if config.theme_key == key {
                config.theme_key = DEFAULT_THEME_KEY.to_string();
                store.update(&config)?;
            }
            println!("deleted {key}");
        }
        ThemeAction::Use { key } => {
            if !registry.contains(&key) {
                return Err(format!("theme not found: {key}").into());
            }
            let store = ConfigStore::new(&paths.config_file);
            let mut config = store.load();
            config.theme_key = key.clone();
            store.update(&config)?;
            println!("using {key}");
        }
    }
    Ok(())
}
