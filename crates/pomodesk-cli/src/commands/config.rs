use clap::Subcommand;
use pomodesk_core::{Config, ConfigStore, DataPaths};

use super::CommandResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key as stored in config.json (e.g. "work_time_minutes", "theme")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(paths: &DataPaths, action: ConfigAction) -> CommandResult {
    let store = ConfigStore::new(&paths.config_file);
    match action {
        ConfigAction::Get { key } => {
            let config = store.load();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = store.load();
            config.set(&key, &value)?;
            store.update(&config)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = store.load();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            if !store.save(&Config::default()) {
                return Err(format!("cannot write {}", store.path().display()).into());
            }
            println!("config reset to defaults");
        }
    }
    Ok(())
}
