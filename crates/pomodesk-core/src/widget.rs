//! The widget's owned state: one config store, one theme registry and one
//! timer engine, built once and handed to the presentation shell.

use crate::error::CoreError;
use crate::storage::{Config, ConfigStore, DataPaths, SessionLog, SessionRecord, WindowGeometry};
use crate::theme::{Theme, ThemeRegistry};
use crate::timer::{Clock, SystemClock, TimerEngine};

#[derive(Debug)]
pub struct Widget {
    paths: DataPaths,
    config_store: ConfigStore,
    config: Config,
    themes: ThemeRegistry,
    engine: TimerEngine,
    closed: bool,
}

impl Widget {
    /// Load config, themes and history from `paths` and build the engine.
    pub fn open(paths: DataPaths) -> Self {
        Self::open_with_clock(paths, SystemClock)
    }

    pub fn open_with_clock(paths: DataPaths, clock: impl Clock + 'static) -> Self {
        let config_store = ConfigStore::new(&paths.config_file);
        let mut config = config_store.load();
        let themes = ThemeRegistry::open(&paths.themes_dir);
        config.theme_key = config.resolve_theme(&themes);

        let log = SessionLog::open(&paths.history_file);
        let engine = TimerEngine::with_clock(&config, log, clock);
        Self {
            paths,
            config_store,
            config,
            themes,
            engine,
            closed: false,
        }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    pub fn themes_mut(&mut self) -> &mut ThemeRegistry {
        &mut self.themes
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TimerEngine {
        &mut self.engine
    }

    pub fn session_log(&self) -> &SessionLog {
        self.engine.session_log()
    }

    /// The active theme.
    pub fn theme(&self) -> &Theme {
        self.themes.resolve(&self.config.theme_key)
    }

    /// Validate and persist new settings, then hand them to the engine.
    ///
    /// # Errors
    /// Returns the validation or save error; nothing changes on failure.
    pub fn update_config(&mut self, mut config: Config) -> Result<(), CoreError> {
        config.theme_key = config.resolve_theme(&self.themes);
        self.config_store.update(&config)?;
        self.engine.apply_config(&config);
        self.config = config;
        Ok(())
    }

    /// Record the window position and size reported by the shell.
    pub fn set_geometry(&mut self, geometry: WindowGeometry) {
        self.config.set_geometry(geometry);
    }

    /// Tear down: cancel the pending tick, log the open session and save the
    /// config with the latest geometry. Returns the logged session, if any.
    ///
    /// Runs at most once; dropping the widget calls it too.
    pub fn shutdown(&mut self, geometry: Option<WindowGeometry>) -> Option<SessionRecord> {
        if self.closed {
            return None;
        }
        self.closed = true;

        if let Some(geometry) = geometry {
            self.set_geometry(geometry);
        }
        let record = self.engine.shutdown();
        if !self.config_store.save(&self.config) {
            tracing::warn!("configuration was not saved on shutdown");
        }
        record
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        self.shutdown(None);
    }
}
