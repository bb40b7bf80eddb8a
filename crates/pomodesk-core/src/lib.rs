//! # Pomodesk Core Library
//!
//! This library provides the core logic of the Pomodesk desktop timer widget:
//! the Work/Break countdown state machine and the files it persists. Any
//! presentation shell (the bundled terminal CLI, or a windowed front end) is a
//! thin layer that drives the engine and renders its snapshots.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a single-threaded state machine; the caller invokes
//!   `tick()` about once per second while it is running
//! - **Storage**: JSON configuration merged over a default table, and an
//!   append-only JSON session history
//! - **Themes**: one JSON file per theme, with protected built-ins
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`ConfigStore`]: Configuration load/merge/save
//! - [`ThemeRegistry`]: Theme files
//! - [`SessionLog`]: Session history and statistics
//! - [`Widget`]: Owns one of each and performs shutdown

pub mod error;
pub mod events;
pub mod storage;
pub mod theme;
pub mod timer;
pub mod widget;

pub use error::{ConfigError, CoreError, HistoryError, ThemeError, ValidationError};
pub use events::Event;
pub use storage::{
    Config, ConfigStore, DataPaths, IntervalType, SessionLog, SessionRecord, Stats, WindowGeometry,
};
pub use theme::{FontSpec, Theme, ThemeRegistry, DEFAULT_THEME_KEY};
pub use timer::{Clock, ManualClock, SystemClock, TimerEngine, TimerSnapshot, TimerState};
pub use widget::Widget;
