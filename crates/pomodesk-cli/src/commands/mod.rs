pub mod config;
pub mod run;
pub mod stats;
pub mod theme;

/// Error type shared by every subcommand.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
