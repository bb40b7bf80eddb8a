use clap::{Parser, Subcommand};
use pomodesk_core::DataPaths;
use std::path::PathBuf;

mod commands;
mod logging;
mod render;

#[derive(Parser)]
#[command(name = "pomodesk", version, about = "Pomodesk work/break timer")]
struct Cli {
    /// Directory holding config.json, themes/ and the session history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the countdown in this terminal
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Theme management
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => Ok(DataPaths::in_dir(dir)),
        None => DataPaths::default_location(),
    };
    let result: commands::CommandResult = paths
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|paths| match cli.command {
            Commands::Run(args) => commands::run::run(paths, args),
            Commands::Config { action } => commands::config::run(&paths, action),
            Commands::Theme { action } => commands::theme::run(&paths, action),
            Commands::Stats { action } => commands::stats::run(&paths, action),
        });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
