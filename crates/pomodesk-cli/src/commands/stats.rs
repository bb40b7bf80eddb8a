use clap::Subcommand;
use pomodesk_core::{DataPaths, SessionLog};

use super::CommandResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// All-time totals and the most recent sessions
    Show {
        /// Number of recent sessions to list
        #[arg(long, default_value = "10")]
        recent: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Delete the whole session history
    Clear,
}

pub fn run(paths: &DataPaths, action: StatsAction) -> CommandResult {
    let mut log = SessionLog::open(&paths.history_file);

    match action {
        StatsAction::Show { recent, json } => {
            let stats = log.aggregate();
            if json {
                let recent: Vec<_> = log.recent(recent).collect();
                let out = serde_json::json!({ "stats": stats, "recent": recent });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("Sessions:   {}", stats.total_sessions);
            println!(
                "Work:       {} min ({} h {} min)",
                stats.total_work_seconds / 60,
                stats.total_work_seconds / 3600,
                stats.total_work_seconds % 3600 / 60
            );
            println!("Break:      {} min", stats.total_break_seconds / 60);
            println!();

            if log.is_empty() {
                println!("History is empty");
            }
            for (i, record) in log.recent(recent).enumerate() {
                println!(
                    "{:>2}. {} | {:5} | {} min",
                    i + 1,
                    record.start_timestamp.format("%Y-%m-%d %H:%M"),
                    record.interval_type.as_str(),
                    record.duration_seconds / 60
                );
            }
        }
        StatsAction::Clear => {
            log.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}
