use std::path::PathBuf;

use clap::Subcommand;
use coinrate_core::transfer::export_file_name;
use coinrate_core::Config;

use super::{confirm, open_tracker, print_event, print_json, CmdResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write all entries to a JSON file
    Export {
        /// Output path (default: cpm-entries-YYYY-MM-DD.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Merge entries from a JSON file; the file wins on matching timestamps
    Import {
        path: PathBuf,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut tracker = open_tracker(&config)?;

    match action {
        DataAction::Export { out } => {
            let path = out.unwrap_or_else(|| {
                PathBuf::from(export_file_name(chrono::Local::now().date_naive()))
            });
            std::fs::write(&path, tracker.export()?)?;
            println!("exported {} entries to {}", tracker.entries().len(), path.display());
        }
        DataAction::Import { path, yes } => {
            let text = std::fs::read_to_string(&path)?;
            let question = format!(
                "Import {} into {} existing entries? Matching entries are overwritten.",
                path.display(),
                tracker.entries().len()
            );
            if !confirm(&question, yes)? {
                eprintln!("cancelled");
                return Ok(());
            }
            let event = tracker.import(&text)?;
            print_event(&event)?;
        }
    }
    Ok(())
}
