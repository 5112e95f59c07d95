use clap::Subcommand;
use coinrate_core::Config;

use super::{confirm, open_tracker, print_event, print_json, CmdResult};

#[derive(Subcommand)]
pub enum EntryAction {
    /// Save the last calculated rate
    Save {
        /// Character name
        #[arg(long)]
        character: String,
        /// Skill level (1-6)
        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        skill: i64,
    },
    /// List saved entries, most recent first
    List,
    /// Delete one entry by its timestamp
    Delete {
        /// Entry timestamp (ms since epoch)
        ts: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: EntryAction) -> CmdResult {
    let config = Config::load_or_default();
    let mut tracker = open_tracker(&config)?;

    match action {
        EntryAction::Save { character, skill } => {
            let event = tracker.save(&character, skill)?;
            print_event(&event)?;
        }
        EntryAction::List => {
            print_json(tracker.entries())?;
        }
        EntryAction::Delete { ts, yes } => {
            let Some(entry) = tracker.entries().iter().find(|e| e.ts == ts) else {
                eprintln!("no entry with ts {ts}");
                return Ok(());
            };
            let question = format!(
                "Delete {} (skill {}, {:.1} cpm)?",
                entry.character, entry.skill, entry.cpm
            );
            if !confirm(&question, yes)? {
                eprintln!("cancelled");
                return Ok(());
            }
            if let Some(event) = tracker.delete(ts).await? {
                print_event(&event)?;
            }
        }
        EntryAction::Clear { yes } => {
            let question = format!("Delete all {} entries?", tracker.entries().len());
            if !confirm(&question, yes)? {
                eprintln!("cancelled");
                return Ok(());
            }
            let event = tracker.clear_all().await?;
            print_event(&event)?;
        }
    }
    Ok(())
}
