use std::io::Write;

use clap::Subcommand;
use coinrate_core::storage::Database;
use coinrate_core::{Config, Stopwatch, SystemClock, Ticker};
use serde_json::json;

use super::{load_json, print_json, save_json, CmdResult, CALC_TIME_KEY};

const STOPWATCH_KEY: &str = "stopwatch";

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Start or resume counting
    Start,
    /// Pause counting
    Pause,
    /// Stop and zero the stopwatch
    Reset,
    /// Print the current reading as JSON
    Status,
    /// Use the current reading as the default `calc --time`
    Apply,
    /// Show a live reading until Ctrl-C
    Watch,
}

pub async fn run(action: StopwatchAction) -> CmdResult {
    let db = Database::open()?;
    let mut stopwatch = load_json::<Stopwatch>(&db, STOPWATCH_KEY).unwrap_or_default();
    let clock = SystemClock;

    match action {
        StopwatchAction::Start => match stopwatch.start(&clock) {
            Some(event) => print_json(&event)?,
            None => print_json(&stopwatch.snapshot(&clock))?,
        },
        StopwatchAction::Pause => match stopwatch.pause(&clock) {
            Some(event) => print_json(&event)?,
            None => print_json(&stopwatch.snapshot(&clock))?,
        },
        StopwatchAction::Reset => {
            print_json(&stopwatch.reset())?;
        }
        StopwatchAction::Status => {
            print_json(&stopwatch.snapshot(&clock))?;
        }
        StopwatchAction::Apply => {
            let time = stopwatch.apply(&clock);
            save_json(&db, CALC_TIME_KEY, &time)?;
            print_json(&json!({ "time": time }))?;
        }
        StopwatchAction::Watch => {
            watch(&stopwatch).await?;
            return Ok(());
        }
    }

    save_json(&db, STOPWATCH_KEY, &stopwatch)?;
    Ok(())
}

/// Redraw the reading on every tick until interrupted. State is not changed.
async fn watch(stopwatch: &Stopwatch) -> CmdResult {
    if !stopwatch.is_running() {
        println!("{}", stopwatch.display(&SystemClock));
        return Ok(());
    }

    let config = Config::load_or_default();
    let snapshot = stopwatch.clone();
    let mut ticker = Ticker::spawn(config.tick_period(), move || {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{}", snapshot.display(&SystemClock));
        let _ = out.flush();
    });

    tokio::signal::ctrl_c().await?;
    ticker.cancel();
    println!();
    Ok(())
}
