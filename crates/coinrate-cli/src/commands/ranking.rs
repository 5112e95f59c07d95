use coinrate_core::Config;

use super::{open_tracker, print_json, CmdResult};

pub fn run() -> CmdResult {
    let config = Config::load_or_default();
    let tracker = open_tracker(&config)?;
    print_json(&tracker.ranking())
}
