use clap::Args;
use coinrate_core::{BonusOrder, Config, KvStore, Modifier, Modifiers};
use serde_json::json;

use super::{
    load_json, open_tracker, print_json, save_json, CmdResult, CALC_TIME_KEY, LAST_RESULT_KEY,
};

#[derive(Args)]
pub struct CalcArgs {
    /// Coins collected
    #[arg(long)]
    pub coins: f64,
    /// Play time as MM:SS (defaults to the last `stopwatch apply`)
    #[arg(long)]
    pub time: Option<String>,
    /// Item used: score, coin-bonus, exp, time-extend, bomb, five-to-four
    #[arg(long = "item", value_name = "ITEM")]
    pub items: Vec<Modifier>,
    /// Use no items unless given with --item
    #[arg(long)]
    pub plain: bool,
    /// Override the configured bonus order
    #[arg(long)]
    pub order: Option<BonusOrder>,
}

pub fn run(args: CalcArgs) -> CmdResult {
    let config = Config::load_or_default();
    let mut tracker = open_tracker(&config)?;
    if let Some(order) = args.order {
        tracker = tracker.with_bonus_order(order);
    }

    let time = match args.time {
        Some(time) => time,
        None => load_json::<String>(tracker.kv(), CALC_TIME_KEY)
            .ok_or("no --time given and no stopwatch time applied")?,
    };
    let modifiers = if args.items.is_empty() && !args.plain {
        config.calculator.default_modifiers
    } else {
        Modifiers::from_items(args.items)
    };

    let result = tracker.calculate(&time, args.coins, &modifiers);
    // A non-finite rate cannot be saved; drop any stale one.
    if result.cpm.is_finite() {
        save_json(tracker.kv(), LAST_RESULT_KEY, &result)?;
    } else {
        tracker.kv().kv_remove(LAST_RESULT_KEY)?;
    }

    let items: Vec<&str> = modifiers.items().map(Modifier::as_str).collect();
    print_json(&json!({
        "time": time,
        "coins": args.coins,
        "items": items,
        "result": result,
    }))
}
