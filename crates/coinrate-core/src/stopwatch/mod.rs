mod engine;
mod ticker;

pub use engine::{format_mmss, Stopwatch, StopwatchState};
pub use ticker::{Ticker, DEFAULT_TICK};
