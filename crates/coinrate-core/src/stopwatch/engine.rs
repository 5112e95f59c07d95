//! Stopwatch state machine.
//!
//! Like a lap timer it only counts up. Elapsed time always comes from
//! wall-clock deltas, so it stays exact however irregularly it is sampled.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running ...
//!    ^_________ reset (from any) ____|
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Count-up stopwatch.
///
/// Serializable so a front end can keep it across process restarts; the
/// anchor is a wall-clock timestamp, so a running stopwatch keeps counting
/// while nobody is looking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    state: StopwatchState,
    /// Milliseconds banked by finished run segments.
    accumulated_ms: u64,
    /// Epoch ms at which the current run segment began. `None` unless running.
    #[serde(default)]
    anchor_ms: Option<u64>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Running
    }

    pub fn elapsed_ms(&self, clock: &impl Clock) -> u64 {
        let running = self
            .anchor_ms
            .map(|anchor| clock.now_ms().saturating_sub(anchor))
            .unwrap_or(0);
        self.accumulated_ms + running
    }

    /// Elapsed time as `MM:SS`.
    pub fn display(&self, clock: &impl Clock) -> String {
        format_mmss(self.elapsed_ms(clock))
    }

    /// The displayed time, handed to the calculator's time field.
    /// Does not touch the stopwatch.
    pub fn apply(&self, clock: &impl Clock) -> String {
        self.display(clock)
    }

    pub fn snapshot(&self, clock: &impl Clock) -> Event {
        let elapsed_ms = self.elapsed_ms(clock);
        Event::StopwatchSnapshot {
            state: self.state,
            elapsed_ms,
            display: format_mmss(elapsed_ms),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, clock: &impl Clock) -> Option<Event> {
        match self.state {
            StopwatchState::Stopped | StopwatchState::Paused => {
                self.state = StopwatchState::Running;
                self.anchor_ms = Some(clock.now_ms());
                Some(Event::StopwatchStarted {
                    elapsed_ms: self.accumulated_ms,
                    at: Utc::now(),
                })
            }
            StopwatchState::Running => None,
        }
    }

    pub fn pause(&mut self, clock: &impl Clock) -> Option<Event> {
        if self.state != StopwatchState::Running {
            return None;
        }
        self.accumulated_ms = self.elapsed_ms(clock);
        self.anchor_ms = None;
        self.state = StopwatchState::Paused;
        Some(Event::StopwatchPaused {
            elapsed_ms: self.accumulated_ms,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.state = StopwatchState::Stopped;
        self.accumulated_ms = 0;
        self.anchor_ms = None;
        Event::StopwatchReset { at: Utc::now() }
    }
}

/// Zero-padded `MM:SS`; hours are dropped, so minutes wrap at 60.
pub fn format_mmss(ms: u64) -> String {
    let seconds = (ms / 1000) % 60;
    let minutes = (ms / 60_000) % 60;
    format!("{minutes:02}:{seconds:02}")
}
