//! Periodic sampling tick for live stopwatch displays.
//!
//! The tick only triggers a redraw; the displayed value is always recomputed
//! from the wall clock, so late or skipped ticks never skew it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default sampling period.
pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

/// Handle to a recurring callback on the tokio runtime.
///
/// Dropping the handle cancels the tick.
#[derive(Debug)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Run `on_tick` every `period` until cancelled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let mut ticker = Ticker::spawn(Duration::from_millis(30), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(ticker.is_active());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let ticked = count.load(Ordering::SeqCst);
        assert!(ticked >= 3, "expected several ticks, got {ticked}");

        ticker.cancel();
        assert!(!ticker.is_active());
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticked);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_ticking() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(DEFAULT_TICK, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(ticker);
        let ticked = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticked);
    }
}
