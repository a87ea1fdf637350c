// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cancellable periodic task driving the auto-scroll tick.
//!
//! The task is owned by the `Ticker` guard: dropping the guard aborts
//! it, so a tick can never outlive the viewer that started it. The
//! hosting shell keeps at most one guard alive at a time.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Abort-on-drop handle to a periodic tick task.
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a task invoking `on_tick` every `period`. The first tick
    /// fires after one full period.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut clock = interval(period);
            clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
            clock.tick().await; // completes immediately
            loop {
                clock.tick().await;
                on_tick();
            }
        });
        Self { handle }
    }

    /// Stop ticking. Equivalent to dropping the guard.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ticker_fires_periodically() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let ticker = Ticker::spawn(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        drop(ticker);
        assert!(count.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_drop_cancels_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let ticker = Ticker::spawn(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(ticker);
        let after_drop = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test]
    async fn test_stop_cancels_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let ticker = Ticker::spawn(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        ticker.stop();
        let after_stop = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
