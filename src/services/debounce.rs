//! Input debouncing
//!
//! Turns a rapidly changing input into a single settled value once the input
//! has been quiet for a fixed interval. Each input starts a timer task; the
//! previous timer is aborted first, and dropping the debouncer aborts the
//! last one, so no settle is delivered after teardown.
//!
//! Settles carry the generation of the input that armed them. A timer can
//! fire and queue its value just before a newer input arrives; `accept`
//! discards such leftovers so only the latest input ever settles.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Owned timer task, aborted when dropped
#[derive(Debug)]
pub struct TimerGuard(JoinHandle<()>);

impl TimerGuard {
    fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A value whose quiet interval elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T> {
    pub generation: u64,
    pub value: T,
}

/// Debounce controller for a single input
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet_interval: Duration,
    settled_tx: mpsc::UnboundedSender<Settled<T>>,
    generation: u64,
    pending: Option<TimerGuard>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(quiet_interval: Duration, settled_tx: mpsc::UnboundedSender<Settled<T>>) -> Self {
        Self {
            quiet_interval,
            settled_tx,
            generation: 0,
            pending: None,
        }
    }

    /// Creates a debouncer together with the receiver its settles arrive on
    pub fn channel(quiet_interval: Duration) -> (Self, mpsc::UnboundedReceiver<Settled<T>>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        (Self::new(quiet_interval, settled_tx), settled_rx)
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet_interval
    }

    /// Records a new input value and restarts the quiet interval.
    ///
    /// Empty or repeated values take the same path as any other.
    pub fn input(&mut self, value: T) {
        // Abort the previous timer before arming the next
        self.pending = None;
        self.generation += 1;

        let generation = self.generation;
        let deadline = Instant::now() + self.quiet_interval;
        let settled_tx = self.settled_tx.clone();

        let task = tokio::spawn(async move {
            sleep_until(deadline).await;
            // Receiver gone means the consumer was torn down
            let _ = settled_tx.send(Settled { generation, value });
        });

        self.pending = Some(TimerGuard(task));
    }

    /// Accepts a settle if it belongs to the most recent input
    pub fn accept(&mut self, settled: Settled<T>) -> Option<T> {
        if settled.generation != self.generation {
            tracing::trace!(
                generation = settled.generation,
                current = self.generation,
                "Discarding superseded settle"
            );
            return None;
        }

        self.pending = None;
        Some(settled.value)
    }

    /// Cancels the pending timer, if any. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        // A later settle of the cancelled generation must not be accepted
        self.generation += 1;
        self.pending
            .take()
            .map(|timer| !timer.is_finished())
            .unwrap_or(false)
    }

    /// Whether an input is still waiting out its quiet interval
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|timer| !timer.is_finished())
            .unwrap_or(false)
    }
}
