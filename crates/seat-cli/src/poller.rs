//! Periodic refresh loop for `seatgrid watch`.
//!
//! The engine is pure; this loop owns the clock. Each tick produces a fresh value
//! (a grid), which is forwarded only when it differs from the last one forwarded.
//! A failed tick keeps the previous value on screen and is retried on the next tick.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

pub struct Poller {
    period: Duration,
    shutdown: watch::Receiver<bool>,
    max_changes: Option<usize>,
}

impl Poller {
    /// A poller ticking every `period` until `shutdown` flips to `true` or its sender
    /// is dropped.
    pub fn new(period: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            period,
            shutdown,
            max_changes: None,
        }
    }

    /// Stop on its own after forwarding `max` changed values.
    pub fn max_changes(mut self, max: usize) -> Self {
        self.max_changes = Some(max);
        self
    }

    /// Run until shutdown. Returns how many values were forwarded to `on_change`.
    ///
    /// An error from `tick` is logged and skipped; an error from `on_change` ends the loop.
    pub async fn run<T, F, G>(mut self, mut tick: F, mut on_change: G) -> Result<usize>
    where
        T: PartialEq,
        F: FnMut() -> Result<T>,
        G: FnMut(&T) -> Result<()>,
    {
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last: Option<T> = None;
        let mut changes = 0usize;

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped");
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let value = match tick() {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, "poll failed, keeping previous grid");
                    continue;
                }
            };

            if last.as_ref() == Some(&value) {
                continue;
            }

            on_change(&value)?;
            last = Some(value);
            changes += 1;

            if self.max_changes.is_some_and(|max| changes >= max) {
                break;
            }
        }

        Ok(changes)
    }
}
