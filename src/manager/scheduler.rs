// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recurring poll timer.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::protocol::Adapter;

use super::bridge::Bridge;

/// Polls a bridge at a fixed interval on the tokio runtime.
///
/// The first poll runs immediately. Each poll completes before the next
/// tick is taken; ticks missed while a slow poll was running are skipped
/// rather than bunched up.
///
/// # Examples
///
/// ```no_run
/// use owbridge::manager::{Bridge, PollScheduler};
/// use owbridge::protocol::EdsAdapter;
/// use std::time::Duration;
///
/// # async fn example() -> owbridge::Result<()> {
/// let bridge = Bridge::new(EdsAdapter::new("192.168.1.40")?);
/// let scheduler = PollScheduler::spawn(bridge, Duration::from_secs(60));
/// // ...
/// scheduler.stop().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PollScheduler {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollScheduler {
    /// Starts polling `bridge` every `period`.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero or if called outside a tokio runtime.
    #[must_use]
    pub fn spawn<A: Adapter + 'static>(bridge: Bridge<A>, period: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let task = tokio::spawn(async move {
            tracing::debug!(period_secs = period.as_secs(), "Poll scheduler started");
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        // Failures are already logged and published by the bridge.
                        let _ = bridge.poll_once().await;
                    }
                }
            }
            tracing::debug!("Poll scheduler stopped");
        });

        Self { stop_tx, task }
    }

    /// Returns `true` while the polling task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops polling and waits for an in-flight poll to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Poll scheduler task failed");
        }
    }
}
