// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out of one job's output to any number of live viewers.
//!
//! Built on `tokio::sync::broadcast`: each subscriber gets a bounded
//! window of the most recent events, so a slow viewer lags and skips
//! rather than ever blocking the producing job. The durable log receives
//! every line regardless of subscriber state, so nothing is lost.

use parking_lot::Mutex;
use rp_core::JobState;
use serde::Serialize;
use tokio::sync::broadcast;

/// Bounded per-subscriber buffer. A viewer further behind than this
/// observes a lag gap and continues from the oldest retained event.
pub const SUBSCRIBER_BUFFER: usize = 256;

/// One event on a job's live stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// One verbatim line of child output (stdout or stderr).
    Line { line: String },
    /// Progress changed; carries the job's monotonic view, not the raw
    /// values from the protocol line.
    Progress { percent: u8, message: String },
    /// Terminal notification. The stream closes after this event.
    Finished { state: JobState, exit_code: Option<i32> },
}

/// Publish/subscribe fan-out for one job.
#[derive(Debug)]
pub struct OutputBroadcaster {
    tx: Mutex<Option<broadcast::Sender<JobEvent>>>,
}

impl OutputBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self { tx: Mutex::new(Some(tx)) }
    }

    /// Attach a live viewer. Receives every event published after this
    /// call (no backfill); a subscription taken after the job ended is
    /// already closed.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.subscribe(),
            None => closed_receiver(),
        }
    }

    /// Publish one event to all current subscribers. Never blocks; a
    /// send with no subscribers is fine (the log is the durable path).
    pub fn publish(&self, event: JobEvent) {
        if let Some(tx) = self.tx.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Publish the terminal event and close the channel. Idempotent.
    pub fn close(&self, state: JobState, exit_code: Option<i32>) {
        if let Some(tx) = self.tx.lock().take() {
            let _ = tx.send(JobEvent::Finished { state, exit_code });
        }
    }

    /// Number of currently attached viewers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.lock().as_ref().map_or(0, |tx| tx.receiver_count())
    }
}

impl Default for OutputBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

fn closed_receiver() -> broadcast::Receiver<JobEvent> {
    let (tx, rx) = broadcast::channel(1);
    drop(tx);
    rx
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
