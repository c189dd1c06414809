// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared spec harness: a temporary data directory with a live registry.

#![allow(dead_code)]

pub use rp_core::{JobId, JobSnapshot, JobState};
pub use rp_engine::{EngineConfig, JobEvent, JobRegistry, RegistryError, SourceRef};
pub use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

/// Upper bound for any single wait in these specs.
pub const SPEC_WAIT_MAX: Duration = Duration::from_secs(10);

/// One spec's world: a throwaway data directory and a registry over it.
pub struct Project {
    registry: JobRegistry,
    _tmp: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let config = EngineConfig::new(tmp.path())
            .unwrap()
            .with_grace(Duration::from_millis(500));
        Self { registry: JobRegistry::new(config), _tmp: tmp }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Drop a script into the scripts directory.
    pub fn script(&self, name: &str, body: &str) {
        std::fs::write(self.registry.scripts().root().join(name), body).unwrap();
    }

    /// Drop a file into a repo folder, creating intermediate directories.
    pub fn repo_file(&self, repo_id: &str, rel_path: &str, body: &str) {
        let path = self.registry.repos().root().join(repo_id).join(rel_path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    /// Start a top-level script with no stdin answers.
    pub fn start(&self, name: &str) -> JobId {
        self.registry
            .start(&SourceRef::Script { name: name.to_string() }, Vec::new())
            .unwrap()
    }

    pub fn start_with_inputs(&self, name: &str, inputs: &[&str]) -> JobId {
        self.registry
            .start(
                &SourceRef::Script { name: name.to_string() },
                inputs.iter().map(|s| s.to_string()).collect(),
            )
            .unwrap()
    }

    /// Read the job's durable log.
    pub fn log(&self, id: &JobId) -> String {
        std::fs::read_to_string(self.registry.log_path(id).unwrap()).unwrap()
    }

    /// Poll until the job reaches a terminal state.
    pub async fn wait_terminal(&self, id: &JobId) -> JobSnapshot {
        timeout(SPEC_WAIT_MAX, async {
            loop {
                let snapshot = self.registry.snapshot(id).unwrap();
                if snapshot.state.is_terminal() {
                    return snapshot;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("job should reach a terminal state")
    }

    /// Poll until the job is observed `Running`.
    pub async fn wait_running(&self, id: &JobId) {
        timeout(SPEC_WAIT_MAX, async {
            loop {
                match self.registry.snapshot(id).unwrap().state {
                    JobState::Running => return,
                    state if state.is_terminal() => panic!("job ended while waiting: {state}"),
                    _ => tokio::time::sleep(Duration::from_millis(10)).await,
                }
            }
        })
        .await
        .expect("job should start running")
    }
}

/// Receive until the stream closes, keeping every event in order.
pub async fn drain(mut rx: broadcast::Receiver<JobEvent>) -> Vec<JobEvent> {
    timeout(SPEC_WAIT_MAX, async move {
        let mut out = Vec::new();
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    let finished = matches!(ev, JobEvent::Finished { .. });
                    out.push(ev);
                    if finished {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        out
    })
    .await
    .expect("stream should close")
}

/// Just the verbatim output lines from an event sequence.
pub fn lines(events: &[JobEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|ev| match ev {
            JobEvent::Line { line } => Some(line.as_str()),
            _ => None,
        })
        .collect()
}

/// Just the progress updates from an event sequence.
pub fn progress(events: &[JobEvent]) -> Vec<(u8, &str)> {
    events
        .iter()
        .filter_map(|ev| match ev {
            JobEvent::Progress { percent, message } => Some((*percent, message.as_str())),
            _ => None,
        })
        .collect()
}
