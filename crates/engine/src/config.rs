// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration: data directories and cancellation grace.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filesystem layout and timing knobs for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Top-level uploaded scripts.
    pub scripts_dir: PathBuf,
    /// Cloned repository folders (`repo-<8 hex>` each).
    pub repos_dir: PathBuf,
    /// One append-only `<job-id>.log` per job.
    pub logs_dir: PathBuf,
    /// Grace period between SIGTERM and SIGKILL on cancel.
    pub grace: Duration,
}

impl EngineConfig {
    /// Derive the standard layout under a data directory, creating the
    /// subdirectories if missing.
    pub fn new(data_dir: impl AsRef<Path>) -> io::Result<Self> {
        let root = data_dir.as_ref();
        let config = Self {
            scripts_dir: root.join("scripts"),
            repos_dir: root.join("repos"),
            logs_dir: root.join("logs"),
            grace: cancel_grace(),
        };
        std::fs::create_dir_all(&config.scripts_dir)?;
        std::fs::create_dir_all(&config.repos_dir)?;
        std::fs::create_dir_all(&config.logs_dir)?;
        Ok(config)
    }

    /// Override the cancellation grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

/// Cancellation grace period (default 5s, configurable via `RUNPAD_GRACE_MS`).
pub fn cancel_grace() -> Duration {
    std::env::var("RUNPAD_GRACE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
