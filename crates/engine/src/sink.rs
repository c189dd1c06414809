// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only durable writer for one job's output log.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only log file for a single job.
///
/// Created once at job creation; the file is never truncated or
/// rewritten afterwards. Each `append` writes one line straight through
/// to the file so a concurrent reader opening the same path sees it.
///
/// Write failures degrade to warnings: losing the durable log is less
/// severe than killing an in-flight job, and the in-memory broadcast
/// path continues regardless.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
}

impl LogSink {
    /// Open (creating if needed) the log file in append mode.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { path: path.to_path_buf(), file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, newline-terminated. Never fails the caller.
    pub fn append(&mut self, line: &str) {
        if let Err(e) = self.write_line(line) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to append to job log");
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
