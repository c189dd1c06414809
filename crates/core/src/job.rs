// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, state machine, and query snapshot.

use crate::progress::ProgressSignal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for one execution attempt.
    ///
    /// Assigned at creation and immutable; used to query state, cancel,
    /// attach live viewers, and locate the durable log.
    pub struct JobId("job-");
}

/// Synthetic exit code recorded when the child process could not be
/// spawned at all (command not found convention).
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Kind of script a job executes, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    /// Interpreted Python source; scanned for prompt sites.
    Python,
    /// Shell script; never scanned, input list is always empty.
    Shell,
}

impl ScriptKind {
    /// Derive the kind from a file name, if the extension is supported.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".py") {
            Some(ScriptKind::Python)
        } else if name.ends_with(".sh") {
            Some(ScriptKind::Shell)
        } else {
            None
        }
    }

    /// Interpreter executable used to run this kind of script.
    pub fn interpreter(&self) -> &'static str {
        match self {
            ScriptKind::Python => "python3",
            ScriptKind::Shell => "/bin/bash",
        }
    }
}

crate::simple_display! {
    ScriptKind {
        Python => "py",
        Shell => "sh",
    }
}

/// Lifecycle state of a job. Monotonic: `Pending → Running → terminal`,
/// with no transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Created, process not yet spawned.
    Pending,
    /// Process spawned, stdin answers already written and closed.
    Running,
    /// Process exited with code 0 and no cancel was requested.
    Succeeded,
    /// Nonzero exit code, or the process could not be spawned.
    Failed,
    /// Operator-requested termination. Always wins once requested.
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::Cancelled)
    }
}

crate::simple_display! {
    JobState {
        Pending => "pending",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// One tracked execution attempt.
///
/// Pure state: all time values enter as epoch milliseconds so the
/// surrounding engine decides the clock. The runner task is the sole
/// writer of the terminal transition; `request_cancel` only records
/// intent and the final state is resolved in [`Job::finish`].
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Display label for the source, e.g. `deploy.sh` or
    /// `repo-1a2b3c4d:tools/migrate.py`.
    pub source: String,
    pub state: JobState,
    /// Last reported progress, 0-100. Never decreases while running.
    pub progress_percent: u8,
    /// Last human-readable progress text.
    pub progress_message: String,
    /// Set exactly once, on process exit (or synthetic on spawn failure).
    pub exit_code: Option<i32>,
    pub started_at_ms: Option<u64>,
    pub ended_at_ms: Option<u64>,
    /// Durable log location; fixed at creation, never overwritten.
    pub log_path: PathBuf,
    cancel_requested: bool,
}

impl Job {
    pub fn new(id: JobId, source: impl Into<String>, log_path: PathBuf) -> Self {
        Self {
            id,
            source: source.into(),
            state: JobState::Pending,
            progress_percent: 0,
            progress_message: String::new(),
            exit_code: None,
            started_at_ms: None,
            ended_at_ms: None,
            log_path,
            cancel_requested: false,
        }
    }

    /// `Pending → Running`: the process has been spawned and its stdin
    /// answers written. No-op if the job is already past `Pending`.
    pub fn mark_running(&mut self, epoch_ms: u64) {
        if self.state == JobState::Pending {
            self.state = JobState::Running;
            self.started_at_ms = Some(epoch_ms);
        }
    }

    /// Apply a parsed progress signal from one output line.
    ///
    /// Percent is monotonically non-decreasing: a report below the last
    /// value is kept at the current value. `DONE` forces 100 but does not
    /// change lifecycle state — that awaits actual process exit.
    pub fn apply_progress(&mut self, signal: &ProgressSignal) {
        if self.state.is_terminal() {
            return;
        }
        match signal {
            ProgressSignal::NoMatch => {}
            ProgressSignal::Progress { percent, message } => {
                self.progress_percent = self.progress_percent.max(*percent);
                if !message.is_empty() {
                    self.progress_message = message.clone();
                }
            }
            ProgressSignal::Done => {
                self.progress_percent = 100;
                self.progress_message = "done".to_string();
            }
        }
    }

    /// Record a cancel request. Returns false when the job is already
    /// terminal (the caller reports invalid state and leaves the job
    /// untouched). Once this returns true the terminal state will be
    /// `Cancelled`, even if the process exits 0 concurrently.
    pub fn request_cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.cancel_requested = true;
        true
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Terminal transition on process exit.
    ///
    /// `exit_code` is `None` when no process ever ran (cancelled while
    /// pending). Cancel wins over any exit code; otherwise 0 maps to
    /// `Succeeded` and anything else to `Failed`. A clean success forces
    /// progress to 100 so jobs that never emitted `DONE` still read as
    /// complete.
    pub fn finish(&mut self, exit_code: Option<i32>, epoch_ms: u64) -> JobState {
        if self.state.is_terminal() {
            return self.state;
        }

        self.state = if self.cancel_requested {
            JobState::Cancelled
        } else if exit_code == Some(0) {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        self.exit_code = exit_code;
        self.ended_at_ms = Some(epoch_ms);

        if self.state == JobState::Succeeded {
            self.progress_percent = 100;
            if self.progress_message.is_empty() {
                self.progress_message = "done".to_string();
            }
        }
        self.state
    }

    /// Terminal transition when the process could not be spawned.
    pub fn spawn_failed(&mut self, epoch_ms: u64) -> JobState {
        self.finish(Some(SPAWN_FAILURE_EXIT_CODE), epoch_ms)
    }

    /// Current state as a query DTO.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            source: self.source.clone(),
            state: self.state,
            progress_percent: self.progress_percent,
            progress_message: self.progress_message.clone(),
            exit_code: self.exit_code,
            started_at_ms: self.started_at_ms,
            ended_at_ms: self.ended_at_ms,
            log_path: self.log_path.clone(),
        }
    }
}

/// Point-in-time view of a job for the query surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub source: String,
    pub state: JobState,
    pub progress_percent: u8,
    pub progress_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at_ms: Option<u64>,
    pub log_path: PathBuf,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
