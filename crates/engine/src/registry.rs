// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-facing job registry.
//!
//! Owns the table of all known jobs and the per-job runner tasks. Every
//! public operation is keyed by [`JobId`]; the registry is cheap to
//! clone and shares one table.

use crate::broadcast::{JobEvent, OutputBroadcaster};
use crate::config::EngineConfig;
use crate::error::RegistryError;
use crate::runner;
use crate::sink::LogSink;
use crate::store::{RepoStore, ResolvedSource, ScriptStore};
use parking_lot::Mutex;
use rp_core::scan::{scan_prompt_sites, PromptSite};
use rp_core::{Job, JobId, JobSnapshot, ScriptKind, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// What to run: an uploaded top-level script, or a file inside a cloned
/// repository folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    Script { name: String },
    RepoFile { repo_id: String, path: String },
}

/// Shared per-job state: the record, its live stream, and the cancel
/// token the runner listens on.
pub(crate) struct JobHandle {
    pub(crate) id: JobId,
    pub(crate) job: Mutex<Job>,
    pub(crate) broadcaster: OutputBroadcaster,
    pub(crate) cancel: CancellationToken,
}

struct RegistryInner {
    config: EngineConfig,
    scripts: ScriptStore,
    repos: RepoStore,
    jobs: Mutex<HashMap<JobId, Arc<JobHandle>>>,
}

/// Concurrent job table plus the stores jobs resolve against.
#[derive(Clone)]
pub struct JobRegistry {
    inner: Arc<RegistryInner>,
}

impl JobRegistry {
    pub fn new(config: EngineConfig) -> Self {
        let scripts = ScriptStore::new(&config.scripts_dir);
        let repos = RepoStore::new(&config.repos_dir);
        Self {
            inner: Arc::new(RegistryInner {
                config,
                scripts,
                repos,
                jobs: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn scripts(&self) -> &ScriptStore {
        &self.inner.scripts
    }

    pub fn repos(&self) -> &RepoStore {
        &self.inner.repos
    }

    /// Create and launch a job. Returns the new id once the runner task
    /// is spawned; resolution and log-file creation failures are
    /// reported here and no job record is created for them.
    ///
    /// `inputs` are the pre-supplied stdin answers, written in order at
    /// spawn and followed by EOF.
    pub fn start(
        &self,
        source: &SourceRef,
        inputs: Vec<String>,
    ) -> Result<JobId, RegistryError> {
        let resolved = self.resolve(source)?;

        let id = JobId::new();
        let log_path = self.inner.config.logs_dir.join(format!("{id}.log"));
        let sink = LogSink::create(&log_path)?;

        let handle = Arc::new(JobHandle {
            id: id.clone(),
            job: Mutex::new(Job::new(id.clone(), resolved.label.clone(), log_path)),
            broadcaster: OutputBroadcaster::new(),
            cancel: CancellationToken::new(),
        });
        self.inner.jobs.lock().insert(id.clone(), handle.clone());

        tracing::info!(job_id = %id, source = %resolved.label, "job created");
        tokio::spawn(runner::run_job(
            handle,
            resolved,
            inputs,
            sink,
            self.inner.config.grace,
            SystemClock,
        ));
        Ok(id)
    }

    /// Point-in-time view of one job.
    pub fn snapshot(&self, id: &JobId) -> Result<JobSnapshot, RegistryError> {
        let handle = self.handle(id)?;
        let snapshot = handle.job.lock().snapshot();
        Ok(snapshot)
    }

    /// Snapshots of all known jobs, newest first.
    pub fn list(&self) -> Vec<JobSnapshot> {
        let mut out: Vec<JobSnapshot> = self
            .inner
            .jobs
            .lock()
            .values()
            .map(|h| h.job.lock().snapshot())
            .collect();
        out.sort_by(|a, b| {
            b.started_at_ms
                .cmp(&a.started_at_ms)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        out
    }

    /// Request cancellation. Records intent on the job record first so
    /// the terminal state is `Cancelled` even if the process exits
    /// cleanly in the same instant, then wakes the runner.
    pub fn cancel(&self, id: &JobId) -> Result<(), RegistryError> {
        let handle = self.handle(id)?;
        let accepted = handle.job.lock().request_cancel();
        if !accepted {
            let state = handle.job.lock().state;
            return Err(RegistryError::InvalidState { id: id.clone(), state });
        }
        tracing::info!(job_id = %id, "cancel requested");
        handle.cancel.cancel();
        Ok(())
    }

    /// Attach a live viewer to a job's output stream. A stream attached
    /// after the job ended is already closed; the durable log holds the
    /// history.
    pub fn attach(&self, id: &JobId) -> Result<broadcast::Receiver<JobEvent>, RegistryError> {
        Ok(self.handle(id)?.broadcaster.subscribe())
    }

    /// Location of the job's append-only log file.
    pub fn log_path(&self, id: &JobId) -> Result<PathBuf, RegistryError> {
        let handle = self.handle(id)?;
        let path = handle.job.lock().log_path.clone();
        Ok(path)
    }

    /// Prompt sites of a source, for collecting stdin answers up front.
    /// Only Python scripts are scanned; anything else has none.
    pub fn prompt_sites(&self, source: &SourceRef) -> Result<Vec<PromptSite>, RegistryError> {
        let resolved = self.resolve(source)?;
        if resolved.kind != ScriptKind::Python {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&resolved.path)?;
        Ok(scan_prompt_sites(&text))
    }

    /// Request cancellation of every job that is not yet terminal.
    pub fn shutdown(&self) {
        for handle in self.inner.jobs.lock().values() {
            if handle.job.lock().request_cancel() {
                handle.cancel.cancel();
            }
        }
    }

    fn resolve(&self, source: &SourceRef) -> Result<ResolvedSource, RegistryError> {
        let resolved = match source {
            SourceRef::Script { name } => self.inner.scripts.resolve(name)?,
            SourceRef::RepoFile { repo_id, path } => self.inner.repos.resolve(repo_id, path)?,
        };
        Ok(resolved)
    }

    fn handle(&self, id: &JobId) -> Result<Arc<JobHandle>, RegistryError> {
        self.inner
            .jobs
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
