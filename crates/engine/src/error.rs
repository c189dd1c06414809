// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed errors for the engine surface.

use rp_core::{JobId, JobState};
use thiserror::Error;

/// Errors resolving a source reference to an executable file.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("script not found: {0}")]
    ScriptNotFound(String),
    #[error("repo not found: {0}")]
    RepoNotFound(String),
    #[error("repo file not found: {repo_id}:{path}")]
    RepoFileNotFound { repo_id: String, path: String },
    #[error("invalid source name: {0}")]
    InvalidName(String),
}

/// Errors from registry operations.
///
/// Failed starts return one of these immediately rather than a
/// fabricated job id; spawn failures after a successful start surface
/// through the job's `Failed` terminal state instead.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job {id} is already {state}")]
    InvalidState { id: JobId, state: JobState },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("failed to create job log: {0}")]
    Log(#[from] std::io::Error),
}
