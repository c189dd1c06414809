// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source resolution: scripts directory and cloned repository folders.
//!
//! The engine only needs the read side of script/repo storage: turn an
//! operator-supplied name into an executable path plus working
//! directory, refusing anything that escapes the storage roots. Upload,
//! delete, and git plumbing live with the outer collaborators.

use crate::error::ResolveError;
use rp_core::ScriptKind;
use std::io;
use std::path::{Path, PathBuf};

/// A source reference resolved to something runnable.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// Display label, e.g. `deploy.sh` or `repo-1a2b3c4d:tools/etl.py`.
    pub label: String,
    /// Absolute path of the script file.
    pub path: PathBuf,
    /// Working directory for the child process: the scripts directory
    /// for top-level scripts, the repo root for repo files.
    pub workdir: PathBuf,
    pub kind: ScriptKind,
}

/// True for names matching `[a-zA-Z0-9_.-]+` with a supported extension.
pub fn safe_script_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && ScriptKind::from_name(name).is_some()
}

/// True for repo folder ids of the shape `repo-<8 hex>`.
pub fn safe_repo_id(id: &str) -> bool {
    match id.strip_prefix("repo-") {
        Some(suffix) => suffix.len() == 8 && suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
        None => false,
    }
}

/// Read-side view of the top-level scripts directory.
#[derive(Debug, Clone)]
pub struct ScriptStore {
    root: PathBuf,
}

impl ScriptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Eligible script names, sorted. Skips directories, `_`-prefixed
    /// files, and unsupported extensions.
    pub fn list(&self) -> io::Result<Vec<String>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('_') || ScriptKind::from_name(&name).is_none() {
                continue;
            }
            out.push(name);
        }
        out.sort();
        Ok(out)
    }

    /// Resolve a script name to an executable path rooted in the scripts
    /// directory. Fails fast if the file no longer exists.
    pub fn resolve(&self, name: &str) -> Result<ResolvedSource, ResolveError> {
        if !safe_script_name(name) {
            return Err(ResolveError::InvalidName(name.to_string()));
        }
        let path = self.root.join(name);
        let path = contained_file(&path, &self.root)
            .ok_or_else(|| ResolveError::ScriptNotFound(name.to_string()))?;
        let kind = ScriptKind::from_name(name)
            .ok_or_else(|| ResolveError::InvalidName(name.to_string()))?;

        Ok(ResolvedSource { label: name.to_string(), path, workdir: self.root.clone(), kind })
    }
}

/// Read-side view of the cloned repositories directory.
#[derive(Debug, Clone)]
pub struct RepoStore {
    root: PathBuf,
}

impl RepoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Repo folder ids present on disk, sorted.
    pub fn list(&self) -> io::Result<Vec<String>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() && safe_repo_id(&name) {
                out.push(name);
            }
        }
        out.sort();
        Ok(out)
    }

    /// Runnable files within a repo, as sorted repo-relative paths.
    /// Skips dotfiles and dot-directories.
    pub fn list_files(&self, repo_id: &str) -> Result<Vec<String>, ResolveError> {
        let base = self.repo_dir(repo_id)?;
        let mut out = Vec::new();
        let mut stack = vec![base.clone()];

        while let Some(dir) = stack.pop() {
            let entries = std::fs::read_dir(&dir)
                .map_err(|_| ResolveError::RepoNotFound(repo_id.to_string()))?;
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if ScriptKind::from_name(&name).is_some() {
                    if let Ok(rel) = path.strip_prefix(&base) {
                        out.push(rel.to_string_lossy().into_owned());
                    }
                }
            }
        }
        out.sort();
        Ok(out)
    }

    /// Resolve a repo-relative file. The working directory is the repo
    /// root so scripts see their own checkout.
    pub fn resolve(&self, repo_id: &str, rel_path: &str) -> Result<ResolvedSource, ResolveError> {
        let base = self.repo_dir(repo_id)?;

        if rel_path.is_empty()
            || rel_path.contains("..")
            || rel_path.starts_with('/')
            || rel_path.starts_with('\\')
        {
            return Err(ResolveError::InvalidName(rel_path.to_string()));
        }

        let not_found = || ResolveError::RepoFileNotFound {
            repo_id: repo_id.to_string(),
            path: rel_path.to_string(),
        };
        let path = contained_file(&base.join(rel_path), &base).ok_or_else(not_found)?;

        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let kind = file_name
            .as_deref()
            .and_then(ScriptKind::from_name)
            .ok_or_else(|| ResolveError::InvalidName(rel_path.to_string()))?;

        Ok(ResolvedSource {
            label: format!("{repo_id}:{rel_path}"),
            path,
            workdir: base,
            kind,
        })
    }

    fn repo_dir(&self, repo_id: &str) -> Result<PathBuf, ResolveError> {
        if !safe_repo_id(repo_id) {
            return Err(ResolveError::InvalidName(repo_id.to_string()));
        }
        let dir = self.root.join(repo_id);
        if !dir.is_dir() {
            return Err(ResolveError::RepoNotFound(repo_id.to_string()));
        }
        Ok(dir)
    }
}

/// Canonicalize `path` and require it to be a regular file under `root`.
/// Symlinks pointing outside the root resolve outside and are rejected.
fn contained_file(path: &Path, root: &Path) -> Option<PathBuf> {
    let canonical = std::fs::canonicalize(path).ok()?;
    let canonical_root = std::fs::canonicalize(root).ok()?;
    if canonical.is_file() && canonical.starts_with(&canonical_root) {
        Some(canonical)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
