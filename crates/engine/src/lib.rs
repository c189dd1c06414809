// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-engine: job execution and live-streaming engine.
//!
//! Spawns one child process per job, multiplexes its output to live
//! subscribers and a durable per-job log, parses the `PROGRESS`/`DONE`
//! mini-protocol out of the stream, writes pre-supplied stdin answers,
//! and manages concurrent job lifecycle including cancellation.
//!
//! The operator-facing surface is [`JobRegistry`]: start, snapshot,
//! cancel, attach a live viewer, locate the persisted log.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod registry;
mod runner;
pub mod sink;
pub mod store;

pub use broadcast::{JobEvent, OutputBroadcaster};
pub use config::EngineConfig;
pub use error::{RegistryError, ResolveError};
pub use registry::{JobRegistry, SourceRef};
pub use sink::LogSink;
pub use store::{RepoStore, ResolvedSource, ScriptStore};
