// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-core: Pure types for the runpad script-runner engine.
//!
//! Everything in this crate is synchronous and side-effect free: the job
//! state machine, the progress mini-protocol parser, the prompt-site
//! scanner, and the clock abstraction. Process plumbing lives in
//! `rp-engine`.

pub mod clock;
pub mod id;
pub mod job;
pub mod macros;
pub mod progress;
pub mod scan;

pub use clock::{Clock, FakeClock, SystemClock};
pub use job::{Job, JobId, JobSnapshot, JobState, ScriptKind};
pub use progress::{parse_progress_line, ProgressSignal};
pub use scan::{scan_prompt_sites, PromptSite};
