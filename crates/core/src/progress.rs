// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for the `PROGRESS`/`DONE` output mini-protocol.
//!
//! Scripts may report coarse progress by printing lines of the form
//! `PROGRESS <0-100> <message...>` or `DONE`. Every output line is run
//! through [`parse_progress_line`]; lines that match neither form are
//! plain output and yield [`ProgressSignal::NoMatch`]. The parser never
//! fails and has no side effects.

use serde::{Deserialize, Serialize};

/// Result of parsing one line of child-process output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressSignal {
    /// Not a protocol line; forward verbatim.
    NoMatch,
    /// `PROGRESS <percent> <message...>`, percent clamped into 0-100.
    Progress { percent: u8, message: String },
    /// `DONE` marker; percent is forced to 100 by the consumer.
    Done,
}

crate::simple_display! {
    ProgressSignal {
        NoMatch => "no-match",
        Progress { .. } => "progress",
        Done => "done",
    }
}

/// Parse one line of output against the progress mini-protocol.
///
/// Keyword matching is case-sensitive. The percent is any run of digits,
/// clamped into 0-100 rather than rejected. The message is the rest of
/// the line after the percent, verbatim apart from surrounding
/// whitespace. `DONE` matches on a word boundary, so `DONE cleanup` is a
/// done marker while `DONEISH` is not.
pub fn parse_progress_line(line: &str) -> ProgressSignal {
    let line = line.trim_end();

    if let Some(rest) = line.strip_prefix("PROGRESS") {
        // Require whitespace between the keyword and the percent so
        // identifiers like PROGRESSBAR fall through to NoMatch.
        let rest = match rest.strip_prefix([' ', '\t']) {
            Some(r) => r.trim_start(),
            None => return ProgressSignal::NoMatch,
        };

        let digits: &str = rest.split(|c: char| !c.is_ascii_digit()).next().unwrap_or("");
        if digits.is_empty() {
            return ProgressSignal::NoMatch;
        }
        // Digit runs too long for u32 still clamp to 100.
        let percent = digits.parse::<u32>().map(|p| p.min(100)).unwrap_or(100) as u8;
        let message = rest[digits.len()..].trim().to_string();
        return ProgressSignal::Progress { percent, message };
    }

    if let Some(rest) = line.strip_prefix("DONE") {
        let boundary = rest.chars().next().map_or(true, |c| !c.is_alphanumeric() && c != '_');
        if boundary {
            return ProgressSignal::Done;
        }
    }

    ProgressSignal::NoMatch
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
