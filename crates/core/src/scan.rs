// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lexical scanner for stdin prompt sites in interpreted scripts.
//!
//! Finds every syntactic `input(...)` call in Python source, in source
//! order, so the operator can pre-supply one answer per site. This is a
//! lexical pass, not semantic analysis: call sites inside unreached
//! branches are still reported, and the prompt text is captured only
//! when the first argument is a plain string literal. Shell scripts are
//! never scanned; their input list is always empty.

use serde::{Deserialize, Serialize};

/// One syntactic occurrence of a call requesting a line of stdin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSite {
    /// 1-based position in source order.
    pub index: usize,
    /// Prompt text, when the call's first argument is a string literal.
    pub prompt: Option<String>,
}

/// Scan Python source text for `input(...)` call sites.
///
/// Skips string literals and comments, and ignores attribute calls
/// (`obj.input(...)`) and longer identifiers (`my_input(...)`), matching
/// what an AST walk over bare-name calls would report.
pub fn scan_prompt_sites(source: &str) -> Vec<PromptSite> {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut sites = Vec::new();
    let mut last_sig: Option<char> = None;
    let mut i = 0;

    while i < len {
        let c = chars[i];

        if c == '#' {
            while i < len && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '\'' || c == '"' {
            i = skip_string(&chars, i);
            last_sig = Some(c);
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < len && is_ident_char(chars[i]) {
                i += 1;
            }
            let is_input = chars[start..i].iter().collect::<String>() == "input";
            let dotted = last_sig == Some('.');
            last_sig = chars.get(i - 1).copied();

            if is_input && !dotted {
                let mut j = i;
                while j < len && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < len && chars[j] == '(' {
                    let prompt = peek_string_literal(&chars, j + 1);
                    sites.push(PromptSite { index: sites.len() + 1, prompt });
                }
            }
            continue;
        }

        if !c.is_whitespace() {
            last_sig = Some(c);
        }
        i += 1;
    }

    sites
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Advance past a string literal starting at `start` (which holds the
/// opening quote). Handles single and triple quoting plus backslash
/// escapes. Unterminated literals consume to end of input.
fn skip_string(chars: &[char], start: usize) -> usize {
    let q = chars[start];
    let len = chars.len();

    let triple = start + 2 < len && chars[start + 1] == q && chars[start + 2] == q;
    let mut i = if triple { start + 3 } else { start + 1 };

    while i < len {
        match chars[i] {
            '\\' => i += 2,
            c if c == q => {
                if !triple {
                    return i + 1;
                }
                if i + 2 < len && chars[i + 1] == q && chars[i + 2] == q {
                    return i + 3;
                }
                i += 1;
            }
            '\n' if !triple => return i + 1,
            _ => i += 1,
        }
    }
    len
}

/// Peek at the characters after an opening `(` and extract the first
/// argument when it is a plain string literal followed by `)` or `,`.
/// Prefixed strings (f-strings etc.) and expressions yield `None`, like
/// the non-constant cases of an AST walk.
fn peek_string_literal(chars: &[char], from: usize) -> Option<String> {
    let len = chars.len();
    let mut j = from;
    while j < len && chars[j].is_whitespace() {
        j += 1;
    }
    let q = *chars.get(j)?;
    if q != '\'' && q != '"' {
        return None;
    }

    let triple = j + 2 < len && chars[j + 1] == q && chars[j + 2] == q;
    let mut i = if triple { j + 3 } else { j + 1 };
    let mut text = String::new();

    let close = loop {
        if i >= len {
            return None;
        }
        match chars[i] {
            '\\' => {
                let escaped = *chars.get(i + 1)?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
                i += 2;
            }
            c if c == q => {
                if !triple {
                    break i + 1;
                }
                if i + 2 < len && chars[i + 1] == q && chars[i + 2] == q {
                    break i + 3;
                }
                text.push(c);
                i += 1;
            }
            '\n' if !triple => return None,
            c => {
                text.push(c);
                i += 1;
            }
        }
    };

    // Only a lone literal argument counts; `"a" + x` is an expression.
    let mut k = close;
    while k < len && chars[k].is_whitespace() {
        k += 1;
    }
    match chars.get(k) {
        Some(')') | Some(',') => Some(text),
        _ => None,
    }
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
