//! Outcome of one completed execution.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The result of a shell execution.
///
/// A result is built once, after the last candidate command of a call has
/// finished, and is never mutated afterwards. Success is decided against the
/// snapshot of success codes that was in effect for that call, so later
/// changes to the session's codes do not affect an existing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellResult {
    lines: Vec<String>,
    exit_code: i32,
    success_codes: BTreeSet<i32>,
    command_number: usize,
}

impl ShellResult {
    /// Create a new result.
    pub const fn new(
        lines: Vec<String>,
        exit_code: i32,
        success_codes: BTreeSet<i32>,
        command_number: usize,
    ) -> Self {
        Self {
            lines,
            exit_code,
            success_codes,
            command_number,
        }
    }

    /// Output lines of the candidate that produced this result.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume the result and return its output lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// The last output line, if any.
    pub fn line(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Line at `index`. Negative indexes count from the end (`-1` is the last line).
    pub fn line_at(&self, index: isize) -> Option<&str> {
        let resolved = if index < 0 {
            self.lines.len().checked_sub(index.unsigned_abs())?
        } else {
            index.unsigned_abs()
        };
        self.lines.get(resolved).map(String::as_str)
    }

    /// Number of output lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the command produced no output.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Raw exit code of the candidate that produced this result.
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Success codes in effect for this call (persistent plus per-call).
    pub const fn success_codes(&self) -> &BTreeSet<i32> {
        &self.success_codes
    }

    /// 0-based index of the candidate command that determined this result.
    pub const fn command_number(&self) -> usize {
        self.command_number
    }

    /// Whether the exit code is one of the success codes.
    pub fn was_successful(&self) -> bool {
        self.success_codes.contains(&self.exit_code)
    }
}
