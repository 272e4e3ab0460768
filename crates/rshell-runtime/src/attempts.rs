//! Command variant executor.
//!
//! Wraps a template expanded over the configured flavors and runs the
//! variants through a session as one candidate list.

use rshell_core::{SessionError, ShellResult, expand};

use crate::session::Session;

/// Variants of one command template, bound to a session.
#[derive(Debug, Clone)]
pub struct Attempts<'a> {
    session: &'a Session,
    commands: Vec<String>,
    result_codes: Vec<i32>,
}

impl<'a> Attempts<'a> {
    pub(crate) fn new<S: AsRef<str>>(session: &'a Session, template: &str, flavors: &[S]) -> Self {
        Self {
            session,
            commands: expand(template, flavors),
            result_codes: Vec::new(),
        }
    }

    /// Accept `codes` as success in addition to the session's codes.
    #[must_use]
    pub fn with_result_codes(mut self, codes: &[i32]) -> Self {
        self.result_codes = codes.to_vec();
        self
    }

    /// The expanded candidate commands, in flavor order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Run the variants until one succeeds.
    pub async fn execute(&self) -> Result<ShellResult, SessionError> {
        self.session
            .execute_candidates(&self.commands, &self.result_codes)
            .await
    }

    /// Queue the variants and return immediately.
    pub fn execute_async<F>(self, callback: F)
    where
        F: FnOnce(Result<ShellResult, SessionError>) + Send + 'static,
    {
        self.session
            .execute_candidates_async(self.commands, self.result_codes, callback);
    }
}
