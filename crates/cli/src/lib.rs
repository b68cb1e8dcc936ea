// askbook CLI - run flow, console IO, exit codes.

pub mod app;
pub mod console;
pub mod exit_codes;

use exit_codes::{EXIT_DATA, EXIT_ERROR, EXIT_IO, EXIT_USAGE};

/// CLI-level error: exit code plus the message (and optional hint)
/// printed to stderr.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self { code: EXIT_DATA, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
