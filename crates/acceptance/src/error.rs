use std::collections::BTreeMap;

/// Why an acceptance run did not meet its expectations.
#[derive(Debug, thiserror::Error)]
pub enum AcceptanceError {
    #[error(transparent)]
    Compile(#[from] stratus_core::Error),

    #[error("line {line}: '{text}' failed: {error}")]
    CommandFailed {
        line: u32,
        text: String,
        error: String,
    },

    #[error("unexpected input:\n{}", .0.join("\n"))]
    InputMismatch(Vec<String>),

    #[error("expected input for {0} but it was never called")]
    InputNeverSent(String),

    #[error("calls: expected {expected:?}, got {actual:?}")]
    CallsMismatch {
        expected: BTreeMap<String, usize>,
        actual: BTreeMap<String, usize>,
    },

    #[error("command result: expected '{expected}', got {actual:?}")]
    ResultMismatch {
        expected: String,
        actual: Option<String>,
    },

    #[error("expected a command error containing '{0}'")]
    ErrorNotRaised(String),

    #[error("revert: expected\n{expected}\ngot\n{actual}")]
    RevertMismatch { expected: String, actual: String },
}
