use serde::{Deserialize, Serialize};

use crate::params::{RuleError, ValidationError};

/// A located syntax error produced by the lexer or the parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        ParseError {
            line,
            column,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// An error returned by a provider API handle.
///
/// `code` carries the provider's machine-readable error code when there is
/// one (e.g. `InvalidInstanceID.NotFound`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{call}: {message}")]
pub struct ProviderError {
    pub call: String,
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(call: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError {
            call: call.into(),
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// True when the provider reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        self.code
            .as_deref()
            .map(|c| c.ends_with("NotFound"))
            .unwrap_or(false)
    }
}

/// Errors raised by a command while injecting, dry-running or running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("reference not found: ${0}")]
    ReferenceNotFound(String),

    #[error("invalid param '{key}': {message}")]
    InvalidParam { key: String, message: String },

    #[error("missing param '{0}'")]
    MissingParam(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("timeout of {0}s expired")]
    Timeout(u64),

    #[error("template execution cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Top-level error type of the template pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("template parsing: {0}")]
    Parse(#[from] ParseError),

    #[error("compile error: cannot find command for '{0}'")]
    UnknownCommand(String),

    #[error("compile error: {command}: {source}")]
    Rule {
        command: String,
        #[source]
        source: RuleError,
    },

    #[error("param validation: {command}{}", .source.details())]
    Validation {
        command: String,
        #[source]
        source: ValidationError,
    },

    #[error("compile error: {0}")]
    Compile(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("{}", render_many(.0))]
    Multiple(Vec<Error>),
}

impl Error {
    /// Collapse a list of errors: none, the single error, or `Multiple`.
    pub fn collect(mut errors: Vec<Error>) -> Result<(), Error> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multiple(errors)),
        }
    }
}

fn render_many(errors: &[Error]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| format!("\t- {}", e)).collect();
    format!("{} errors:\n{}", errors.len(), lines.join("\n"))
}
