use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// High-level error type shared across testscope components.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("invalid line number {line}: file has {lines} lines")]
    InvalidLineNumber { line: usize, lines: usize },
    #[error("no outline for {}", .0.display())]
    NoOutline(PathBuf),
    #[error("revision range must be a valid git revision range: {0:?}")]
    InvalidRevisionRange(String),
    #[error("could not find test with name {0:?}")]
    NotFound(String),
    #[error("no test id present in {0:?}")]
    NoIdentifier(String),
    #[error("no file containing {pattern:?} found in {}", .dir.display())]
    NotExist { pattern: String, dir: PathBuf },
    #[error("multiple files containing {pattern:?} found: {}", .files.join(", "))]
    MultipleMatches { pattern: String, files: Vec<String> },
    #[error("cannot quarantine a test without leaf text")]
    EmptyLeafText,
    #[error("collaborator error: {0}")]
    Collaborator(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ScopeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ScopeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl ScopeError {
    /// Prefixes message-carrying variants with `ctx`; structured variants pass through.
    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            ScopeError::Collaborator(msg) => ScopeError::Collaborator(format!("{ctx}: {msg}")),
            ScopeError::Config(msg) => ScopeError::Config(format!("{ctx}: {msg}")),
            ScopeError::Serialization(msg) => ScopeError::Serialization(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
