use thiserror::Error;

use crate::parse::ParseError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid rule pattern '{pattern}' on line {line}: {source}")]
    InvalidPattern {
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid condition pattern '{pattern}' on line {line}: {source}")]
    InvalidConditionPattern {
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A known directive with unparseable arguments while the engine is on.
    #[error(transparent)]
    Malformed(#[from] ParseError),
}

impl CompileError {
    /// Line of the offending directive.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            CompileError::InvalidPattern { line, .. }
            | CompileError::InvalidConditionPattern { line, .. } => *line,
            CompileError::Malformed(err) => err.line(),
        }
    }
}
