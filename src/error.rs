use thiserror::Error;

use crate::CompileError;

/// Unified error type covering compilation and I/O.
///
/// Returned by convenience methods like [`RuleSet::from_htaccess()`](crate::RuleSet::from_htaccess)
/// and [`RuleSet::from_file()`](crate::RuleSet::from_file).
#[derive(Debug, Error)]
pub enum HtrewriteError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
