mod compile;
mod error;
mod evaluate;
pub mod parse;
mod types;

#[cfg(feature = "http")]
mod boundary;

pub use error::HtrewriteError;
pub use types::{
    Action, CompileError, CondFlag, CondFlags, Condition, Diagnostic, DiagnosticKind,
    EvaluationReport, FlagSet, RedirectCode, Request, RequestInfo, Rule, RuleFlag, RuleFlags,
    RuleOutcome, RuleSet, RuleSetBuilder, UnknownFlag,
};
