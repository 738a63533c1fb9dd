mod action;
mod condition;
mod diagnostic;
mod error;
mod evaluation_report;
mod flag;
mod request;
mod rule;
mod ruleset;

pub use action::Action;
pub use condition::Condition;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::CompileError;
pub use evaluation_report::{EvaluationReport, RuleOutcome};
pub use flag::{CondFlag, CondFlags, FlagSet, RedirectCode, RuleFlag, RuleFlags, UnknownFlag};
pub use request::{Request, RequestInfo};
pub use rule::Rule;
pub use ruleset::{RuleSet, RuleSetBuilder};
