use std::fmt;
use std::time::Duration;

use super::action::Action;

/// Why a rule that was tried did or did not produce the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    BaseMismatch,
    ConditionsFailed,
    PatternMismatch,
    Matched,
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleOutcome::BaseMismatch => "base mismatch",
            RuleOutcome::ConditionsFailed => "conditions failed",
            RuleOutcome::PatternMismatch => "pattern mismatch",
            RuleOutcome::Matched => "matched",
        };
        f.write_str(s)
    }
}

/// Detailed evaluation report returned by
/// [`RuleSet::evaluate_detailed()`](super::ruleset::RuleSet::evaluate_detailed).
///
/// Contains the action, which rule produced it, the outcome of every rule
/// tried in order, and the wall-clock duration of the evaluation.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    action: Action,
    matched_rule: Option<usize>,
    outcomes: Vec<(usize, RuleOutcome)>,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(
        action: Action,
        matched_rule: Option<usize>,
        outcomes: Vec<(usize, RuleOutcome)>,
        duration: Duration,
    ) -> Self {
        Self {
            action,
            matched_rule,
            outcomes,
            duration,
        }
    }

    /// The action, same as [`RuleSet::evaluate()`](super::ruleset::RuleSet::evaluate).
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Index of the rule that produced the action, `None` on pass-through.
    #[must_use]
    pub fn matched_rule(&self) -> Option<usize> {
        self.matched_rule
    }

    /// `(rule index, outcome)` for each rule tried, in evaluation order.
    /// Rules after the winning one are not tried and do not appear.
    #[must_use]
    pub fn outcomes(&self) -> &[(usize, RuleOutcome)] {
        &self.outcomes
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action: {}", self.action)?;
        if let Some(idx) = self.matched_rule {
            write!(f, " (rule #{idx})")?;
        }
        write!(f, ", tried: [")?;
        for (i, (idx, outcome)) in self.outcomes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "#{idx} {outcome}")?;
        }
        write!(f, "], duration: {:?}", self.duration)
    }
}
