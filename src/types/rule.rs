use std::fmt;

use regex::{Captures, Regex, RegexBuilder};

use super::action::Action;
use super::condition::Condition;
use super::flag::{RuleFlag, RuleFlags};
use super::request::RequestInfo;

pub(crate) fn build_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
}

/// A compiled `RewriteRule`.
///
/// Carries the base in effect when it was declared, the source regex (compiled
/// case-insensitively under `NC`), the destination template, its flags, and
/// the conditions that were pending when the rule was read. Immutable once
/// built.
#[derive(Debug, Clone)]
pub struct Rule {
    base: String,
    source: Regex,
    destination: String,
    flags: RuleFlags,
    conditions: Vec<Condition>,
}

impl Rule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if `source` is not a valid regex.
    pub fn new(
        base: &str,
        source: &str,
        destination: &str,
        flags: RuleFlags,
        conditions: Vec<Condition>,
    ) -> Result<Self, regex::Error> {
        let source = build_regex(source, flags.no_case())?;
        Ok(Self {
            base: base.to_owned(),
            source,
            destination: destination.to_owned(),
            flags,
            conditions,
        })
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn source_pattern(&self) -> &str {
        self.source.as_str()
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn flags(&self) -> &RuleFlags {
        &self.flags
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Strip the base from `path`.
    ///
    /// `None` if the path does not start with the base, or if nothing is left
    /// after it (a request for the base itself is never rewritten).
    #[must_use]
    pub fn base_matches<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.base.as_str())
            .filter(|remainder| !remainder.is_empty())
    }

    /// All attached conditions hold, checked in declaration order.
    pub fn conditions_match<R: RequestInfo + ?Sized>(&self, req: &R) -> bool {
        self.conditions.iter().all(|c| c.matches(req))
    }

    /// Match the source pattern against the base-stripped remainder.
    ///
    /// When the first attempt fails and the remainder starts with `/`, one more
    /// attempt is made without that slash.
    #[must_use]
    pub fn matches(&self, remainder: &str) -> Option<Action> {
        let caps = self.source.captures(remainder).or_else(|| {
            remainder
                .strip_prefix('/')
                .and_then(|stripped| self.source.captures(stripped))
        })?;
        Some(self.action(substitute(&self.destination, &caps)))
    }

    fn action(&self, destination: String) -> Action {
        if self.flags.contains(RuleFlag::Forbidden) {
            Action::Forbidden
        } else if self.flags.contains(RuleFlag::Gone) {
            Action::Gone
        } else {
            Action::Redirect {
                code: self.flags.redirect_code(),
                destination,
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RewriteRule {} {}",
            self.source.as_str(),
            self.destination
        )?;
        if !self.flags.is_empty() {
            write!(f, " {}", self.flags)?;
        }
        write!(f, " (base {})", self.base)
    }
}

/// Replace `$N` backreferences in one left-to-right pass.
///
/// The longest run of digits naming an existing group wins, so `$12` reads
/// group 12 when present and otherwise group 1 followed by a literal `2`. Groups
/// that did not participate in the match expand to nothing. A `$` with no
/// resolvable group stays literal. Substituted text is never rescanned.
fn substitute(template: &str, caps: &Captures<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();

        let group = (1..=digits).rev().find_map(|len| {
            let index: usize = after[..len].parse().ok()?;
            (index < caps.len()).then_some((index, len))
        });

        match group {
            Some((index, len)) => {
                if let Some(m) = caps.get(index) {
                    out.push_str(m.as_str());
                }
                rest = &after[len..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
