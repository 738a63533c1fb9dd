use std::fmt;

use super::action::Action;
use super::diagnostic::Diagnostic;
use super::error::CompileError;
use super::evaluation_report::EvaluationReport;
use super::request::RequestInfo;
use super::rule::Rule;
use crate::parse::{Directive, DirectiveLine};

/// Builder for constructing a [`RuleSet`] without a rule file.
///
/// Each call appends one directive, so the builder follows the same rules as
/// a file: the engine starts disabled, conditions attach to the next rule
/// only, and the base in effect when a rule is added is the one it keeps.
///
/// # Example
///
/// ```
/// use htrewrite::{Action, RedirectCode, Request, RuleSetBuilder};
///
/// let ruleset = RuleSetBuilder::new()
///     .engine(true)
///     .condition("%{REQUEST_METHOD}", "^GET$", "")
///     .rule("^old/(.*)$", "/new/$1", "[R=301,L]")
///     .compile()
///     .unwrap();
///
/// assert_eq!(
///     ruleset.evaluate(&Request::get("/old/page.html")),
///     Action::redirect(RedirectCode::MovedPermanently, "/new/page.html")
/// );
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    directives: Vec<DirectiveLine>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `RewriteEngine on|off`
    #[must_use]
    pub fn engine(self, enabled: bool) -> Self {
        self.push(Directive::Engine(enabled))
    }

    /// `RewriteBase <path>`
    #[must_use]
    pub fn base(self, path: &str) -> Self {
        self.push(Directive::Base(path.to_owned()))
    }

    /// `RewriteCond <test> <pattern> [flags]`. Pass `""` for no flags.
    #[must_use]
    pub fn condition(self, test: &str, pattern: &str, flags: &str) -> Self {
        self.push(Directive::Cond {
            test: test.to_owned(),
            pattern: pattern.to_owned(),
            flags: non_empty(flags),
        })
    }

    /// `RewriteRule <source> <destination> [flags]`. Pass `""` for no flags.
    #[must_use]
    pub fn rule(self, source: &str, destination: &str, flags: &str) -> Self {
        self.push(Directive::Rule {
            source: source.to_owned(),
            destination: destination.to_owned(),
            flags: non_empty(flags),
        })
    }

    /// Compile the directives into an immutable `RuleSet`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a pattern fails to compile. Line numbers
    /// count builder calls from 1.
    pub fn compile(self) -> Result<RuleSet, CompileError> {
        crate::compile::compile(self.directives)
    }

    fn push(mut self, directive: Directive) -> Self {
        let line = self.directives.len() + 1;
        self.directives.push(DirectiveLine {
            line,
            directive,
            extra: Vec::new(),
        });
        self
    }
}

fn non_empty(flags: &str) -> Option<String> {
    let flags = flags.trim();
    (!flags.is_empty()).then(|| flags.to_owned())
}

/// A compiled, immutable rule set. Thread-safe and designed to live behind `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub(crate) rules: Vec<Rule>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl RuleSet {
    /// Decide what to do with a request.
    ///
    /// Rules are tried in file order and the first one that applies wins.
    /// Returns [`Action::PassThrough`] when none does.
    pub fn evaluate<R: RequestInfo + ?Sized>(&self, req: &R) -> Action {
        crate::evaluate::evaluate(&self.rules, req)
    }

    /// Evaluate with diagnostics.
    ///
    /// Returns an [`EvaluationReport`] with the action, the winning rule, the
    /// outcome of every rule tried, and timing information.
    pub fn evaluate_detailed<R: RequestInfo + ?Sized>(&self, req: &R) -> EvaluationReport {
        crate::evaluate::evaluate_detailed(&self.rules, req)
    }

    /// Parse and compile rule file text.
    ///
    /// Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`HtrewriteError`](crate::HtrewriteError) on parse or compile failure.
    pub fn from_htaccess(input: &str) -> Result<Self, crate::HtrewriteError> {
        let directives = crate::parse::parse(input);
        let ruleset = crate::compile::compile(directives)?;
        Ok(ruleset)
    }

    /// Compile a sequence of directive lines, one directive per item.
    ///
    /// Blank and `#` lines are tolerated and skipped; line numbers in errors and
    /// diagnostics are 1-based positions in `lines`.
    ///
    /// # Errors
    ///
    /// Returns [`HtrewriteError`](crate::HtrewriteError) on parse or compile failure.
    pub fn compile_lines<I>(lines: I) -> Result<Self, crate::HtrewriteError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let lines: Vec<I::Item> = lines.into_iter().collect();
        let numbered = lines
            .iter()
            .enumerate()
            .map(|(i, line)| (i + 1, line.as_ref().trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));
        let directives = crate::parse::parse_lines(numbered);
        let ruleset = crate::compile::compile(directives)?;
        Ok(ruleset)
    }

    /// Read a rule file and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`HtrewriteError`](crate::HtrewriteError) on I/O, parse, or compile failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::HtrewriteError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_htaccess(&input)
    }

    /// Compiled rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Non-fatal problems found while compiling, in line order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} rules, {} diagnostics)",
            self.rules.len(),
            self.diagnostics.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RedirectCode, Request};

    #[test]
    fn builder_collects_directives() {
        let builder = RuleSetBuilder::new()
            .engine(true)
            .base("/app/")
            .condition("%{HTTP_HOST}", "^a$", "[NC]")
            .rule("^x$", "/y", "[R]");

        assert_eq!(builder.directives.len(), 4);
        assert_eq!(builder.directives[0].directive, Directive::Engine(true));
        assert_eq!(builder.directives[3].line, 4);
    }

    #[test]
    fn builder_empty_flags_are_none() {
        let builder = RuleSetBuilder::new().rule("a", "b", "  ");
        assert!(matches!(
            &builder.directives[0].directive,
            Directive::Rule { flags: None, .. }
        ));
    }

    #[test]
    fn builder_without_engine_compiles_nothing() {
        let ruleset = RuleSetBuilder::new()
            .rule("^a$", "/b", "[R]")
            .compile()
            .unwrap();
        assert!(ruleset.is_empty());
    }

    #[test]
    fn builder_invalid_pattern_reports_call_position() {
        let err = RuleSetBuilder::new()
            .engine(true)
            .rule("(", "/b", "")
            .compile()
            .unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn compile_lines_matches_from_htaccess() {
        let lines = ["RewriteEngine on", "RewriteRule ^a$ /b [R=301]"];
        let from_lines = RuleSet::compile_lines(lines).unwrap();
        let from_text = RuleSet::from_htaccess(&lines.join("\n")).unwrap();

        let req = Request::get("/a");
        assert_eq!(from_lines.evaluate(&req), from_text.evaluate(&req));
        assert_eq!(
            from_lines.evaluate(&req),
            Action::redirect(RedirectCode::MovedPermanently, "/b")
        );
    }

    #[test]
    fn compile_lines_accepts_owned_strings() {
        let lines = vec![
            String::from("RewriteEngine on"),
            String::new(),
            String::from("# note"),
            String::from("RewriteRule ^a$ - [G]"),
        ];
        let ruleset = RuleSet::compile_lines(lines).unwrap();
        assert_eq!(ruleset.len(), 1);
        assert_eq!(ruleset.evaluate(&Request::get("/a")), Action::Gone);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = RuleSet::from_file("/nonexistent/.htaccess").unwrap_err();
        assert!(matches!(err, crate::HtrewriteError::Io(_)));
    }

    #[test]
    fn display() {
        let ruleset = RuleSet::from_htaccess("RewriteEngine on\nOptions -Indexes\nRewriteRule a b")
            .unwrap();
        assert_eq!(ruleset.to_string(), "RuleSet(1 rules, 1 diagnostics)");
    }
}
