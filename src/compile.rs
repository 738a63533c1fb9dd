use tracing::{debug, warn};

use crate::parse::{Directive, DirectiveLine, ParseError};
use crate::types::{CondFlags, Condition, Diagnostic, DiagnosticKind, UnknownFlag};
use crate::{CompileError, Rule, RuleFlags, RuleSet};

/// Running state threaded through the directive fold.
#[derive(Debug)]
struct CompileState {
    engine_enabled: bool,
    base: String,
    pending: Vec<Condition>,
    rules: Vec<Rule>,
    diagnostics: Vec<Diagnostic>,
}

impl CompileState {
    fn new() -> Self {
        Self {
            engine_enabled: false,
            base: "/".to_owned(),
            pending: Vec::new(),
            rules: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn apply(mut self, entry: DirectiveLine) -> Result<Self, CompileError> {
        let DirectiveLine {
            line,
            directive,
            extra,
        } = entry;

        if !extra.is_empty() {
            self.report(
                line,
                DiagnosticKind::ExtraArguments {
                    directive: directive.keyword().to_owned(),
                    extra,
                },
            );
        }

        match directive {
            Directive::Engine(enabled) => {
                debug!(line, enabled, "rewrite engine toggled");
                self.engine_enabled = enabled;
            }
            Directive::Unrecognized(name) => {
                self.report(line, DiagnosticKind::UnrecognizedDirective { directive: name });
            }
            _ if !self.engine_enabled => {
                debug!(line, directive = directive.keyword(), "rewrite engine off, directive ignored");
            }
            Directive::Malformed { keyword, reason } => {
                return Err(ParseError::new(line, format!("{keyword}: {reason}")).into());
            }
            Directive::Base(path) => self.base = path,
            Directive::Cond {
                test,
                pattern,
                flags,
            } => {
                let (flags, unknown) = CondFlags::parse(flags.as_deref().unwrap_or(""));
                self.report_flags(line, unknown);
                let condition = Condition::new(&test, &pattern, flags).map_err(|source| {
                    CompileError::InvalidConditionPattern {
                        line,
                        pattern: pattern.clone(),
                        source,
                    }
                })?;
                if !condition.is_supported() {
                    debug!(line, test = %test, "condition test string is not resolvable and will never match");
                }
                self.pending.push(condition);
            }
            Directive::Rule {
                source,
                destination,
                flags,
            } => {
                let (flags, unknown) = RuleFlags::parse(flags.as_deref().unwrap_or(""));
                self.report_flags(line, unknown);
                let conditions = std::mem::take(&mut self.pending);
                let rule = Rule::new(&self.base, &source, &destination, flags, conditions)
                    .map_err(|e| CompileError::InvalidPattern {
                        line,
                        pattern: source.clone(),
                        source: e,
                    })?;
                debug!(line, %rule, "compiled rewrite rule");
                self.rules.push(rule);
            }
        }
        Ok(self)
    }

    fn report_flags(&mut self, line: usize, unknown: Vec<UnknownFlag>) {
        for UnknownFlag(flag) in unknown {
            self.report(line, DiagnosticKind::UnknownFlag { flag });
        }
    }

    fn report(&mut self, line: usize, kind: DiagnosticKind) {
        let diagnostic = Diagnostic::new(line, kind);
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    fn finish(self) -> RuleSet {
        if !self.pending.is_empty() {
            debug!(
                count = self.pending.len(),
                "conditions without a following rule discarded"
            );
        }
        RuleSet {
            rules: self.rules,
            diagnostics: self.diagnostics,
        }
    }
}

pub(crate) fn compile<I>(directives: I) -> Result<RuleSet, CompileError>
where
    I: IntoIterator<Item = DirectiveLine>,
{
    directives
        .into_iter()
        .try_fold(CompileState::new(), CompileState::apply)
        .map(CompileState::finish)
}

#[cfg(test)]
mod tests {
    use crate::{Action, CompileError, DiagnosticKind, RedirectCode, Request, RuleSet};

    fn compile(input: &str) -> RuleSet {
        RuleSet::from_htaccess(input).unwrap()
    }

    #[test]
    fn engine_starts_disabled() {
        let ruleset = compile("RewriteRule ^a$ /b [R]");
        assert!(ruleset.is_empty());
    }

    #[test]
    fn engine_off_ignores_everything() {
        let ruleset = compile(
            "RewriteEngine off\nRewriteBase /x/\nRewriteCond %{HTTP_HOST} ^a$\nRewriteRule ^a$ /b [R]",
        );
        assert!(ruleset.is_empty());
        assert!(ruleset.diagnostics().is_empty());
    }

    #[test]
    fn engine_off_keeps_previous_rules() {
        let ruleset = compile(
            "RewriteEngine on\nRewriteRule ^a$ /b\nRewriteEngine off\nRewriteRule ^c$ /d",
        );
        assert_eq!(ruleset.len(), 1);
        assert_eq!(ruleset.rules()[0].destination(), "/b");
    }

    #[test]
    fn engine_off_ignores_malformed_directives() {
        let ruleset = compile(
            "RewriteEngine off\n\
             RewriteRule onlysource\n\
             RewriteCond %{HTTP_HOST}\n\
             RewriteBase\n\
             RewriteRule a b [R=301\n\
             RewriteCond \"unterminated ^a$",
        );
        assert!(ruleset.is_empty());
        assert!(ruleset.diagnostics().is_empty());
    }

    #[test]
    fn malformed_directive_while_on_is_fatal() {
        let err = RuleSet::from_htaccess("RewriteEngine on\nRewriteRule onlysource").unwrap_err();
        match err {
            crate::HtrewriteError::Compile(CompileError::Malformed(e)) => {
                assert_eq!(e.line(), 2);
                assert!(e.to_string().contains("RewriteRule"), "{e}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn malformed_engine_line_keeps_engine_off() {
        let ruleset = compile("RewriteEngine\nRewriteRule ^a$ /b [R]");
        assert!(ruleset.is_empty());
    }

    #[test]
    fn engine_off_skips_pattern_compilation() {
        let ruleset = compile("RewriteEngine off\nRewriteRule ( /b");
        assert!(ruleset.is_empty());
    }

    #[test]
    fn base_ignored_while_off() {
        let ruleset = compile(
            "RewriteBase /ignored/\nRewriteEngine on\nRewriteRule ^a$ /b",
        );
        assert_eq!(ruleset.rules()[0].base(), "/");
    }

    #[test]
    fn base_fixed_at_rule_construction() {
        let ruleset = compile(
            "RewriteEngine on\nRewriteBase /one/\nRewriteRule ^a$ /b\nRewriteBase /two/\nRewriteRule ^c$ /d",
        );
        assert_eq!(ruleset.rules()[0].base(), "/one/");
        assert_eq!(ruleset.rules()[1].base(), "/two/");
    }

    #[test]
    fn conditions_attach_to_next_rule_only() {
        let ruleset = compile(
            "RewriteEngine on\n\
             RewriteCond %{REQUEST_METHOD} ^POST$\n\
             RewriteCond %{HTTP_HOST} ^a$\n\
             RewriteRule ^a$ /b\n\
             RewriteRule ^c$ /d",
        );
        assert_eq!(ruleset.rules()[0].conditions().len(), 2);
        assert_eq!(ruleset.rules()[0].conditions()[0].test_pattern(), "%{REQUEST_METHOD}");
        assert!(ruleset.rules()[1].conditions().is_empty());
    }

    #[test]
    fn conditions_while_off_are_dropped() {
        let ruleset = compile(
            "RewriteCond %{REQUEST_METHOD} ^POST$\nRewriteEngine on\nRewriteRule ^a$ /b",
        );
        assert!(ruleset.rules()[0].conditions().is_empty());
    }

    #[test]
    fn unrecognized_directive_reported_and_skipped() {
        let ruleset = compile(
            "Options +FollowSymLinks\nRewriteEngine on\nRewriteOptions inherit\nRewriteRule ^a$ /b",
        );
        assert_eq!(ruleset.len(), 1);
        let kinds: Vec<_> = ruleset.diagnostics().iter().map(|d| (d.line(), d.kind().clone())).collect();
        assert_eq!(
            kinds,
            vec![
                (1, DiagnosticKind::UnrecognizedDirective { directive: "Options".into() }),
                (3, DiagnosticKind::UnrecognizedDirective { directive: "RewriteOptions".into() }),
            ]
        );
    }

    #[test]
    fn unknown_flags_reported() {
        let ruleset = compile("RewriteEngine on\nRewriteRule ^a$ /b [R=301,QSA]");
        assert_eq!(ruleset.diagnostics().len(), 1);
        assert_eq!(
            ruleset.diagnostics()[0].kind(),
            &DiagnosticKind::UnknownFlag { flag: "QSA".into() }
        );
        assert_eq!(
            ruleset.evaluate(&Request::get("/a")),
            Action::redirect(RedirectCode::MovedPermanently, "/b")
        );
    }

    #[test]
    fn extra_arguments_reported() {
        let ruleset = compile("RewriteEngine on\nRewriteRule ^a$ /b [R] trailing");
        assert_eq!(ruleset.len(), 1);
        assert!(matches!(
            ruleset.diagnostics()[0].kind(),
            DiagnosticKind::ExtraArguments { directive, extra }
                if directive == "RewriteRule" && extra == &vec!["trailing".to_owned()]
        ));
    }

    #[test]
    fn invalid_rule_pattern_is_fatal() {
        let err = RuleSet::from_htaccess("RewriteEngine on\nRewriteRule ^(a$ /b").unwrap_err();
        match err {
            crate::HtrewriteError::Compile(CompileError::InvalidPattern { line, pattern, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(pattern, "^(a$");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn invalid_condition_pattern_is_fatal() {
        let err = RuleSet::from_htaccess(
            "RewriteEngine on\nRewriteCond %{HTTP_HOST} [a\nRewriteRule ^a$ /b",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::HtrewriteError::Compile(CompileError::InvalidConditionPattern { line: 2, .. })
        ));
    }

    #[test]
    fn compile_is_deterministic() {
        let input = "RewriteEngine on\nRewriteRule ^a$ /b [R]\nRewriteRule ^c$ - [F]\nRewriteRule ^e$ - [G]";
        let first: Vec<String> = compile(input).rules().iter().map(ToString::to_string).collect();
        let second: Vec<String> = compile(input).rules().iter().map(ToString::to_string).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
