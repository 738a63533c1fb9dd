use std::time::Instant;

use tracing::{debug, trace};

use crate::{Action, EvaluationReport, RequestInfo, Rule, RuleOutcome};

pub(crate) fn evaluate<R: RequestInfo + ?Sized>(rules: &[Rule], req: &R) -> Action {
    let path = req.path();

    // First rule that yields an action wins
    for (idx, rule) in rules.iter().enumerate() {
        if let Ok(action) = apply_rule(rule, path, req) {
            let action = append_query(action, req.query());
            debug!(rule = idx, path, %action, "rewrite rule matched");
            return action;
        }
    }

    trace!(path, "no rewrite rule matched");
    Action::PassThrough
}

pub(crate) fn evaluate_detailed<R: RequestInfo + ?Sized>(
    rules: &[Rule],
    req: &R,
) -> EvaluationReport {
    let start = Instant::now();
    let path = req.path();
    let mut outcomes = Vec::new();

    for (idx, rule) in rules.iter().enumerate() {
        match apply_rule(rule, path, req) {
            Ok(action) => {
                outcomes.push((idx, RuleOutcome::Matched));
                let action = append_query(action, req.query());
                return EvaluationReport::new(action, Some(idx), outcomes, start.elapsed());
            }
            Err(outcome) => outcomes.push((idx, outcome)),
        }
    }

    EvaluationReport::new(Action::PassThrough, None, outcomes, start.elapsed())
}

/// Base prefix first since it is the cheapest check, then conditions, then the
/// source pattern.
fn apply_rule<R: RequestInfo + ?Sized>(
    rule: &Rule,
    path: &str,
    req: &R,
) -> Result<Action, RuleOutcome> {
    let remainder = rule.base_matches(path).ok_or(RuleOutcome::BaseMismatch)?;
    if !rule.conditions_match(req) {
        return Err(RuleOutcome::ConditionsFailed);
    }
    rule.matches(remainder).ok_or(RuleOutcome::PatternMismatch)
}

/// Redirects carry the original query string verbatim, even when the
/// destination already has one.
fn append_query(action: Action, query: Option<&str>) -> Action {
    match (action, query) {
        (
            Action::Redirect {
                code,
                mut destination,
            },
            Some(query),
        ) if !query.is_empty() => {
            destination.push('?');
            destination.push_str(query);
            Action::Redirect { code, destination }
        }
        (action, _) => action,
    }
}

#[cfg(test)]
mod tests {
    use crate::{Action, RedirectCode, Request, RuleOutcome, RuleSet, RuleSetBuilder};

    fn ruleset(lines: &[&str]) -> RuleSet {
        RuleSet::compile_lines(lines).unwrap()
    }

    #[test]
    fn first_matching_rule_wins() {
        let rs = ruleset(&[
            "RewriteEngine on",
            "RewriteRule ^page\\.html$ /first.html [R]",
            "RewriteRule ^page\\.html$ /second.html [R=301]",
        ]);
        assert_eq!(
            rs.evaluate(&Request::get("/page.html")),
            Action::redirect(RedirectCode::Found, "/first.html")
        );
    }

    #[test]
    fn less_specific_earlier_rule_still_wins() {
        let rs = ruleset(&[
            "RewriteEngine on",
            "RewriteRule .* - [F]",
            "RewriteRule ^exact\\.html$ /dest.html [R]",
        ]);
        assert_eq!(rs.evaluate(&Request::get("/exact.html")), Action::Forbidden);
    }

    #[test]
    fn base_mismatch_skips_rule() {
        let rs = ruleset(&[
            "RewriteEngine on",
            "RewriteBase /blog/",
            "RewriteRule ^(.*)$ /archive/$1 [R]",
        ]);
        assert_eq!(
            rs.evaluate(&Request::get("/blog/post-1")),
            Action::redirect(RedirectCode::Found, "/archive/post-1")
        );
        assert_eq!(rs.evaluate(&Request::get("/shop/item")), Action::PassThrough);
    }

    #[test]
    fn failed_conditions_fall_through_to_next_rule() {
        let rs = ruleset(&[
            "RewriteEngine on",
            "RewriteCond %{REQUEST_METHOD} ^POST$",
            "RewriteRule ^form$ - [F]",
            "RewriteRule ^form$ /form.html [R]",
        ]);
        assert_eq!(
            rs.evaluate(&Request::get("/form")),
            Action::redirect(RedirectCode::Found, "/form.html")
        );
        assert_eq!(rs.evaluate(&Request::new("POST", "/form")), Action::Forbidden);
    }

    #[test]
    fn query_appended_to_redirect() {
        let rs = ruleset(&["RewriteEngine on", "RewriteRule ^a$ /b [R]"]);
        assert_eq!(
            rs.evaluate(&Request::get("/a?x=1&y=2")),
            Action::redirect(RedirectCode::Found, "/b?x=1&y=2")
        );
    }

    #[test]
    fn empty_query_not_appended() {
        let rs = ruleset(&["RewriteEngine on", "RewriteRule ^a$ /b [R]"]);
        assert_eq!(
            rs.evaluate(&Request::get("/a?")),
            Action::redirect(RedirectCode::Found, "/b")
        );
    }

    #[test]
    fn query_appended_even_when_destination_has_one() {
        let rs = ruleset(&["RewriteEngine on", "RewriteRule ^a$ /b?lang=en [R]"]);
        assert_eq!(
            rs.evaluate(&Request::get("/a?x=1")),
            Action::redirect(RedirectCode::Found, "/b?lang=en?x=1")
        );
    }

    #[test]
    fn query_not_part_of_match_subject() {
        let rs = ruleset(&["RewriteEngine on", "RewriteRule x=1 /hit [R]"]);
        assert_eq!(rs.evaluate(&Request::get("/page?x=1")), Action::PassThrough);
    }

    #[test]
    fn block_actions_ignore_query() {
        let rs = ruleset(&["RewriteEngine on", "RewriteRule ^a$ - [G]"]);
        assert_eq!(rs.evaluate(&Request::get("/a?x=1")), Action::Gone);
    }

    #[test]
    fn empty_ruleset_passes_through() {
        let rs = RuleSet::default();
        assert_eq!(rs.evaluate(&Request::get("/anything")), Action::PassThrough);
    }

    #[test]
    fn detailed_report_records_outcomes() {
        let rs = RuleSetBuilder::new()
            .engine(true)
            .base("/admin/")
            .rule(".*", "-", "[F]")
            .base("/")
            .condition("%{REQUEST_METHOD}", "^DELETE$", "")
            .rule(".*", "-", "[F]")
            .rule("^old$", "/new", "[R=301]")
            .rule("^old$", "/never", "[R]")
            .compile()
            .unwrap();

        let report = rs.evaluate_detailed(&Request::get("/old?q=1"));
        assert_eq!(
            report.action(),
            &Action::redirect(RedirectCode::MovedPermanently, "/new?q=1")
        );
        assert_eq!(report.matched_rule(), Some(2));
        assert_eq!(
            report.outcomes(),
            &[
                (0, RuleOutcome::BaseMismatch),
                (1, RuleOutcome::ConditionsFailed),
                (2, RuleOutcome::Matched),
            ]
        );
    }

    #[test]
    fn detailed_report_pass_through() {
        let rs = ruleset(&["RewriteEngine on", "RewriteRule ^a$ /b"]);
        let report = rs.evaluate_detailed(&Request::get("/z"));
        assert!(report.action().is_pass_through());
        assert_eq!(report.matched_rule(), None);
        assert_eq!(report.outcomes(), &[(0, RuleOutcome::PatternMismatch)]);
    }

    #[test]
    fn detailed_agrees_with_evaluate() {
        let rs = ruleset(&[
            "RewriteEngine on",
            "RewriteRule ^a/(\\w+)/(\\w+)$ /b/$2/$1 [R=301]",
            "RewriteRule ^c$ - [F]",
        ]);
        for uri in ["/a/x/y", "/a/x/y?z", "/c", "/d"] {
            let req = Request::get(uri);
            assert_eq!(&rs.evaluate(&req), rs.evaluate_detailed(&req).action(), "failed for {uri}");
        }
    }
}
