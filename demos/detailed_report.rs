use htrewrite::{Request, RuleSet};

fn main() {
    let ruleset = RuleSet::compile_lines([
        "RewriteEngine on",
        "RewriteBase /admin/",
        "RewriteRule .* - [F]",
        "RewriteBase /",
        "RewriteCond %{REQUEST_METHOD} ^POST$",
        "RewriteRule ^form$ - [F]",
        "RewriteRule ^form$ /form.html [R]",
    ])
    .expect("failed to compile rules");

    let report = ruleset.evaluate_detailed(&Request::get("/form?step=2"));

    println!("{report}");
    println!();
    println!("Action: {}", report.action());
    println!("Matched rule: {:?}", report.matched_rule());
    println!("Outcomes: {:?}", report.outcomes());
    println!("Duration: {:?}", report.duration());
}
