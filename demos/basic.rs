use htrewrite::{Request, RuleSetBuilder};

fn main() {
    let ruleset = RuleSetBuilder::new()
        .engine(true)
        .rule("^source1\\.html$", "/dest1.html", "[R]")
        .rule("^old/(.*)$", "/new/$1", "[R=301,L]")
        .rule("^private", "-", "[F]")
        .compile()
        .expect("failed to compile rules");

    println!("{ruleset}");

    for uri in ["/source1.html?x=1", "/old/a/b", "/private/keys", "/index.html"] {
        let action = ruleset.evaluate(&Request::get(uri));
        println!("{uri:<20} -> {action}");
    }
}
