use htrewrite::{Request, RuleSet};
use tracing_subscriber::EnvFilter;

const RULES: &str = r"
# Canonical host, legacy pages, blocked agents
Options +FollowSymLinks
RewriteEngine on

RewriteCond %{HTTP_HOST} ^www\.example\.com$ [NC]
RewriteRule ^(.*)$ https://example.com/$1 [R=301,L]

RewriteBase /blog/
RewriteRule ^(\d{4})/(\d{2})/(.+)\.php$ /blog/$1-$2/$3 [R=301]

RewriteBase /
RewriteCond %{HTTP_USER_AGENT} (scrapy|curl) [NC]
RewriteRule .* - [F]
RewriteRule ^retired/ - [G]
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let ruleset = RuleSet::from_htaccess(RULES).expect("invalid rule file");
    for diagnostic in ruleset.diagnostics() {
        println!("note: {diagnostic}");
    }

    let requests = [
        Request::get("/about").with_header("Host", "WWW.example.com"),
        Request::get("/blog/2019/07/hello.php?ref=rss").with_header("Host", "example.com"),
        Request::get("/docs").with_header("User-Agent", "curl/8.4.0"),
        Request::get("/retired/page"),
        Request::get("/contact"),
    ];

    for req in &requests {
        println!("{:?} -> {}", req, ruleset.evaluate(req));
    }
}
