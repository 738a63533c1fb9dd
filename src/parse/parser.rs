/// One recognized directive, arguments still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `RewriteEngine on|off`
    Engine(bool),
    /// `RewriteBase <path>`
    Base(String),
    /// `RewriteCond <test> <pattern> [flags]`
    Cond {
        test: String,
        pattern: String,
        flags: Option<String>,
    },
    /// `RewriteRule <source> <destination> [flags]`
    Rule {
        source: String,
        destination: String,
        flags: Option<String>,
    },
    /// A known directive whose arguments did not parse.
    Malformed { keyword: String, reason: String },
    /// Any other leading token.
    Unrecognized(String),
}

impl Directive {
    /// The directive keyword as it is conventionally spelled.
    #[must_use]
    pub fn keyword(&self) -> &str {
        match self {
            Directive::Engine(_) => "RewriteEngine",
            Directive::Base(_) => "RewriteBase",
            Directive::Cond { .. } => "RewriteCond",
            Directive::Rule { .. } => "RewriteRule",
            Directive::Malformed { keyword, .. } => keyword,
            Directive::Unrecognized(name) => name,
        }
    }
}

/// A parsed directive together with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveLine {
    pub line: usize,
    pub directive: Directive,
    /// Tokens past the last argument the directive takes.
    pub extra: Vec<String>,
}
