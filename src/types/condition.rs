use std::fmt;

use regex::Regex;

use super::flag::CondFlags;
use super::request::RequestInfo;
use super::rule::build_regex;

/// A `%{NAME}` server variable that a test string can reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ServerVar {
    RequestMethod,
    RequestUri,
    QueryString,
    Https,
    Header(String),
}

impl ServerVar {
    fn from_name(name: &str) -> Option<Self> {
        if let Some(header) = name.strip_prefix("HTTP:") {
            return (!header.is_empty()).then(|| ServerVar::Header(header.to_owned()));
        }
        let var = match name {
            "REQUEST_METHOD" => ServerVar::RequestMethod,
            "REQUEST_URI" => ServerVar::RequestUri,
            "QUERY_STRING" => ServerVar::QueryString,
            "HTTPS" => ServerVar::Https,
            "HTTP_HOST" => ServerVar::Header("Host".into()),
            "HTTP_USER_AGENT" => ServerVar::Header("User-Agent".into()),
            "HTTP_REFERER" => ServerVar::Header("Referer".into()),
            "HTTP_COOKIE" => ServerVar::Header("Cookie".into()),
            "HTTP_ACCEPT" => ServerVar::Header("Accept".into()),
            "HTTP_FORWARDED" => ServerVar::Header("Forwarded".into()),
            "HTTP_CONNECTION" => ServerVar::Header("Connection".into()),
            "HTTP_PROXY_CONNECTION" => ServerVar::Header("Proxy-Connection".into()),
            _ => return None,
        };
        Some(var)
    }

    fn resolve<'r, R: RequestInfo + ?Sized>(&self, req: &'r R) -> &'r str {
        match self {
            ServerVar::RequestMethod => req.method(),
            ServerVar::RequestUri => req.path(),
            ServerVar::QueryString => req.query().unwrap_or(""),
            ServerVar::Https => {
                if req.is_secure() {
                    "on"
                } else {
                    "off"
                }
            }
            ServerVar::Header(name) => req.header(name).unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var(ServerVar),
    Unsupported,
}

/// A test string split once into literal text and variable references.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TestString {
    segments: Vec<Segment>,
}

impl TestString {
    fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(ch) = rest.chars().next() {
            let next = rest[ch.len_utf8()..].chars().next();
            match (ch, next) {
                ('%', Some('{')) => {
                    flush(&mut literal, &mut segments);
                    match rest[2..].split_once('}') {
                        Some((name, tail)) => {
                            segments.push(
                                ServerVar::from_name(name)
                                    .map_or(Segment::Unsupported, Segment::Var),
                            );
                            rest = tail;
                        }
                        None => {
                            segments.push(Segment::Unsupported);
                            rest = "";
                        }
                    }
                    continue;
                }
                // Rule (`$N`) and condition (`%N`) backreferences
                ('$' | '%', Some(d)) if d.is_ascii_digit() => {
                    flush(&mut literal, &mut segments);
                    segments.push(Segment::Unsupported);
                    rest = &rest[2..];
                    continue;
                }
                _ => literal.push(ch),
            }
            rest = &rest[ch.len_utf8()..];
        }
        flush(&mut literal, &mut segments);

        Self { segments }
    }

    /// `None` when the test string uses syntax the engine cannot resolve.
    fn resolve<R: RequestInfo + ?Sized>(&self, req: &R) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(var) => out.push_str(var.resolve(req)),
                Segment::Unsupported => return None,
            }
        }
        Some(out)
    }

    fn is_supported(&self) -> bool {
        !self.segments.contains(&Segment::Unsupported)
    }
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

/// A compiled `RewriteCond`: a test string resolved against the request and a
/// regular expression it must match.
///
/// A compare pattern starting with `!` is negated. Conditions hold no
/// per-request state.
#[derive(Debug, Clone)]
pub struct Condition {
    test_pattern: String,
    compare_pattern: String,
    test: TestString,
    regex: Regex,
    negated: bool,
    flags: CondFlags,
}

impl Condition {
    /// Compile a condition. The compare pattern is compiled here, once.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the compare pattern is not a valid regex.
    pub fn new(
        test_pattern: &str,
        compare_pattern: &str,
        flags: CondFlags,
    ) -> Result<Self, regex::Error> {
        let (negated, pattern) = match compare_pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, compare_pattern),
        };
        let regex = build_regex(pattern, flags.no_case())?;
        Ok(Self {
            test_pattern: test_pattern.to_owned(),
            compare_pattern: compare_pattern.to_owned(),
            test: TestString::parse(test_pattern),
            regex,
            negated,
            flags,
        })
    }

    #[must_use]
    pub fn test_pattern(&self) -> &str {
        &self.test_pattern
    }

    #[must_use]
    pub fn compare_pattern(&self) -> &str {
        &self.compare_pattern
    }

    #[must_use]
    pub fn flags(&self) -> &CondFlags {
        &self.flags
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether every construct in the test string can be resolved.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.test.is_supported()
    }

    /// Evaluate against a request. Unsupported test-string syntax never matches.
    pub fn matches<R: RequestInfo + ?Sized>(&self, req: &R) -> bool {
        match self.test.resolve(req) {
            Some(value) => self.regex.is_match(&value) != self.negated,
            None => {
                tracing::trace!(test = %self.test_pattern, "unsupported test string, condition fails");
                false
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RewriteCond {} {}", self.test_pattern, self.compare_pattern)?;
        if !self.flags.is_empty() {
            write!(f, " {}", self.flags)?;
        }
        Ok(())
    }
}
