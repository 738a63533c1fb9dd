/// The narrow view of an HTTP request the engine needs.
///
/// Implemented by [`Request`] and, with the `http` feature, by
/// `http::Request<B>`. Boundary layers can implement it for their own types.
pub trait RequestInfo {
    /// URL path without query string, e.g. `/source.html`.
    fn path(&self) -> &str;

    /// Raw query string without the leading `?`, if any.
    fn query(&self) -> Option<&str>;

    /// HTTP method, e.g. `GET`.
    fn method(&self) -> &str;

    /// Header value by name. Lookup must be case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;

    /// Whether the request arrived over TLS.
    fn is_secure(&self) -> bool {
        false
    }
}

impl<T: RequestInfo + ?Sized> RequestInfo for &T {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn query(&self) -> Option<&str> {
        (**self).query()
    }

    fn method(&self) -> &str {
        (**self).method()
    }

    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }

    fn is_secure(&self) -> bool {
        (**self).is_secure()
    }
}

/// Owned request descriptor.
///
/// # Example
///
/// ```
/// use htrewrite::{Request, RequestInfo};
///
/// let req = Request::get("/source2.html?var1=1&var2=abcd")
///     .with_header("Host", "example.com");
/// assert_eq!(req.path(), "/source2.html");
/// assert_eq!(req.query(), Some("var1=1&var2=abcd"));
/// assert_eq!(req.header("host"), Some("example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    secure: bool,
}

impl Request {
    /// Build a request from a method and a request target.
    ///
    /// The target is split at the first `?` into path and query; a `#fragment`
    /// is dropped. Absolute-form targets (`http://host/path`) keep only the path.
    #[must_use]
    pub fn new(method: &str, uri: &str) -> Self {
        let (path, query) = split_uri(uri);
        Self {
            method: method.to_owned(),
            path: path.to_owned(),
            query: query.map(str::to_owned),
            headers: Vec::new(),
            secure: false,
        }
    }

    /// Shorthand for `Request::new("GET", uri)`.
    #[must_use]
    pub fn get(uri: &str) -> Self {
        Self::new("GET", uri)
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl RequestInfo for Request {
    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn is_secure(&self) -> bool {
        self.secure
    }
}

fn split_uri(uri: &str) -> (&str, Option<&str>) {
    let uri = uri.split_once('#').map_or(uri, |(before, _)| before);
    let (target, query) = match uri.split_once('?') {
        Some((target, query)) => (target, Some(query)),
        None => (uri, None),
    };
    (strip_authority(target), query)
}

/// `scheme://host/path` keeps `/path`; origin-form targets are returned as is.
fn strip_authority(target: &str) -> &str {
    if target.starts_with('/') {
        return target;
    }
    match target.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => rest.find('/').map_or("", |i| &rest[i..]),
        _ => target,
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
