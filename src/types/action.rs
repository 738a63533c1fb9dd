use std::fmt;

use super::flag::RedirectCode;

/// The decision reached for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
#[must_use]
pub enum Action {
    Redirect {
        code: RedirectCode,
        destination: String,
    },
    /// Maps to `403 Forbidden`.
    Forbidden,
    /// Maps to `410 Gone`.
    Gone,
    /// No rule applied; defer to the next handler.
    PassThrough,
}

impl Action {
    pub fn redirect(code: RedirectCode, destination: impl Into<String>) -> Self {
        Action::Redirect {
            code,
            destination: destination.into(),
        }
    }

    /// HTTP status the boundary should answer with, `None` for pass-through.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Action::Redirect { code, .. } => Some(code.as_u16()),
            Action::Forbidden => Some(403),
            Action::Gone => Some(410),
            Action::PassThrough => None,
        }
    }

    /// The `Location` target of a redirect.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        match self {
            Action::Redirect { destination, .. } => Some(destination),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Action::PassThrough)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Redirect { code, destination } => write!(f, "redirect {code} {destination}"),
            Action::Forbidden => write!(f, "forbidden"),
            Action::Gone => write!(f, "gone"),
            Action::PassThrough => write!(f, "pass-through"),
        }
    }
}
