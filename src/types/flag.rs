use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Status code attached to a redirect action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RedirectCode {
    /// `301 Moved Permanently`, selected by `R=301`.
    MovedPermanently,
    /// `302 Found`, the default for bare `R`, `R=302`, or no redirect flag at all.
    Found,
}

impl RedirectCode {
    #[must_use]
    pub fn as_u16(self) -> u16 {
        match self {
            RedirectCode::MovedPermanently => 301,
            RedirectCode::Found => 302,
        }
    }
}

impl fmt::Display for RedirectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A single `RewriteRule` flag, parsed once when the rule is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleFlag {
    Redirect(RedirectCode),
    Forbidden,
    Gone,
    Last,
    NoCase,
}

/// A flag token that is not part of the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlag(pub String);

impl FromStr for RuleFlag {
    type Err = UnknownFlag;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let upper = token.to_ascii_uppercase();
        match upper.as_str() {
            "R" | "R=302" => Ok(RuleFlag::Redirect(RedirectCode::Found)),
            "R=301" => Ok(RuleFlag::Redirect(RedirectCode::MovedPermanently)),
            "F" => Ok(RuleFlag::Forbidden),
            "G" => Ok(RuleFlag::Gone),
            "L" => Ok(RuleFlag::Last),
            "NC" => Ok(RuleFlag::NoCase),
            _ => Err(UnknownFlag(token.to_owned())),
        }
    }
}

impl fmt::Display for RuleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleFlag::Redirect(code) => write!(f, "R={code}"),
            RuleFlag::Forbidden => write!(f, "F"),
            RuleFlag::Gone => write!(f, "G"),
            RuleFlag::Last => write!(f, "L"),
            RuleFlag::NoCase => write!(f, "NC"),
        }
    }
}

/// Flag modifiers accepted on a `RewriteCond`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CondFlag {
    NoCase,
}

impl FromStr for CondFlag {
    type Err = UnknownFlag;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.eq_ignore_ascii_case("NC") || token.eq_ignore_ascii_case("nocase") {
            Ok(CondFlag::NoCase)
        } else {
            Err(UnknownFlag(token.to_owned()))
        }
    }
}

impl fmt::Display for CondFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondFlag::NoCase => write!(f, "NC"),
        }
    }
}

/// Normalized, order-insensitive set of flags. Duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet<F: Ord>(BTreeSet<F>);

impl<F: Ord> Default for FlagSet<F> {
    fn default() -> Self {
        Self(BTreeSet::new())
    }
}

pub type RuleFlags = FlagSet<RuleFlag>;
pub type CondFlags = FlagSet<CondFlag>;

impl<F> FlagSet<F>
where
    F: Ord + Copy + FromStr<Err = UnknownFlag>,
{
    /// Parse a flag field such as `[R=301,NC]`.
    ///
    /// Surrounding brackets are stripped, the rest is split on commas and each
    /// token trimmed. Tokens that are not recognized are returned alongside the
    /// set rather than failing the parse.
    pub fn parse(field: &str) -> (Self, Vec<UnknownFlag>) {
        let mut flags = BTreeSet::new();
        let mut unknown = Vec::new();
        for token in flag_tokens(field) {
            match token.parse::<F>() {
                Ok(flag) => {
                    flags.insert(flag);
                }
                Err(e) => unknown.push(e),
            }
        }
        (Self(flags), unknown)
    }

    #[must_use]
    pub fn contains(&self, flag: F) -> bool {
        self.0.contains(&flag)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        self.0.iter().copied()
    }
}

impl<F: Ord> FromIterator<F> for FlagSet<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl RuleFlags {
    /// `301` if any `R=301` is present, otherwise `302`.
    #[must_use]
    pub fn redirect_code(&self) -> RedirectCode {
        if self.contains(RuleFlag::Redirect(RedirectCode::MovedPermanently)) {
            RedirectCode::MovedPermanently
        } else {
            RedirectCode::Found
        }
    }

    #[must_use]
    pub fn no_case(&self) -> bool {
        self.contains(RuleFlag::NoCase)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.contains(RuleFlag::Last)
    }
}

impl CondFlags {
    #[must_use]
    pub fn no_case(&self) -> bool {
        self.contains(CondFlag::NoCase)
    }
}

impl<F: Ord + fmt::Display> fmt::Display for FlagSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, "[")?;
        for (i, flag) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{flag}")?;
        }
        write!(f, "]")
    }
}

fn flag_tokens(field: &str) -> impl Iterator<Item = &str> {
    let inner = field.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner.split(',').map(str::trim).filter(|t| !t.is_empty())
}
