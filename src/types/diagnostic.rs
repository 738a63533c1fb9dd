use std::fmt;

/// A non-fatal problem found while compiling a rule file.
///
/// Diagnostics are logged through `tracing` as they are found and kept on the
/// [`RuleSet`](super::RuleSet) for callers without a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    line: usize,
    kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The leading token is not a supported directive. The line is skipped.
    UnrecognizedDirective { directive: String },
    /// A flag token outside the supported set. The token is dropped.
    UnknownFlag { flag: String },
    /// Tokens after the flag field. They are ignored.
    ExtraArguments { directive: String, extra: Vec<String> },
}

impl Diagnostic {
    pub(crate) fn new(line: usize, kind: DiagnosticKind) -> Self {
        Self { line, kind }
    }

    /// 1-based line number in the rule file.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn kind(&self) -> &DiagnosticKind {
        &self.kind
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            DiagnosticKind::UnrecognizedDirective { directive } => {
                write!(f, "directive '{directive}' not understood")
            }
            DiagnosticKind::UnknownFlag { flag } => write!(f, "unknown flag '{flag}' ignored"),
            DiagnosticKind::ExtraArguments { directive, extra } => write!(
                f,
                "extra arguments to {directive} ignored: {}",
                extra.join(" ")
            ),
        }
    }
}
