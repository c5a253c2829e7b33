//! Diagnostic severities, ordered by pipeline-halting significance.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    /// Unrecoverable; drivers stop the pipeline on the first one.
    Fatal,
    Error,
    Warning,
    Info,
    Note,
    /// Suppressed entirely; consumers neither print nor count these.
    Ignore,
}

impl Severity {
    /// True for severities that bump the error count.
    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal error",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Note => "note",
            Severity::Ignore => "ignored",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fatal_and_error_are_errors() {
        assert!(Severity::Fatal.is_error());
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
        assert!(!Severity::Info.is_error());
        assert!(!Severity::Note.is_error());
        assert!(!Severity::Ignore.is_error());
    }

    #[test]
    fn ordering_tracks_halting_significance() {
        assert!(Severity::Fatal < Severity::Error);
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Note < Severity::Ignore);
    }
}
