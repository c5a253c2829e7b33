//! Diagnostic consumers.
//!
//! The engine hands every finished diagnostic to exactly one consumer.
//! The default behavior tallies severities (`Fatal`/`Error` bump the error
//! count, `Warning` bumps the warning count, everything else neither);
//! consumers that never want to influence compilation-wide totals opt out
//! via `include_in_counts`.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::engine::Diagnostic;
use crate::severity::Severity;

pub trait DiagnosticConsumer {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic);

    /// Whether this consumer's tallies should count toward compilation
    /// totals.
    fn include_in_counts(&self) -> bool {
        true
    }

    fn num_errors(&self) -> u32;

    fn num_warnings(&self) -> u32;
}

fn tally(errors: &mut u32, warnings: &mut u32, severity: Severity) {
    if severity.is_error() {
        *errors += 1;
    } else if severity == Severity::Warning {
        *warnings += 1;
    }
}

/// Counts severities and discards the rest. The default consumer.
#[derive(Default)]
pub struct CountingConsumer {
    errors: u32,
    warnings: u32,
}

impl CountingConsumer {
    pub fn new() -> Self {
        CountingConsumer::default()
    }
}

impl DiagnosticConsumer for CountingConsumer {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic) {
        tally(&mut self.errors, &mut self.warnings, diagnostic.severity);
    }

    fn num_errors(&self) -> u32 {
        self.errors
    }

    fn num_warnings(&self) -> u32 {
        self.warnings
    }
}

/// Discards everything and opts out of counting.
#[derive(Default)]
pub struct IgnoringConsumer;

impl DiagnosticConsumer for IgnoringConsumer {
    fn handle_diagnostic(&mut self, _diagnostic: &Diagnostic) {}

    fn include_in_counts(&self) -> bool {
        false
    }

    fn num_errors(&self) -> u32 {
        0
    }

    fn num_warnings(&self) -> u32 {
        0
    }
}

/// Records every diagnostic for later inspection. Test helper.
///
/// Clones share the same backing store, so a handle kept outside the
/// engine observes everything the engine-owned clone receives.
#[derive(Clone, Default)]
pub struct CapturingConsumer {
    diagnostics: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CapturingConsumer {
    pub fn new() -> Self {
        CapturingConsumer::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl DiagnosticConsumer for CapturingConsumer {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic.clone());
    }

    fn num_errors(&self) -> u32 {
        u32::try_from(
            self.diagnostics
                .borrow()
                .iter()
                .filter(|d| d.severity.is_error())
                .count(),
        )
        .unwrap_or(u32::MAX)
    }

    fn num_warnings(&self) -> u32 {
        u32::try_from(
            self.diagnostics
                .borrow()
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .count(),
        )
        .unwrap_or(u32::MAX)
    }
}

/// ANSI color codes for terminal output.
mod colors {
    pub const FATAL: &str = "\x1b[1;31m"; // Bold red
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Human-readable output with optional ANSI colors, plus counting.
pub struct TerminalConsumer<W: Write> {
    writer: W,
    use_colors: bool,
    /// Display name prepended to locations, usually the file being lexed.
    source_name: String,
    errors: u32,
    warnings: u32,
}

impl TerminalConsumer<io::Stderr> {
    pub fn stderr(source_name: impl Into<String>, use_colors: bool) -> Self {
        TerminalConsumer::new(io::stderr(), source_name, use_colors)
    }
}

impl<W: Write> TerminalConsumer<W> {
    pub fn new(writer: W, source_name: impl Into<String>, use_colors: bool) -> Self {
        TerminalConsumer {
            writer,
            use_colors,
            source_name: source_name.into(),
            errors: 0,
            warnings: 0,
        }
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Fatal => colors::FATAL,
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Info | Severity::Note | Severity::Ignore => colors::NOTE,
        }
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        if self.use_colors {
            write!(
                self.writer,
                "{}{}{}: {}{}{}",
                Self::severity_color(diagnostic.severity),
                diagnostic.severity,
                colors::RESET,
                colors::BOLD,
                diagnostic.message,
                colors::RESET
            )?;
        } else {
            write!(self.writer, "{}: {}", diagnostic.severity, diagnostic.message)?;
        }
        writeln!(self.writer)?;
        if let Some(location) = diagnostic.location {
            writeln!(
                self.writer,
                "  --> {}:{}",
                self.source_name, location.range.begin
            )?;
        }
        Ok(())
    }
}

impl<W: Write> DiagnosticConsumer for TerminalConsumer<W> {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic) {
        if diagnostic.severity == Severity::Ignore {
            return;
        }
        tally(&mut self.errors, &mut self.warnings, diagnostic.severity);
        // Output failure must not break compilation.
        let _ = self.write_diagnostic(diagnostic);
    }

    fn num_errors(&self) -> u32 {
        self.errors
    }

    fn num_warnings(&self) -> u32 {
        self.warnings
    }
}
