//! The diagnostic engine and its scoped builder.

use smallvec::SmallVec;

use veld_basic::{SourceLocation, TokenKind};

use crate::catalog::DiagId;
use crate::consumer::DiagnosticConsumer;
use crate::format::{format_message, DiagArg, MAX_ARGUMENTS};
use crate::severity::Severity;

/// A finished diagnostic, ready for a consumer.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub id: DiagId,
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
}

/// Severity-mapping knobs applied at emission time.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiagnosticOptions {
    pub warnings_as_errors: bool,
    pub errors_as_fatal: bool,
    pub suppress_warnings: bool,
}

struct InFlight {
    id: DiagId,
    location: Option<SourceLocation>,
    args: SmallVec<[DiagArg; 4]>,
}

/// Accumulates one in-flight diagnostic at a time and dispatches finished
/// diagnostics to the configured consumer.
pub struct DiagnosticEngine {
    consumer: Box<dyn DiagnosticConsumer>,
    options: DiagnosticOptions,
    in_flight: Option<InFlight>,
    fatal_occurred: bool,
}

impl DiagnosticEngine {
    pub fn new(consumer: Box<dyn DiagnosticConsumer>) -> Self {
        DiagnosticEngine::with_options(consumer, DiagnosticOptions::default())
    }

    pub fn with_options(consumer: Box<dyn DiagnosticConsumer>, options: DiagnosticOptions) -> Self {
        DiagnosticEngine {
            consumer,
            options,
            in_flight: None,
            fatal_occurred: false,
        }
    }

    /// Open a diagnostic. The returned builder emits when dropped.
    ///
    /// At most one diagnostic may be in flight; calling `report` while a
    /// prior builder is alive and un-emitted is a programming error.
    pub fn report(&mut self, location: Option<SourceLocation>, id: DiagId) -> DiagnosticBuilder<'_> {
        debug_assert!(
            self.in_flight.is_none(),
            "report() called while a diagnostic is already in flight"
        );
        self.in_flight = Some(InFlight {
            id,
            location,
            args: SmallVec::new(),
        });
        DiagnosticBuilder {
            engine: self,
            active: true,
        }
    }

    /// Severity after the engine options are applied.
    fn effective_severity(&self, id: DiagId) -> Severity {
        let severity = id.severity();
        match severity {
            Severity::Warning if self.options.suppress_warnings => Severity::Ignore,
            Severity::Warning if self.options.warnings_as_errors => Severity::Error,
            Severity::Error if self.options.errors_as_fatal => Severity::Fatal,
            _ => severity,
        }
    }

    /// Format and dispatch the in-flight diagnostic.
    ///
    /// Returns false only when nothing was in flight (inert builder).
    fn emit_in_flight(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        let severity = self.effective_severity(in_flight.id);
        if severity == Severity::Fatal {
            self.fatal_occurred = true;
        }
        let message = format_message(in_flight.id.template(), &in_flight.args);
        let diagnostic = Diagnostic {
            id: in_flight.id,
            severity,
            message,
            location: in_flight.location,
        };
        self.consumer.handle_diagnostic(&diagnostic);
        true
    }

    fn push_arg(&mut self, arg: DiagArg) {
        if let Some(in_flight) = self.in_flight.as_mut() {
            debug_assert!(
                in_flight.args.len() < MAX_ARGUMENTS,
                "too many diagnostic arguments"
            );
            in_flight.args.push(arg);
        } else {
            debug_assert!(false, "argument pushed with no diagnostic in flight");
        }
    }

    pub fn options(&self) -> DiagnosticOptions {
        self.options
    }

    /// True once any Fatal diagnostic has been emitted. Drivers treat this
    /// as the hard-stop signal.
    pub fn fatal_occurred(&self) -> bool {
        self.fatal_occurred
    }

    pub fn num_errors(&self) -> u32 {
        self.consumer.num_errors()
    }

    pub fn num_warnings(&self) -> u32 {
        self.consumer.num_warnings()
    }

    pub fn has_errors(&self) -> bool {
        self.num_errors() > 0
    }

    pub fn consumer(&self) -> &dyn DiagnosticConsumer {
        self.consumer.as_ref()
    }
}

/// Scoped accumulator for one diagnostic's arguments.
///
/// Emission happens exactly once: either explicitly through [`emit`] or
/// implicitly when the builder drops, on every exit path.
///
/// [`emit`]: DiagnosticBuilder::emit
pub struct DiagnosticBuilder<'a> {
    engine: &'a mut DiagnosticEngine,
    active: bool,
}

impl DiagnosticBuilder<'_> {
    #[must_use]
    pub fn with_str(self, text: impl Into<String>) -> Self {
        self.engine.push_arg(DiagArg::Str(text.into()));
        self
    }

    #[must_use]
    pub fn with_char(self, ch: char) -> Self {
        self.engine.push_arg(DiagArg::Str(ch.to_string()));
        self
    }

    #[must_use]
    pub fn with_int(self, value: i64) -> Self {
        self.engine.push_arg(DiagArg::Int(value));
        self
    }

    #[must_use]
    pub fn with_uint(self, value: u64) -> Self {
        self.engine.push_arg(DiagArg::Uint(value));
        self
    }

    #[must_use]
    pub fn with_token(self, kind: TokenKind) -> Self {
        self.engine.push_arg(DiagArg::Token(kind));
        self
    }

    /// Emit now instead of at scope exit.
    ///
    /// Returns false when the builder was already inert.
    pub fn emit(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.engine.emit_in_flight()
    }
}

impl Drop for DiagnosticBuilder<'_> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            let _ = self.engine.emit_in_flight();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::CapturingConsumer;
    use pretty_assertions::assert_eq;

    fn capturing_engine() -> (DiagnosticEngine, CapturingConsumer) {
        let consumer = CapturingConsumer::new();
        let handle = consumer.clone();
        (DiagnosticEngine::new(Box::new(consumer)), handle)
    }

    // === Builder lifecycle ===

    #[test]
    fn builder_emits_on_drop() {
        let (mut engine, captured) = capturing_engine();
        {
            let _builder = engine.report(None, DiagId::BadHexDigit).with_char('p');
        }
        let diags = captured.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "An invalid hexadecimal digit 'p' was encountered while lexing the source code shown above."
        );
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn explicit_emit_returns_true_then_false() {
        let (mut engine, captured) = capturing_engine();
        let mut builder = engine.report(None, DiagId::BadHexDigit).with_char('q');
        assert!(builder.emit());
        assert!(!builder.emit());
        drop(builder);
        assert_eq!(captured.diagnostics().len(), 1);
    }

    #[test]
    fn sequential_reports_are_fine() {
        let (mut engine, captured) = capturing_engine();
        engine.report(None, DiagId::BadHexDigit).with_char('a').emit();
        engine.report(None, DiagId::BadHexDigit).with_char('b').emit();
        assert_eq!(captured.diagnostics().len(), 2);
        assert_eq!(engine.num_warnings(), 2);
    }

    // === Severity mapping ===

    #[test]
    fn warnings_as_errors_promotes() {
        let consumer = CapturingConsumer::new();
        let captured = consumer.clone();
        let mut engine = DiagnosticEngine::with_options(
            Box::new(consumer),
            DiagnosticOptions {
                warnings_as_errors: true,
                ..DiagnosticOptions::default()
            },
        );
        engine.report(None, DiagId::BadHexDigit).with_char('z').emit();
        assert_eq!(captured.diagnostics()[0].severity, Severity::Error);
        assert_eq!(engine.num_errors(), 1);
        assert_eq!(engine.num_warnings(), 0);
    }

    #[test]
    fn suppressed_warnings_are_ignored() {
        let consumer = CapturingConsumer::new();
        let captured = consumer.clone();
        let mut engine = DiagnosticEngine::with_options(
            Box::new(consumer),
            DiagnosticOptions {
                suppress_warnings: true,
                ..DiagnosticOptions::default()
            },
        );
        engine.report(None, DiagId::BadHexDigit).with_char('z').emit();
        assert_eq!(captured.diagnostics()[0].severity, Severity::Ignore);
        assert_eq!(engine.num_warnings(), 0);
        assert!(!engine.has_errors());
    }

    #[test]
    fn fatal_sets_hard_stop_flag() {
        let (mut engine, _captured) = capturing_engine();
        assert!(!engine.fatal_occurred());
        engine
            .report(None, DiagId::UnterminatedString)
            .with_uint(0)
            .emit();
        assert!(engine.fatal_occurred());
        assert!(engine.has_errors());
    }

    // === Formatting through the engine ===

    #[test]
    fn select_and_plural_arguments() {
        let (mut engine, captured) = capturing_engine();
        engine
            .report(None, DiagId::UnterminatedString)
            .with_uint(1)
            .emit();
        engine.report(None, DiagId::TooManyErrors).with_uint(3).emit();

        let diags = captured.diagnostics();
        assert_eq!(
            diags[0].message,
            "A string literal was still open when the end of the line was reached."
        );
        assert_eq!(diags[1].message, "3 errors emitted; giving up.");
    }

    #[test]
    fn token_kind_arguments() {
        let (mut engine, captured) = capturing_engine();
        engine
            .report(None, DiagId::ExpectedToken)
            .with_token(veld_basic::TokenKind::Semi)
            .with_token(veld_basic::TokenKind::Eof)
            .emit();
        assert_eq!(
            captured.diagnostics()[0].message,
            "Expected ';' but found <eof>."
        );
    }
}
