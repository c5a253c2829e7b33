//! Diagnostic engine and error reporting for the Veld compiler.
//!
//! Reporting follows a scoped-builder pattern: `DiagnosticEngine::report`
//! opens exactly one in-flight diagnostic and returns a builder that
//! accumulates positional arguments; dropping the builder formats the
//! message template and hands the finished diagnostic to the configured
//! consumer. Severity is the only pipeline-control signal: drivers treat
//! any `Fatal` diagnostic as a hard stop, and nothing in the compiler
//! throws for malformed input.

mod catalog;
mod consumer;
mod engine;
mod format;
mod severity;

pub use catalog::{Component, DiagId};
pub use consumer::{
    CapturingConsumer, CountingConsumer, DiagnosticConsumer, IgnoringConsumer, TerminalConsumer,
};
pub use engine::{Diagnostic, DiagnosticBuilder, DiagnosticEngine, DiagnosticOptions};
pub use format::{format_message, DiagArg, MAX_ARGUMENTS};
pub use severity::Severity;
