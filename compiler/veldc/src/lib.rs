//! The Veld compiler driver.
//!
//! Front-end only for now: lexes each input file and prints the token
//! stream. All failures, including unreadable inputs, flow through the
//! diagnostic engine; the first Fatal diagnostic stops the pipeline and
//! the exit code reflects the error count.

use std::path::Path;

use tracing::debug;

use veld_basic::{FileSource, Source, SourceManager, Token, TokenKind, TokenValue};
use veld_diagnostic::{DiagId, DiagnosticEngine, DiagnosticOptions, TerminalConsumer};
use veld_lexer::Lexer;

/// Parsed command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub inputs: Vec<String>,
    pub warnings_as_errors: bool,
    pub suppress_warnings: bool,
    pub color: bool,
    /// Print the token stream (default; `--quiet` disables).
    pub print_tokens: bool,
}

/// Errors from command-line parsing, reported before any engine exists.
#[derive(Debug, PartialEq, Eq)]
pub enum UsageError {
    UnknownFlag(String),
    NoInputs,
}

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageError::UnknownFlag(flag) => write!(f, "unknown flag '{flag}'"),
            UsageError::NoInputs => write!(f, "no input files"),
        }
    }
}

pub const USAGE: &str = "usage: veld [--werror] [--no-warnings] [--no-color] [--quiet] <file>...";

/// Parse arguments (without the program name).
pub fn parse_args<I, S>(args: I) -> Result<Options, UsageError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = Options {
        color: true,
        print_tokens: true,
        ..Options::default()
    };
    for arg in args {
        let arg = arg.as_ref();
        match arg {
            "--werror" => options.warnings_as_errors = true,
            "--no-warnings" => options.suppress_warnings = true,
            "--no-color" => options.color = false,
            "--quiet" => options.print_tokens = false,
            flag if flag.starts_with('-') => {
                return Err(UsageError::UnknownFlag(flag.to_string()));
            }
            input => options.inputs.push(input.to_string()),
        }
    }
    if options.inputs.is_empty() {
        return Err(UsageError::NoInputs);
    }
    Ok(options)
}

fn render_token(token: &Token) -> String {
    let location = token.location();
    let head = format!("{} @ {}", token.kind().name(), location.range);
    match token.value() {
        TokenValue::None => head,
        TokenValue::Str(s) => format!("{head} {s:?}"),
        TokenValue::Int(i) => format!("{head} {i}"),
        TokenValue::Real(r) => format!("{head} {r}"),
        TokenValue::Rune(c) => format!("{head} {c:?}"),
    }
}

/// Lex every token of one source, stopping after `eof` or the first Fatal
/// diagnostic.
fn lex_source(
    source: &mut dyn Source,
    source_manager: &mut SourceManager,
    engine: &mut DiagnosticEngine,
    print_tokens: bool,
) {
    let mut lexer = Lexer::new(source, source_manager, engine);
    loop {
        let token = lexer.lex();
        if print_tokens {
            println!("{}", render_token(&token));
        }
        if token.is(TokenKind::Eof) {
            break;
        }
        if lexer.fatal_occurred() {
            break;
        }
    }
}

/// Run the driver; returns the process exit code.
pub fn run(options: &Options) -> i32 {
    let engine_options = DiagnosticOptions {
        warnings_as_errors: options.warnings_as_errors,
        suppress_warnings: options.suppress_warnings,
        ..DiagnosticOptions::default()
    };

    let mut source_manager = SourceManager::new();
    let mut had_errors = false;

    for input in &options.inputs {
        debug!(input, "compiling");
        let consumer = TerminalConsumer::stderr(input.clone(), options.color);
        let mut engine = DiagnosticEngine::with_options(Box::new(consumer), engine_options);

        match FileSource::open(Path::new(input)) {
            Ok(mut source) => {
                lex_source(&mut source, &mut source_manager, &mut engine, options.print_tokens);
            }
            Err(error) => {
                // Verbatim pass-through of the OS error text.
                engine
                    .report(None, DiagId::CannotOpenFile)
                    .with_str(error.to_string())
                    .emit();
            }
        }

        let errors = engine.num_errors();
        let warnings = engine.num_warnings();
        if errors > 0 || warnings > 0 {
            eprintln!(
                "{input}: {errors} {}, {warnings} {}",
                if errors == 1 { "error" } else { "errors" },
                if warnings == 1 { "warning" } else { "warnings" },
            );
        }
        had_errors |= engine.has_errors();
        if engine.fatal_occurred() {
            had_errors = true;
            break;
        }
    }

    i32::from(had_errors)
}
