//! Veld compiler CLI entry point.

use veldc::{parse_args, run, USAGE};

/// Initialize tracing for debug output.
///
/// Enable with `RUST_LOG=veld_lexer=trace` or similar; without `RUST_LOG`
/// the subscriber is never installed.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .init();
    }
}

fn main() {
    init_tracing();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    std::process::exit(run(&options));
}
