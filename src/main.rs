use std::process::ExitCode;

use clap::Parser;
use glotpot::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose());

    match glotpot::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}

/// Diagnostics go to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "glotpot=debug" } else { "glotpot=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
