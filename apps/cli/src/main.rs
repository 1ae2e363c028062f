//! Billbook command line entry point.
//!
//! All logic lives in `billbook_cli`; this file just starts the runtime
//! and turns errors into an exit code.

use clap::Parser;
use std::process::ExitCode;

use billbook_cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
