//! paramtree binary
//!
//! Renders, diffs and copies parameter-store namespaces from a JSON
//! snapshot file. Diagnostics go to stderr via `tracing` (filtered by
//! `RUST_LOG`); command output goes to stdout.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod output;
mod snapshot;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command = cli::RootCommand::parse();
    match command.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
