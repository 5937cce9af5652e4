#![deny(missing_docs)]

//! # Oats CLI
//!
//! Command Line Interface for the OpenAPI to TypeScript generator.
//!
//! `oats [INPUT] [options]` turns one or many OpenAPI 3.x documents into `types.ts`
//! modules, optionally with per-tag API catalog files.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod fetch;
mod generate;
mod input;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI 3.x to TypeScript type generator")]
struct Cli {
    #[clap(flatten)]
    generate: generate::GenerateArgs,

    /// Log progress to stderr.
    #[clap(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(module) = generate::execute(&cli.generate)? {
        print!("{}", module);
    }

    Ok(())
}
