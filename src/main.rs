//! synthsub CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, resolve the
//! image selection, and submit one scheduler job. For programmatic use,
//! prefer the library API (`synthsub::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
