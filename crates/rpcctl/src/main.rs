#![warn(missing_docs)]

//! Entry point for the `rpcctl` binary.

use clap::Parser;
use rpcctl::cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli.run() {
        eprintln!("rpcctl: {}", err);
        std::process::exit(1);
    }
}
