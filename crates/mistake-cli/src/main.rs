//! mistake CLI
//!
//! Companion tool for the mistake panic hook:
//!
//! - `mistake classify <PATH>...` explains whether files count as locally developed
//! - `mistake doctor` checks whether post-mortem debugging can work here
//! - `mistake demo` installs the hook and panics through a few local frames
//!
//! Set RUST_LOG=mistake_core=debug for verbose logging.

mod args;
mod commands;
mod router;

use clap::Parser;

pub use args::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("mistake_core=debug,mistake_cli=debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    router::route(cli)
}
