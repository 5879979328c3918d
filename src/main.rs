//! # tree-diagram
//!
//! Command-line entry point. Reads a positioned tree, renders it through
//! the core scene and writes the settled diagram as SVG.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`),
//! so SVG written to stdout stays clean.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tree_diagram::cli::Cli;
use tree_diagram::commands::execute_command;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    execute_command(cli.command)
}

/// Initialize tracing with `RUST_LOG` support.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
