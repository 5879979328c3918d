//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tree-diagram - SVG snapshots of positioned trees
#[derive(Parser, Debug)]
#[command(name = "tree-diagram")]
#[command(version)]
#[command(about = "Render positioned trees as SVG diagrams")]
#[command(
    long_about = "tree-diagram reads a tree whose nodes already carry x/y coordinates, draws its links and nodes with the configured path function, shape and text layout, and writes the settled diagram as SVG."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a tree to SVG
    Render {
        /// Tree file (JSON)
        #[arg(short, long)]
        tree: PathBuf,

        /// Render config file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the orientation (horizontal, vertical)
        #[arg(long)]
        orientation: Option<String>,

        /// Override the path function (diagonal, elbow, straight)
        #[arg(long)]
        path_func: Option<String>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Validate a tree file and print a summary
    Check {
        /// Tree file (JSON)
        #[arg(short, long)]
        tree: PathBuf,

        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
