#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # tree-diagram
//!
//! Link paths, node transitions, hover labels and text layout for tree
//! diagrams, plus the command-line front end.
//!
//! This library re-exports the core crate for convenience.

pub use tree_diagram_core;

pub mod cli;
pub mod commands;
