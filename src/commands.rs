//! CLI command handlers.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use tree_diagram_core::{FlatTree, Forest, Orientation, RenderConfig, Scene, render_svg};

use crate::cli::Commands;

/// Execute a CLI command.
///
/// # Errors
///
/// Returns an error if input files cannot be read or parsed, or the
/// output cannot be written.
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            tree,
            config,
            orientation,
            path_func,
            out,
        } => {
            let config = resolve_config(config.as_deref(), orientation, path_func)?;
            let svg = cmd_render(&tree, &config)?;
            match out {
                Some(path) => {
                    fs::write(&path, svg)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(out = %path.display(), "wrote diagram");
                }
                None => println!("{svg}"),
            }
            Ok(())
        }

        Commands::Check { tree, json } => {
            let summary = cmd_check(&tree)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} nodes, {} links", summary.nodes, summary.links);
            }
            Ok(())
        }
    }
}

/// Node and link counts of a tree file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub nodes: usize,
    pub links: usize,
}

/// Loads the config file, if any, and applies flag overrides.
///
/// # Errors
///
/// Returns an error if the file fails to load or the result is invalid.
pub fn resolve_config(
    path: Option<&Path>,
    orientation: Option<String>,
    path_func: Option<String>,
) -> Result<RenderConfig> {
    let mut config = match path {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    if let Some(orientation) = orientation {
        config.orientation = orientation.parse::<Orientation>()?;
    }
    if let Some(path_func) = path_func {
        config.path_func = path_func;
    }
    config.validate()?;
    debug!(?config, "resolved render config");
    Ok(config)
}

fn load_tree(path: &Path) -> Result<FlatTree> {
    let input =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let forest = Forest::from_json_str(&input)
        .with_context(|| format!("Failed to parse tree {}", path.display()))?;
    Ok(forest.flatten()?)
}

/// Renders the settled diagram for a tree file.
///
/// # Errors
///
/// Returns an error if the tree cannot be read, parsed or flattened.
pub fn cmd_render(tree: &Path, config: &RenderConfig) -> Result<String> {
    let flat = load_tree(tree)?;
    let mut scene = Scene::with_config(config);
    let summary = scene.render_tree(&flat, config);
    info!(entered = summary.entered, "rendering diagram");
    scene.finish();
    Ok(render_svg(&scene.fragments(), &config.canvas))
}

/// Validates a tree file.
///
/// # Errors
///
/// Returns an error if the tree cannot be read, parsed or flattened.
pub fn cmd_check(tree: &Path) -> Result<TreeSummary> {
    let flat = load_tree(tree)?;
    Ok(TreeSummary {
        nodes: flat.nodes.len(),
        links: flat.links.len(),
    })
}
