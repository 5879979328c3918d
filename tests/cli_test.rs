//! Integration tests for the command-line front end.
//!
//! These tests verify that:
//! - A tree file renders to a settled SVG document
//! - Flag overrides win over config file values
//! - Invalid input fails with a readable error

#![forbid(clippy::unwrap_used)]
#![forbid(clippy::expect_used)]
#![forbid(clippy::panic)]

use std::fs;
use std::process::Command;

use tempfile::TempDir;
use tree_diagram::commands::{cmd_check, cmd_render, resolve_config, TreeSummary};
use tree_diagram::tree_diagram_core::Orientation;

const TREE: &str = r#"{
    "name": "CEO", "x": 0, "y": 0,
    "children": [
        {"name": "CTO", "x": -40, "y": 100, "attributes": {"team": "platform"}},
        {"name": "CFO", "x": 40, "y": 100, "parent_edge": {"dashed": true}}
    ]
}"#;

fn write_tree(dir: &TempDir, body: &str) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join("tree.json");
    fs::write(&path, body)?;
    Ok(path)
}

/// # GIVEN
/// A three-node tree and the default config
///
/// # WHEN
/// The tree is rendered
///
/// # THEN
/// Every node is fully visible at its own position
#[test]
fn test_render_settles_diagram() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let tree = write_tree(&dir, TREE)?;
    let config = resolve_config(None, None, None)?;

    let svg = cmd_render(&tree, &config)?;

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"transform="translate(-40,100)" style="opacity:1""#));
    assert!(svg.contains(r#"stroke-dasharray="5,5""#));
    assert!(svg.contains("team: platform"));
    Ok(())
}

/// # GIVEN
/// A config with a transition lasting decades
///
/// # WHEN
/// The tree is rendered
///
/// # THEN
/// Rendering returns the end state without ticking through it
#[test]
fn test_render_long_transition_returns() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("render.toml");
    fs::write(&config_path, "transition_duration_ms = 1000000000000\n")?;
    let config = resolve_config(Some(&config_path), None, None)?;
    let tree = write_tree(&dir, TREE)?;

    let svg = cmd_render(&tree, &config)?;
    assert!(svg.contains(r#"transform="translate(40,100)" style="opacity:1""#));
    Ok(())
}

/// # GIVEN
/// A TOML config asking for a vertical elbow layout
///
/// # WHEN
/// Flags override orientation and path function
///
/// # THEN
/// The flags win
#[test]
fn test_flags_override_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("render.toml");
    fs::write(&config_path, "orientation = \"vertical\"\npath_func = \"elbow\"\n")?;

    let config = resolve_config(
        Some(&config_path),
        Some("horizontal".to_string()),
        Some("straight".to_string()),
    )?;
    assert_eq!(config.orientation, Orientation::Horizontal);
    assert_eq!(config.path_func, "straight");

    let tree = write_tree(&dir, TREE)?;
    let svg = cmd_render(&tree, &config)?;
    assert!(svg.contains(r#"d="M0,0L100,-40""#));
    Ok(())
}

/// # GIVEN
/// An unknown orientation flag
///
/// # THEN
/// Config resolution fails
#[test]
fn test_bad_orientation_flag() {
    let result = resolve_config(None, Some("sideways".to_string()), None);
    assert!(result.is_err());
}

/// # GIVEN
/// A tree with a duplicated id
///
/// # THEN
/// Check fails and names the id
#[test]
fn test_check_rejects_duplicate_ids() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let tree = write_tree(
        &dir,
        r#"{"id": "a", "name": "a", "x": 0, "y": 0,
            "children": [{"id": "a", "name": "b", "x": 0, "y": 1}]}"#,
    )?;

    let message = match cmd_check(&tree) {
        Ok(summary) => format!("unexpected success: {summary:?}"),
        Err(err) => format!("{err:#}"),
    };
    assert!(message.contains("duplicate node id 'a'"), "{message}");
    Ok(())
}

#[test]
fn test_check_counts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let tree = write_tree(&dir, TREE)?;
    assert_eq!(cmd_check(&tree)?, TreeSummary { nodes: 3, links: 2 });
    Ok(())
}

/// # GIVEN
/// The built binary
///
/// # WHEN
/// `render --out` is run
///
/// # THEN
/// The SVG lands in the output file and the process succeeds
#[test]
fn test_binary_writes_output_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let tree = write_tree(&dir, TREE)?;
    let out = dir.path().join("tree.svg");

    let status = Command::new(env!("CARGO_BIN_EXE_tree-diagram"))
        .arg("render")
        .arg("--tree")
        .arg(&tree)
        .arg("--out")
        .arg(&out)
        .env("RUST_LOG", "warn")
        .status()?;

    assert!(status.success());
    assert!(fs::read_to_string(&out)?.ends_with("</g></svg>"));
    Ok(())
}
