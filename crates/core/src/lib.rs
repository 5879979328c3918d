//! Tree-diagram rendering core.
//!
//! This crate computes everything a tree diagram draws for its edges and
//! vertices, without owning a DOM or a layout engine. Key pieces:
//!
//! - **Paths**: diagonal, elbow, straight or caller-supplied link shapes
//! - **Transitions**: enter/update/exit animations per element, advanced
//!   explicitly by the host
//! - **Hover labels**: overlay placement halfway between a node and its parent
//! - **Text layout**: name and attribute runs anchored by node shape
//! - **Scene**: render-pass diffing and SVG output
//!
//! # Example
//!
//! ```ignore
//! use tree_diagram_core::{render_svg, Forest, RenderConfig, Scene};
//!
//! let forest = Forest::from_json_str(r#"{"name": "root", "x": 0, "y": 0}"#)?;
//! let config = RenderConfig::default();
//! let mut scene = Scene::with_config(&config);
//! scene.render_tree(&forest.flatten()?, &config);
//! scene.finish();
//! let svg = render_svg(&scene.fragments(), &config.canvas);
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod hover;
pub mod link;
pub mod node;
pub mod path;
pub mod scene;
pub mod style;
pub mod svg;
pub mod text;
pub mod transition;
pub mod tree;

// Re-export commonly used types
pub use config::{CanvasConfig, RenderConfig};
pub use error::{Error, Result};
pub use geometry::{Endpoint, LinkDescriptor, Orientation, Point};
pub use hover::{HoverLabelPositioner, HoverState, OverlayLabel};
pub use link::{EdgeOptions, Link, LinkFragment, LinkProps};
pub use node::{Node, NodeData, NodeFragment, NodeHandlers, NodeProps};
pub use path::{compute_path, PathStrategy};
pub use scene::{PassSummary, Scene, SceneFragments};
pub use style::{resolve_style, StyleMap, TreeStyles};
pub use svg::render_svg;
pub use text::{NodeShape, TextBlock, TextLayout, TextLayoutComposer};
pub use transition::{Easing, TransformScheduler, TransitionState};
pub use tree::{FlatTree, Forest, TreeNode};
