//! Positioned tree input and flattening.
//!
//! A host hands the diagram a tree whose nodes already carry layout
//! coordinates. [`Forest::flatten`] turns it into the per-node and per-edge
//! records a render pass consumes, wiring parent back-references for
//! midpoints and enter/exit anchors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Endpoint, LinkDescriptor};
use crate::hover::OverlayLabel;
use crate::link::EdgeOptions;
use crate::node::{NodeData, ParentRef};
use crate::text::Attributes;

/// One vertex of the input tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Stable identity; derived from the node's path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub attributes: Attributes,
    /// Hides the children while keeping the node marked expandable.
    #[serde(default)]
    pub collapsed: bool,
    /// Options of the edge from this node's parent to this node.
    #[serde(default)]
    pub parent_edge: EdgeOptions,
    /// Label shown while the node is hovered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_label: Option<OverlayLabel>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            x,
            y,
            attributes: Attributes::new(),
            collapsed: false,
            parent_edge: EdgeOptions::default(),
            overlay_label: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// One or more root trees. Deserializes from a single object or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Forest {
    Single(Box<TreeNode>),
    Many(Vec<TreeNode>),
}

/// A node record produced by flattening.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    pub data: NodeData,
    pub overlay_label: Option<OverlayLabel>,
}

/// An edge record produced by flattening.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatLink {
    pub id: String,
    pub descriptor: LinkDescriptor,
    pub edge: EdgeOptions,
}

/// Flattened render-pass input, in pre-order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatTree {
    pub nodes: Vec<FlatNode>,
    pub links: Vec<FlatLink>,
}

/// Identity of the edge from `source` to `target`.
#[must_use]
pub fn link_id(source: &str, target: &str) -> String {
    format!("{source}->{target}")
}

impl Forest {
    /// Parses a forest from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonParseFailed`] when the input is not a tree.
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| Error::json_parse_failed(e.to_string()))
    }

    #[must_use]
    pub fn roots(&self) -> &[TreeNode] {
        match self {
            Self::Single(root) => std::slice::from_ref(root.as_ref()),
            Self::Many(roots) => roots,
        }
    }

    /// Flattens the visible part of the forest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] when there are no roots and
    /// [`Error::DuplicateNodeId`] when two visible nodes share an id.
    pub fn flatten(&self) -> Result<FlatTree> {
        let roots = self.roots();
        if roots.is_empty() {
            return Err(Error::EmptyTree);
        }

        let mut flattener = Flattener::default();
        for (index, root) in roots.iter().enumerate() {
            flattener.visit(root, index.to_string(), None)?;
        }
        debug!(
            nodes = flattener.out.nodes.len(),
            links = flattener.out.links.len(),
            "flattened tree"
        );
        Ok(flattener.out)
    }
}

#[derive(Default)]
struct Flattener {
    seen: HashSet<String>,
    out: FlatTree,
}

struct Visited<'a> {
    id: &'a str,
    endpoint: &'a Endpoint,
}

impl Flattener {
    fn visit(&mut self, node: &TreeNode, path: String, parent: Option<Visited<'_>>) -> Result<()> {
        let id = node.id.clone().unwrap_or(path);
        if !self.seen.insert(id.clone()) {
            return Err(Error::DuplicateNodeId(id));
        }

        let mut endpoint = Endpoint::new(node.x, node.y);
        if let Some(parent) = &parent {
            endpoint = endpoint.with_parent(parent.endpoint.clone());
        }

        self.out.nodes.push(FlatNode {
            data: NodeData {
                id: id.clone(),
                name: node.name.clone(),
                x: node.x,
                y: node.y,
                attributes: node.attributes.clone(),
                // Children of a collapsed node are never emitted, so an
                // emitted parent is always expanded.
                parent: parent.as_ref().map(|p| {
                    let at = p.endpoint.point();
                    ParentRef {
                        x: at.x,
                        y: at.y,
                        collapsed: false,
                    }
                }),
                has_children: !node.children.is_empty(),
            },
            overlay_label: node.overlay_label.clone(),
        });

        if let Some(parent) = &parent {
            self.out.links.push(FlatLink {
                id: link_id(parent.id, &id),
                descriptor: LinkDescriptor::new(parent.endpoint.clone(), endpoint.clone()),
                edge: node.parent_edge.clone(),
            });
        }

        if node.collapsed {
            return Ok(());
        }
        for (index, child) in node.children.iter().enumerate() {
            let visited = Visited {
                id: &id,
                endpoint: &endpoint,
            };
            self.visit(child, format!("{id}.{index}"), Some(visited))?;
        }
        Ok(())
    }
}
