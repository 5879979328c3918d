//! Layered style resolution.
//!
//! Styles are ordered maps of CSS property to value. Layers are merged
//! lowest precedence first: base < caller override < per-edge override.
//! A later layer replaces a property in place, so the output keeps the
//! order in which properties were first declared.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// CSS property → value.
pub type StyleMap = IndexMap<String, String>;

/// Builds a style map from `(property, value)` pairs.
pub fn style<I, K, V>(pairs: I) -> StyleMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Merges `layers` from lowest to highest precedence.
#[must_use]
pub fn resolve_style(layers: &[&StyleMap]) -> StyleMap {
    let mut resolved = StyleMap::new();
    for layer in layers {
        for (property, value) in *layer {
            resolved.insert(property.clone(), value.clone());
        }
    }
    resolved
}

/// Serializes a style map as an inline `style` attribute value.
#[must_use]
pub fn to_inline_css(style: &StyleMap) -> String {
    style
        .iter()
        .map(|(property, value)| format!("{property}:{value}"))
        .join(";")
}

/// Styles for one kind of node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStyles {
    pub circle: StyleMap,
    pub name: StyleMap,
    pub attributes: StyleMap,
}

/// Caller style overrides for a whole diagram.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeStyles {
    pub links: StyleMap,
    pub nodes: NodeStyles,
    pub leaf_nodes: NodeStyles,
}

impl TreeStyles {
    /// Node styles for a node with or without (expandable) children.
    #[must_use]
    pub const fn for_node(&self, has_children: bool) -> &NodeStyles {
        if has_children { &self.nodes } else { &self.leaf_nodes }
    }
}
