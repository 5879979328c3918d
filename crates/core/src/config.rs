//! Render configuration.
//!
//! Every knob has a serde default, so an empty file is a valid config.
//! Files are TOML or JSON, picked by extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Orientation, Point};
use crate::link::LinkProps;
use crate::node::NodeProps;
use crate::path::PathStrategy;
use crate::style::TreeStyles;
use crate::text::{NodeShape, TextLayout};
use crate::transition::Easing;
use crate::tree::{FlatLink, FlatNode};

/// Settings shared by every node and link of one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub orientation: Orientation,

    /// `diagonal`, `elbow` or `straight`.
    #[serde(default = "default_path_func")]
    pub path_func: String,

    /// Duration of enter, update and exit animations.
    #[serde(default = "default_transition_duration")]
    pub transition_duration_ms: i64,

    /// Deprecated: draws every node as a plain circle of this radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_radius: Option<f64>,

    #[serde(default)]
    pub node_svg_shape: NodeShape,

    #[serde(default)]
    pub text_layout: TextLayout,

    #[serde(default)]
    pub styles: TreeStyles,

    #[serde(default)]
    pub easing: Easing,

    #[serde(default)]
    pub canvas: CanvasConfig,
}

/// Size of the SVG document and offset of the diagram inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default)]
    pub translate: Point,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            translate: Point::origin(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            path_func: default_path_func(),
            transition_duration_ms: default_transition_duration(),
            circle_radius: None,
            node_svg_shape: NodeShape::default(),
            text_layout: TextLayout::default(),
            styles: TreeStyles::default(),
            easing: Easing::default(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Create a new render config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TomlParseFailed`] or a validation error.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| Error::toml_parse_failed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonParseFailed`] or a validation error.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| Error::json_parse_failed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or does not parse and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let read = || {
            std::fs::read_to_string(path)
                .map_err(|e| Error::read_failed(path.display().to_string(), e.to_string()))
        };

        match extension.as_str() {
            "toml" => Self::from_toml_str(&read()?),
            "json" => Self::from_json_str(&read()?),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.transition_duration_ms < 0 {
            return Err(Error::invalid_config(
                "transition_duration_ms",
                "must not be negative",
            ));
        }

        if let Some(r) = self.circle_radius {
            if r.is_nan() || r <= 0.0 {
                return Err(Error::invalid_config("circle_radius", "must be positive"));
            }
        }

        if PathStrategy::parse_tag(&self.path_func).is_none() {
            return Err(Error::invalid_config(
                "path_func",
                format!("unknown path function '{}'", self.path_func),
            ));
        }

        let CanvasConfig { width, height, .. } = self.canvas;
        if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
            return Err(Error::invalid_config("canvas", "width and height must be positive"));
        }

        Ok(())
    }

    /// Transition duration clamped to zero.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.transition_duration_ms).unwrap_or(0)
    }

    #[must_use]
    pub fn path_strategy(&self) -> PathStrategy {
        PathStrategy::from_tag(&self.path_func)
    }

    /// Node props for one flattened node.
    #[must_use]
    pub fn node_props(&self, node: &FlatNode, subscriptions: u64) -> NodeProps {
        NodeProps {
            node_data: node.data.clone(),
            node_svg_shape: self.node_svg_shape.clone(),
            circle_radius: self.circle_radius,
            orientation: self.orientation,
            transition_duration: self.duration_ms(),
            text_layout: self.text_layout.clone(),
            styles: self.styles.clone(),
            overlay_label: node.overlay_label.clone(),
            subscriptions,
        }
    }

    /// Link props for one flattened edge.
    #[must_use]
    pub fn link_props(&self, link: &FlatLink, path_func: &PathStrategy) -> LinkProps {
        LinkProps {
            link_data: link.descriptor.clone(),
            orientation: self.orientation,
            path_func: path_func.clone(),
            transition_duration: self.duration_ms(),
            styles: self.styles.links.clone(),
            edge: link.edge.clone(),
        }
    }
}

fn default_path_func() -> String {
    "diagonal".to_string()
}

fn default_transition_duration() -> i64 {
    500
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}
