//! Node label layout.
//!
//! A node label is one primary run (the name) and one secondary run per
//! attribute, stacked below it. The primary run's anchor depends on the
//! node shape, decided by an ordered list of [`OffsetRule`]s.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{fmt_num, Point};
use crate::style::StyleMap;

/// Vertical gap between the name baseline and the attribute block.
pub const ATTRIBUTE_BLOCK_OFFSET: f64 = 10.0;

/// Line height of each attribute run, in `em`.
pub const ATTRIBUTE_LINE_HEIGHT_EM: f64 = 1.2;

/// Baseline shift that vertically centres the name on its anchor.
pub const PRIMARY_DY: &str = ".35em";

/// Class of the name text element.
pub const NAME_CLASS: &str = "nodeNameBase";

/// Class of the attribute text element.
pub const ATTRIBUTES_CLASS: &str = "nodeAttributesBase";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// SVG element used to draw a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Circle,
    Rect,
    Ellipse,
    /// No shape; only the label is drawn.
    None,
}

impl ShapeKind {
    /// SVG tag name, `None` for [`ShapeKind::None`].
    #[must_use]
    pub const fn tag(self) -> Option<&'static str> {
        match self {
            Self::Circle => Some("circle"),
            Self::Rect => Some("rect"),
            Self::Ellipse => Some("ellipse"),
            Self::None => None,
        }
    }
}

/// Geometry attributes of a node shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ry: Option<f64>,
    /// Extra presentation attributes (`fill`, `stroke`, ...).
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: StyleMap,
}

/// Shape drawn for every node, plus how its label is anchored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeShape {
    #[serde(default)]
    pub shape: ShapeKind,
    #[serde(default)]
    pub shape_props: ShapeProps,
    /// Centre the name inside a rectangle instead of beside the shape.
    #[serde(default)]
    pub center_rect_text: bool,
}

impl Default for NodeShape {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Circle,
            shape_props: ShapeProps {
                r: Some(10.0),
                ..ShapeProps::default()
            },
            center_rect_text: false,
        }
    }
}

impl NodeShape {
    /// A circle of radius `r`.
    #[must_use]
    pub fn circle(r: f64) -> Self {
        Self {
            shape: ShapeKind::Circle,
            shape_props: ShapeProps {
                r: Some(r),
                ..ShapeProps::default()
            },
            center_rect_text: false,
        }
    }

    /// A rectangle at offset (`x`, `y`) with the given size.
    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            shape: ShapeKind::Rect,
            shape_props: ShapeProps {
                x: Some(x),
                y: Some(y),
                width: Some(width),
                height: Some(height),
                ..ShapeProps::default()
            },
            center_rect_text: false,
        }
    }

    /// Sets the centred-text flag.
    #[must_use]
    pub const fn centered(mut self, center: bool) -> Self {
        self.center_rect_text = center;
        self
    }
}

/// Anchor and offsets for a node's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayout {
    pub text_anchor: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            text_anchor: "start".to_string(),
            x: 10.0,
            y: -10.0,
            transform: None,
        }
    }
}

/// Value shown next to an attribute key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&fmt_num(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Insertion-ordered attribute map.
pub type Attributes = IndexMap<String, AttributeValue>;

// ---------------------------------------------------------------------------
// Offset rules
// ---------------------------------------------------------------------------

/// How the primary run is offset from the text layout. Evaluated in
/// [`OFFSET_RULES`] order; the first rule that applies wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetRule {
    /// Text is centred inside a rectangle.
    CenteredRect,
    /// Text sits to the right of a circle, pushed out by `4r/5`.
    Radius,
    /// Text layout used as-is.
    Fallback,
}

/// Precedence of the offset rules. The centre flag outranks a radius.
pub const OFFSET_RULES: [OffsetRule; 3] = [
    OffsetRule::CenteredRect,
    OffsetRule::Radius,
    OffsetRule::Fallback,
];

/// A shape value counts only when present, non-zero and not NaN.
fn set(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

impl OffsetRule {
    /// Whether this rule applies to `shape`.
    #[must_use]
    pub fn applies(self, shape: &NodeShape) -> bool {
        match self {
            Self::CenteredRect => shape.center_rect_text,
            Self::Radius => set(shape.shape_props.r).is_some(),
            Self::Fallback => true,
        }
    }

    /// Anchor of the primary run under this rule.
    #[must_use]
    pub fn anchor(self, shape: &NodeShape, layout: &TextLayout) -> Point {
        let props = &shape.shape_props;
        match self {
            Self::CenteredRect => Point::new(
                set(props.x).map_or(layout.x, |x| x - x / 4.0),
                set(props.y).map_or(layout.y, |y| -y / 4.0),
            ),
            Self::Radius => Point::new(
                set(props.r).map_or(layout.x, |r| layout.x + 4.0 * r / 5.0),
                layout.y,
            ),
            Self::Fallback => Point::new(layout.x, layout.y),
        }
    }
}

/// First rule in [`OFFSET_RULES`] that applies to `shape`.
#[must_use]
pub fn select_rule(shape: &NodeShape) -> OffsetRule {
    OFFSET_RULES
        .into_iter()
        .find(|rule| rule.applies(shape))
        .unwrap_or(OffsetRule::Fallback)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One run of label text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    /// Absolute y; attribute runs stack by `dy` instead.
    pub y: Option<f64>,
    pub dy: String,
    /// Zero-based line number within its block.
    pub line_index: usize,
}

impl TextRun {
    /// Offset of this run below the block's y, in `em`.
    #[must_use]
    pub fn stack_offset_em(&self) -> f64 {
        ATTRIBUTE_LINE_HEIGHT_EM * (self.line_index + 1) as f64
    }
}

/// Laid-out label for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text_anchor: String,
    pub transform: Option<String>,
    pub primary: TextRun,
    /// y of the attribute text element.
    pub secondary_y: f64,
    pub secondary: Vec<TextRun>,
}

/// Computes label placement for nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayoutComposer;

impl TextLayoutComposer {
    #[must_use]
    pub fn layout(
        name: &str,
        attributes: &Attributes,
        shape: &NodeShape,
        text_layout: &TextLayout,
    ) -> TextBlock {
        let anchor = select_rule(shape).anchor(shape, text_layout);

        let secondary = attributes
            .iter()
            .enumerate()
            .map(|(line_index, (key, value))| TextRun {
                text: format!("{key}: {value}"),
                x: text_layout.x,
                y: None,
                dy: format!("{ATTRIBUTE_LINE_HEIGHT_EM}em"),
                line_index,
            })
            .collect();

        TextBlock {
            text_anchor: text_layout.text_anchor.clone(),
            transform: text_layout.transform.clone(),
            primary: TextRun {
                text: name.to_string(),
                x: anchor.x,
                y: Some(anchor.y),
                dy: PRIMARY_DY.to_string(),
                line_index: 0,
            },
            secondary_y: text_layout.y + ATTRIBUTE_BLOCK_OFFSET,
            secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TextLayout {
        TextLayout::default()
    }

    #[test]
    fn test_rule_radius() {
        let shape = NodeShape::circle(10.0);
        assert_eq!(select_rule(&shape), OffsetRule::Radius);
        let block = TextLayoutComposer::layout("n", &Attributes::new(), &shape, &layout());
        assert_eq!(block.primary.x, 18.0);
        assert_eq!(block.primary.y, Some(-10.0));
    }

    #[test]
    fn test_rule_centered_rect() {
        let shape = NodeShape::rect(-20.0, -8.0, 40.0, 16.0).centered(true);
        assert_eq!(select_rule(&shape), OffsetRule::CenteredRect);
        let block = TextLayoutComposer::layout("n", &Attributes::new(), &shape, &layout());
        assert_eq!(block.primary.x, -15.0);
        assert_eq!(block.primary.y, Some(2.0));
    }

    #[test]
    fn test_center_flag_outranks_radius() {
        let mut shape = NodeShape::circle(10.0).centered(true);
        shape.shape_props.x = Some(8.0);
        assert_eq!(select_rule(&shape), OffsetRule::CenteredRect);
        let block = TextLayoutComposer::layout("n", &Attributes::new(), &shape, &layout());
        assert_eq!(block.primary.x, 6.0);
        // No y on the shape: falls back to the layout's y.
        assert_eq!(block.primary.y, Some(-10.0));
    }

    #[test]
    fn test_centered_without_geometry_uses_layout() {
        let shape = NodeShape::circle(0.0).centered(true);
        let block = TextLayoutComposer::layout("n", &Attributes::new(), &shape, &layout());
        assert_eq!(block.primary.x, 10.0);
        assert_eq!(block.primary.y, Some(-10.0));
    }

    #[test]
    fn test_rule_fallback() {
        let shape = NodeShape::rect(0.0, 0.0, 40.0, 16.0);
        assert_eq!(select_rule(&shape), OffsetRule::Fallback);
        let block = TextLayoutComposer::layout("n", &Attributes::new(), &shape, &layout());
        assert_eq!(block.primary.x, 10.0);
        assert_eq!(block.primary.y, Some(-10.0));
    }

    #[test]
    fn test_zero_and_nan_radius_are_unset() {
        assert_eq!(select_rule(&NodeShape::circle(0.0)), OffsetRule::Fallback);
        assert_eq!(select_rule(&NodeShape::circle(f64::NAN)), OffsetRule::Fallback);
    }

    #[test]
    fn test_secondary_runs_in_insertion_order() {
        let mut attributes = Attributes::new();
        attributes.insert("a".to_string(), 1.into());
        attributes.insert("b".to_string(), 2.into());

        let block =
            TextLayoutComposer::layout("root", &attributes, &NodeShape::default(), &layout());
        let texts: Vec<_> = block.secondary.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["a: 1", "b: 2"]);
        assert_eq!(block.secondary[0].line_index, 0);
        assert_eq!(block.secondary[1].line_index, 1);
        assert!(block.secondary[1].stack_offset_em() > block.secondary[0].stack_offset_em());
        assert!(block.secondary.iter().all(|r| r.x == 10.0 && r.dy == "1.2em"));
        assert_eq!(block.secondary_y, 0.0);
    }

    #[test]
    fn test_primary_run_metadata() {
        let text_layout = TextLayout {
            text_anchor: "end".to_string(),
            transform: Some("rotate(90)".to_string()),
            ..TextLayout::default()
        };
        let block = TextLayoutComposer::layout(
            "root",
            &Attributes::new(),
            &NodeShape::default(),
            &text_layout,
        );
        assert_eq!(block.primary.text, "root");
        assert_eq!(block.primary.dy, ".35em");
        assert_eq!(block.text_anchor, "end");
        assert_eq!(block.transform.as_deref(), Some("rotate(90)"));
        assert!(block.secondary.is_empty());
    }

    #[test]
    fn test_attribute_value_display() {
        assert_eq!(AttributeValue::from(2.5).to_string(), "2.5");
        assert_eq!(AttributeValue::from(3).to_string(), "3");
        assert_eq!(AttributeValue::from(true).to_string(), "true");
        assert_eq!(AttributeValue::from("x").to_string(), "x");
    }
}
