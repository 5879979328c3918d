//! Coordinates, endpoints and the orientation axis swap.
//!
//! All positions are stored in logical tree space, where `y` grows from
//! root to leaf. [`Orientation::project`] maps a logical point to screen
//! space and is the only place the axis swap happens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// 2D point in logical tree coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point from coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin, used as the enter/exit anchor for parentless nodes.
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Arithmetic midpoint between two points.
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation towards `other`; `t` is not clamped.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Tree layout axis.
///
/// `Vertical` grows root-to-leaf top-to-bottom; `Horizontal` grows
/// left-to-right, which swaps `x` and `y` on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    /// Maps a logical point to screen space.
    #[inline]
    #[must_use]
    pub const fn project(self, point: Point) -> Point {
        match self {
            Self::Horizontal => Point::new(point.y, point.x),
            Self::Vertical => point,
        }
    }

    /// Returns the tag used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            other => Err(Error::UnknownOrientation(other.to_string())),
        }
    }
}

/// A tree node's position plus an optional back-reference to its parent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Endpoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Endpoint>>,
}

impl Endpoint {
    /// Creates a parentless endpoint.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, parent: None }
    }

    /// Attaches a parent endpoint.
    #[must_use]
    pub fn with_parent(mut self, parent: Self) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Position of this endpoint as a point.
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position of the parent, if any.
    #[must_use]
    pub fn parent_point(&self) -> Option<Point> {
        self.parent.as_deref().map(Self::point)
    }
}

impl From<Point> for Endpoint {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

/// One parent-to-child edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    pub source: Endpoint,
    pub target: Endpoint,
}

impl LinkDescriptor {
    #[must_use]
    pub const fn new(source: Endpoint, target: Endpoint) -> Self {
        Self { source, target }
    }
}

/// Formats a coordinate the way SVG path data and transforms expect.
///
/// Integral values drop the fractional part (`5`, not `5.0`), negative
/// zero prints as `0` and non-finite values print as `NaN`, `Infinity`
/// and `-Infinity` rather than failing. Magnitudes of `1e21` and above,
/// or below `1e-6`, use exponent form with a signed exponent (`1e+21`).
#[must_use]
pub fn fmt_num(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 1e21 || value.abs() < 1e-6 {
        let formatted = format!("{value:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else {
        value.to_string()
    }
}

/// Formats a point as `x,y`.
#[must_use]
pub fn fmt_point(point: Point) -> String {
    format!("{},{}", fmt_num(point.x), fmt_num(point.y))
}

/// Builds the `translate(px,py)` transform for a logical position.
#[must_use]
pub fn translate(point: Point, orientation: Orientation) -> String {
    format!("translate({})", fmt_point(orientation.project(point)))
}
