//! Link path computation.
//!
//! Produces SVG path data connecting a parent (`source`) to a child
//! (`target`). Three built-in shapes are available plus caller-supplied
//! functions. Every strategy is pure: identical inputs give byte-identical
//! output.
//!
//! ```
//! use tree_diagram_core::geometry::{Endpoint, LinkDescriptor, Orientation};
//! use tree_diagram_core::path::{compute_path, PathStrategy};
//!
//! let link = LinkDescriptor::new(Endpoint::new(0.0, 0.0), Endpoint::new(10.0, 5.0));
//! let d = compute_path(&link, Orientation::Vertical, &PathStrategy::Elbow);
//! assert_eq!(d, "M0,0V5H10");
//! ```

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::geometry::{fmt_num, fmt_point, LinkDescriptor, Orientation, Point};

/// Signature of a caller-supplied path function.
pub type PathFn = dyn Fn(&LinkDescriptor, Orientation) -> String;

/// Which shape a link is drawn with.
#[derive(Clone, Default)]
pub enum PathStrategy {
    /// Smooth cubic curve, the conventional parent/child projection.
    #[default]
    Diagonal,
    /// Two orthogonal segments meeting at a right angle.
    Elbow,
    /// A single straight segment.
    Straight,
    /// Caller-supplied function; its output is used verbatim.
    Custom(Arc<PathFn>),
}

impl PathStrategy {
    /// Wraps a closure as a custom strategy.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&LinkDescriptor, Orientation) -> String + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Built-in strategy named by `tag`, if any.
    #[must_use]
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "diagonal" => Some(Self::Diagonal),
            "elbow" => Some(Self::Elbow),
            "straight" => Some(Self::Straight),
            _ => None,
        }
    }

    /// Resolves a configuration tag.
    ///
    /// Unknown tags fall back to [`PathStrategy::Diagonal`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        Self::parse_tag(tag).unwrap_or_else(|| {
            tracing::warn!(tag, "unknown path function, drawing diagonal");
            Self::Diagonal
        })
    }

    /// Tag of a built-in strategy, `None` for custom functions.
    #[must_use]
    pub const fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Diagonal => Some("diagonal"),
            Self::Elbow => Some("elbow"),
            Self::Straight => Some("straight"),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Debug for PathStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => f.write_str(tag),
            None => f.write_str("Custom(..)"),
        }
    }
}

/// Computes the path data for `link`.
#[must_use]
pub fn compute_path(
    link: &LinkDescriptor,
    orientation: Orientation,
    strategy: &PathStrategy,
) -> String {
    match strategy {
        PathStrategy::Custom(f) => f(link, orientation),
        PathStrategy::Diagonal => diagonal_path(link, orientation),
        PathStrategy::Elbow => elbow_path(link, orientation),
        PathStrategy::Straight => straight_path(link, orientation),
    }
}

/// Cubic curve whose control points sit on the vertical midline between
/// the two nodes, projected through the orientation.
#[must_use]
pub fn diagonal_path(link: &LinkDescriptor, orientation: Orientation) -> String {
    let source = link.source.point();
    let target = link.target.point();
    let mid_y = (source.y + target.y) / 2.0;

    let [p0, p1, p2, p3] = [
        source,
        Point::new(source.x, mid_y),
        Point::new(target.x, mid_y),
        target,
    ]
    .map(|p| orientation.project(p));

    format!(
        "M{}C{} {} {}",
        fmt_point(p0),
        fmt_point(p1),
        fmt_point(p2),
        fmt_point(p3)
    )
}

/// Vertical-then-horizontal in logical space. Projection turns it into
/// horizontal-then-vertical on screen for horizontal trees.
#[must_use]
pub fn elbow_path(link: &LinkDescriptor, orientation: Orientation) -> String {
    let source = orientation.project(link.source.point());
    let target = orientation.project(link.target.point());
    format!(
        "M{},{}V{}H{}",
        fmt_num(source.x),
        fmt_num(source.y),
        fmt_num(target.y),
        fmt_num(target.x)
    )
}

/// Basis-interpolated line through source and target.
#[must_use]
pub fn straight_path(link: &LinkDescriptor, orientation: Orientation) -> String {
    let points = [link.source.point(), link.target.point()].map(|p| orientation.project(p));
    basis_line(&points)
}

/// Uniform B-spline through `points`, emitted as SVG path data.
///
/// Fewer than three points degenerate to a polyline, which is what
/// [`straight_path`] relies on.
#[must_use]
pub fn basis_line(points: &[Point]) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return String::new();
    };
    if points.len() < 3 {
        return format!("M{}", points.iter().map(|p| fmt_point(*p)).join("L"));
    }

    // Sliding window of four control points, seeded by tripling the first
    // point and closed by repeating the last one.
    let mut window = [*first, *first, *first, points[1]];
    let mut out = format!("M{}L{}", fmt_point(*first), fmt_point(basis_end(&window)));
    for next in points.iter().skip(2).chain(std::iter::once(last)) {
        window = [window[1], window[2], window[3], *next];
        let [c1, c2, end] = basis_bezier(&window);
        out.push_str(&format!(
            "C{},{},{}",
            fmt_point(c1),
            fmt_point(c2),
            fmt_point(end)
        ));
    }
    out.push_str(&format!("L{}", fmt_point(*last)));
    out
}

fn basis_bezier(w: &[Point; 4]) -> [Point; 3] {
    let c1 = Point::new((2.0 * w[1].x + w[2].x) / 3.0, (2.0 * w[1].y + w[2].y) / 3.0);
    let c2 = Point::new((w[1].x + 2.0 * w[2].x) / 3.0, (w[1].y + 2.0 * w[2].y) / 3.0);
    [c1, c2, basis_end(w)]
}

fn basis_end(w: &[Point; 4]) -> Point {
    Point::new(
        (w[1].x + 4.0 * w[2].x + w[3].x) / 6.0,
        (w[1].y + 4.0 * w[2].y + w[3].y) / 6.0,
    )
}
