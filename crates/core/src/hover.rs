//! Hover state and overlay label placement.
//!
//! Every node and link owns its own [`HoverState`]. While it is active and
//! the caller supplied an [`OverlayLabel`], the label is placed halfway
//! between the element and its parent.

use serde::{Deserialize, Serialize};

use crate::geometry::{Endpoint, Orientation, Point};

/// Pointer hover flag for a single node or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HoverState {
    active: bool,
}

impl HoverState {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: false }
    }

    /// Pointer entered the element.
    pub fn pointer_enter(&mut self) {
        self.active = true;
    }

    /// Pointer left the element.
    pub fn pointer_leave(&mut self) {
        self.active = false;
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        self.active
    }
}

/// Caller-supplied content shown while an element is hovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayLabel {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl OverlayLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class_name: None,
        }
    }
}

/// An overlay label with its resolved screen position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedOverlay {
    pub label: OverlayLabel,
    pub position: Point,
}

/// Midpoint between `target` and its parent in logical space.
///
/// Returns `None` for a root, which has no edge to label.
#[must_use]
pub fn position(target: &Endpoint) -> Option<Point> {
    target
        .parent_point()
        .map(|parent| target.point().midpoint(&parent))
}

/// Places overlay labels in the same screen space the diagram is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverLabelPositioner {
    orientation: Orientation,
}

impl HoverLabelPositioner {
    #[must_use]
    pub const fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }

    /// Screen-space midpoint between `target` and its parent.
    #[must_use]
    pub fn position(&self, target: &Endpoint) -> Option<Point> {
        position(target).map(|mid| self.orientation.project(mid))
    }

    /// Resolves the overlay to show, if any.
    ///
    /// Nothing is evaluated unless hover is active and a label exists.
    #[must_use]
    pub fn overlay(
        &self,
        hover: HoverState,
        label: Option<&OverlayLabel>,
        target: &Endpoint,
    ) -> Option<PositionedOverlay> {
        if !hover.is_active() {
            return None;
        }
        let label = label?;
        self.position(target).map(|position| PositionedOverlay {
            label: label.clone(),
            position,
        })
    }
}
