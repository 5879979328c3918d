//! Link element: one per parent-to-child edge.
//!
//! A link fades in on mount and out on removal. Its path is recomputed
//! from props on every render. When the edge carries an overlay label, a
//! wide transparent path is added as the hover target, since the visible
//! stroke is too thin to hit reliably.

use serde::{Deserialize, Serialize};

use crate::geometry::{fmt_num, LinkDescriptor, Orientation};
use crate::hover::{HoverLabelPositioner, HoverState, OverlayLabel, PositionedOverlay};
use crate::path::{compute_path, PathStrategy};
use crate::style::{resolve_style, style, StyleMap};
use crate::transition::{Keyframe, OnSettled, TransformScheduler, TransitionState};

/// Class shared by the visible path and its hit area.
pub const LINK_CLASS: &str = "linkBase";

/// Stroke width of the visible path.
pub const LINK_STROKE_WIDTH: &str = "2.5";

/// Stroke width of the invisible hover target.
pub const HIT_AREA_STROKE_WIDTH: &str = "22";

/// Dash pattern for dashed edges.
pub const DASH_PATTERN: &str = "5,5";

/// Per-edge options carried by the child node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeOptions {
    /// Highest-precedence style layer for this edge.
    pub style: StyleMap,
    pub dashed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_label: Option<OverlayLabel>,
}

/// Inputs of a link for one render pass.
#[derive(Debug, Clone)]
pub struct LinkProps {
    pub link_data: LinkDescriptor,
    pub orientation: Orientation,
    pub path_func: PathStrategy,
    pub transition_duration: u64,
    /// Caller style overrides shared by all links.
    pub styles: StyleMap,
    pub edge: EdgeOptions,
}

/// Transparent wide path that receives pointer events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitArea {
    pub d: String,
    pub style: StyleMap,
    pub stroke_width: String,
}

/// Renderable output of a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkFragment {
    pub id: String,
    pub d: String,
    pub class_name: String,
    pub style: StyleMap,
    pub stroke_dasharray: Option<String>,
    pub stroke_width: String,
    pub hit_area: Option<HitArea>,
    pub overlay: Option<PositionedOverlay>,
}

/// A link instance with its own hover state.
#[derive(Debug, Clone)]
pub struct Link {
    id: String,
    props: LinkProps,
    hover: HoverState,
}

impl Link {
    pub fn new(id: impl Into<String>, props: LinkProps) -> Self {
        Self {
            id: id.into(),
            props,
            hover: HoverState::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn props(&self) -> &LinkProps {
        &self.props
    }

    #[must_use]
    pub const fn hover(&self) -> HoverState {
        self.hover
    }

    /// Path data for the current props.
    #[must_use]
    pub fn draw_path(&self) -> String {
        compute_path(
            &self.props.link_data,
            self.props.orientation,
            &self.props.path_func,
        )
    }

    /// Fades the link in.
    pub fn mount(&self, scheduler: &mut TransformScheduler) -> TransitionState {
        let at = self.props.link_data.target.point();
        scheduler.schedule(
            &self.id,
            Keyframe::hidden(at),
            Keyframe::visible(at),
            self.props.orientation,
            self.props.transition_duration,
            None,
        )
    }

    /// Applies new props, keeping the link visible.
    pub fn update(&mut self, props: LinkProps, scheduler: &mut TransformScheduler) {
        self.props = props;
        scheduler.update(
            &self.id,
            Keyframe::visible(self.props.link_data.target.point()),
            self.props.orientation,
            self.props.transition_duration,
            None,
        );
    }

    /// Fades the link out; `on_settled` fires once it may be detached.
    pub fn leave(&self, scheduler: &mut TransformScheduler, on_settled: Option<OnSettled>) {
        scheduler.leave(
            &self.id,
            self.props.link_data.target.point(),
            self.props.orientation,
            self.props.transition_duration,
            on_settled,
        );
    }

    /// Pointer entered the hit area. Ignored when there is no overlay to
    /// show, since no hit area is rendered then.
    pub fn pointer_enter(&mut self) {
        if self.props.edge.overlay_label.is_some() {
            self.hover.pointer_enter();
        }
    }

    pub fn pointer_leave(&mut self) {
        self.hover.pointer_leave();
    }

    /// Builds the renderable fragment using the current transition state.
    #[must_use]
    pub fn render(&self, scheduler: &TransformScheduler) -> LinkFragment {
        let opacity = scheduler
            .state(&self.id)
            .map_or(0.0, |state| state.opacity);
        let base = style([("opacity", fmt_num(opacity))]);
        let resolved = resolve_style(&[&base, &self.props.styles, &self.props.edge.style]);
        let d = self.draw_path();

        let overlay_label = self.props.edge.overlay_label.as_ref();
        let hit_area = overlay_label.map(|_| HitArea {
            d: d.clone(),
            style: style([("stroke", "transparent"), ("cursor", "pointer")]),
            stroke_width: HIT_AREA_STROKE_WIDTH.to_string(),
        });
        let overlay = HoverLabelPositioner::new(self.props.orientation).overlay(
            self.hover,
            overlay_label,
            &self.props.link_data.target,
        );

        LinkFragment {
            id: self.id.clone(),
            d,
            class_name: LINK_CLASS.to_string(),
            style: resolved,
            stroke_dasharray: self.props.edge.dashed.then(|| DASH_PATTERN.to_string()),
            stroke_width: LINK_STROKE_WIDTH.to_string(),
            hit_area,
            overlay,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use super::*;
    use crate::geometry::{Endpoint, Point};

    fn props(duration: u64) -> LinkProps {
        let source = Endpoint::new(0.0, 0.0);
        let target = Endpoint::new(10.0, 20.0).with_parent(source.clone());
        LinkProps {
            link_data: LinkDescriptor::new(source, target),
            orientation: Orientation::Vertical,
            path_func: PathStrategy::Elbow,
            transition_duration: duration,
            styles: StyleMap::new(),
            edge: EdgeOptions::default(),
        }
    }

    #[test]
    fn test_render_before_mount_is_hidden() {
        let scheduler = TransformScheduler::new();
        let link = Link::new("l", props(0));
        let fragment = link.render(&scheduler);
        assert_eq!(fragment.style.get("opacity").map(String::as_str), Some("0"));
        assert_eq!(fragment.d, "M0,0V20H10");
        assert_eq!(fragment.stroke_width, "2.5");
        assert!(fragment.hit_area.is_none());
        assert!(fragment.stroke_dasharray.is_none());
    }

    #[test]
    fn test_mount_zero_duration_is_visible() {
        let mut scheduler = TransformScheduler::new();
        let link = Link::new("l", props(0));
        link.mount(&mut scheduler);
        let fragment = link.render(&scheduler);
        assert_eq!(fragment.style.get("opacity").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_style_layers() {
        let mut scheduler = TransformScheduler::new();
        let mut p = props(0);
        p.styles = style([("stroke", "red"), ("opacity", "0.8")]);
        p.edge.style = style([("stroke", "blue")]);
        p.edge.dashed = true;
        let link = Link::new("l", p);
        link.mount(&mut scheduler);

        let fragment = link.render(&scheduler);
        assert_eq!(fragment.style.get("stroke").map(String::as_str), Some("blue"));
        assert_eq!(fragment.style.get("opacity").map(String::as_str), Some("0.8"));
        assert_eq!(fragment.stroke_dasharray.as_deref(), Some("5,5"));
    }

    #[test]
    fn test_overlay_shown_only_while_hovered() {
        let scheduler = TransformScheduler::new();
        let mut p = props(0);
        p.edge.overlay_label = Some(OverlayLabel::new("weight 3"));
        let mut link = Link::new("l", p);

        let fragment = link.render(&scheduler);
        assert!(fragment.hit_area.is_some());
        assert!(fragment.overlay.is_none());

        link.pointer_enter();
        let overlay = link.render(&scheduler).overlay.unwrap();
        assert_eq!(overlay.position, Point::new(5.0, 10.0));
        assert_eq!(overlay.label.text, "weight 3");

        link.pointer_leave();
        assert!(link.render(&scheduler).overlay.is_none());
    }

    #[test]
    fn test_hover_ignored_without_overlay() {
        let mut link = Link::new("l", props(0));
        link.pointer_enter();
        assert!(!link.hover().is_active());
    }

    #[test]
    fn test_leave_fades_out_then_detaches() {
        let mut scheduler = TransformScheduler::new();
        let link = Link::new("l", props(100));
        link.mount(&mut scheduler);
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(scheduler.state("l").unwrap().opacity, 1.0);

        link.leave(&mut scheduler, None);
        scheduler.advance(Duration::from_millis(50));
        assert!(scheduler.state("l").unwrap().opacity < 1.0);
        let detached = scheduler.advance(Duration::from_millis(50));
        assert_eq!(detached, vec!["l".to_string()]);
    }
}
