//! Node element: one per tree vertex.
//!
//! A node enters from its parent's last known position, follows its own
//! position on updates and exits back towards its parent. The shape, the
//! label and an optional hover overlay are rendered inside a group
//! translated to the node's position.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{fmt_num, translate, Endpoint, Orientation, Point};
use crate::hover::{HoverState, OverlayLabel, PositionedOverlay};
use crate::style::{resolve_style, style, NodeStyles, StyleMap, TreeStyles};
use crate::text::{Attributes, NodeShape, TextBlock, TextLayout, TextLayoutComposer};
use crate::transition::{Keyframe, OnSettled, TransformScheduler, TransitionState};

/// Class of the shape of a node that has children.
pub const NODE_CLASS: &str = "nodeBase";

/// Class of the shape of a leaf.
pub const LEAF_NODE_CLASS: &str = "leafNodeBase";

/// Parent position as last seen by a child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    pub x: f64,
    pub y: f64,
    /// Set by hosts that keep rendering children of a collapsing parent.
    /// `Forest::flatten` drops such children and always leaves it unset.
    #[serde(default)]
    pub collapsed: bool,
}

impl ParentRef {
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Data of one vertex for a render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    /// The node has children, whether or not they are currently shown.
    #[serde(default)]
    pub has_children: bool,
}

impl NodeData {
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position where enter and exit animations are anchored.
    #[must_use]
    pub fn anchor(&self) -> Point {
        self.parent.map_or_else(Point::origin, |p| p.point())
    }

    /// This node as an endpoint, with its parent attached.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        let endpoint = Endpoint::new(self.x, self.y);
        match self.parent {
            Some(parent) => endpoint.with_parent(Endpoint::new(parent.x, parent.y)),
            None => endpoint,
        }
    }
}

/// Inputs of a node for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProps {
    pub node_data: NodeData,
    pub node_svg_shape: NodeShape,
    /// Legacy shape override; draws a plain circle when set.
    pub circle_radius: Option<f64>,
    pub orientation: Orientation,
    pub transition_duration: u64,
    pub text_layout: TextLayout,
    pub styles: TreeStyles,
    pub overlay_label: Option<OverlayLabel>,
    /// Bumped by the host to force a re-render.
    pub subscriptions: u64,
}

/// Pointer callback receiving the node id.
pub type NodeCallback = Rc<dyn Fn(&str)>;

/// Caller callbacks for pointer events on a node.
#[derive(Clone, Default)]
pub struct NodeHandlers {
    pub on_click: Option<NodeCallback>,
    pub on_mouse_over: Option<NodeCallback>,
    pub on_mouse_out: Option<NodeCallback>,
}

impl fmt::Debug for NodeHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandlers")
            .field("on_click", &self.on_click.is_some())
            .field("on_mouse_over", &self.on_mouse_over.is_some())
            .field("on_mouse_out", &self.on_mouse_out.is_some())
            .finish()
    }
}

/// The SVG element drawn for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    pub style: StyleMap,
    pub class_name: Option<String>,
}

/// Renderable output of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFragment {
    pub id: String,
    pub transform: String,
    pub opacity: f64,
    pub shape: Option<ShapeElement>,
    pub text: TextBlock,
    pub name_style: StyleMap,
    pub attributes_style: StyleMap,
    /// Overlay in node-local coordinates.
    pub overlay: Option<PositionedOverlay>,
}

/// A node instance with its own hover state.
#[derive(Debug, Clone)]
pub struct Node {
    props: NodeProps,
    hover: HoverState,
    handlers: NodeHandlers,
}

impl Node {
    #[must_use]
    pub fn new(props: NodeProps) -> Self {
        Self {
            props,
            hover: HoverState::new(),
            handlers: NodeHandlers::default(),
        }
    }

    #[must_use]
    pub fn with_handlers(mut self, handlers: NodeHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Replaces the pointer callbacks of a mounted node.
    pub fn set_handlers(&mut self, handlers: NodeHandlers) {
        self.handlers = handlers;
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.props.node_data.id
    }

    #[must_use]
    pub const fn props(&self) -> &NodeProps {
        &self.props
    }

    #[must_use]
    pub const fn hover(&self) -> HoverState {
        self.hover
    }

    /// Enters from the parent's position.
    pub fn mount(&self, scheduler: &mut TransformScheduler) -> TransitionState {
        let data = &self.props.node_data;
        scheduler.enter(
            &data.id,
            data.anchor(),
            data.point(),
            self.props.orientation,
            self.props.transition_duration,
            None,
        )
    }

    /// Whether moving from the current props to `next` needs a render.
    ///
    /// A settled child of an expanded parent always re-renders so its
    /// hover overlay stays current.
    #[must_use]
    pub fn should_update(&self, next: &NodeProps, scheduler: &TransformScheduler) -> bool {
        let transforming = scheduler
            .get(self.id())
            .is_some_and(|t| t.is_transforming());
        let overlay_refresh =
            !transforming && next.node_data.parent.is_some_and(|p| !p.collapsed);
        let current = &self.props;

        overlay_refresh
            || next.subscriptions != current.subscriptions
            || next.node_data.x != current.node_data.x
            || next.node_data.y != current.node_data.y
            || next.orientation != current.orientation
    }

    /// Applies `next` and animates to its position if it needs a render.
    /// Returns whether it did.
    pub fn update(&mut self, next: NodeProps, scheduler: &mut TransformScheduler) -> bool {
        if !self.should_update(&next, scheduler) {
            self.props = next;
            return false;
        }
        self.props = next;
        scheduler.update(
            self.id(),
            Keyframe::visible(self.props.node_data.point()),
            self.props.orientation,
            self.props.transition_duration,
            None,
        );
        true
    }

    /// Brings a leaving node back, animating from wherever its exit got to.
    pub fn resume(&mut self, next: NodeProps, scheduler: &mut TransformScheduler) {
        self.props = next;
        scheduler.update(
            self.id(),
            Keyframe::visible(self.props.node_data.point()),
            self.props.orientation,
            self.props.transition_duration,
            None,
        );
    }

    /// Exits towards the parent; `on_settled` fires once it may be detached.
    pub fn leave(&self, scheduler: &mut TransformScheduler, on_settled: Option<OnSettled>) {
        let data = &self.props.node_data;
        scheduler.leave(
            &data.id,
            data.anchor(),
            self.props.orientation,
            self.props.transition_duration,
            on_settled,
        );
    }

    pub fn handle_click(&self) {
        if let Some(cb) = &self.handlers.on_click {
            cb(self.id());
        }
    }

    pub fn handle_mouse_over(&mut self) {
        self.hover.pointer_enter();
        if let Some(cb) = &self.handlers.on_mouse_over {
            cb(self.id());
        }
    }

    pub fn handle_mouse_out(&mut self) {
        self.hover.pointer_leave();
        if let Some(cb) = &self.handlers.on_mouse_out {
            cb(self.id());
        }
    }

    fn node_styles(&self) -> &NodeStyles {
        self.props.styles.for_node(self.props.node_data.has_children)
    }

    fn shape_element(&self) -> Option<ShapeElement> {
        let node_style = self.node_styles();
        if let Some(r) = self.props.circle_radius {
            return Some(ShapeElement {
                tag: "circle".to_string(),
                attrs: style([("r", fmt_num(r))]),
                style: node_style.circle.clone(),
                class_name: None,
            });
        }

        let shape = &self.props.node_svg_shape;
        let tag = shape.shape.tag()?;
        let props = &shape.shape_props;
        let mut attrs: IndexMap<String, String> = [
            ("r", props.r),
            ("x", props.x),
            ("y", props.y),
            ("width", props.width),
            ("height", props.height),
            ("rx", props.rx),
            ("ry", props.ry),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), fmt_num(v))))
        .collect();
        attrs.extend(props.attrs.iter().map(|(k, v)| (k.clone(), v.clone())));

        let class_name = if self.props.node_data.has_children {
            NODE_CLASS
        } else {
            LEAF_NODE_CLASS
        };
        Some(ShapeElement {
            tag: tag.to_string(),
            attrs,
            style: resolve_style(&[&node_style.circle]),
            class_name: Some(class_name.to_string()),
        })
    }

    /// Overlay shown while hovered, halfway back to the parent in
    /// node-local coordinates. Roots show it at their own origin.
    fn overlay(&self) -> Option<PositionedOverlay> {
        if !self.hover.is_active() || self.props.circle_radius.is_some() {
            return None;
        }
        let label = self.props.overlay_label.as_ref()?;
        let data = &self.props.node_data;
        let orientation = self.props.orientation;
        let own = orientation.project(data.point());
        let position = crate::hover::position(&data.endpoint()).map_or_else(Point::origin, |mid| {
            let mid = orientation.project(mid);
            Point::new(mid.x - own.x, mid.y - own.y)
        });
        Some(PositionedOverlay {
            label: label.clone(),
            position,
        })
    }

    /// Builds the renderable fragment using the current transition state.
    #[must_use]
    pub fn render(&self, scheduler: &TransformScheduler) -> NodeFragment {
        let data = &self.props.node_data;
        let state = scheduler
            .state(&data.id)
            .unwrap_or_else(|| unmounted_state(data.anchor(), self.props.orientation));
        let node_style = self.node_styles();

        NodeFragment {
            id: data.id.clone(),
            transform: state.transform,
            opacity: state.opacity,
            shape: self.shape_element(),
            text: TextLayoutComposer::layout(
                &data.name,
                &data.attributes,
                &self.props.node_svg_shape,
                &self.props.text_layout,
            ),
            name_style: node_style.name.clone(),
            attributes_style: node_style.attributes.clone(),
            overlay: self.overlay(),
        }
    }
}

fn unmounted_state(anchor: Point, orientation: Orientation) -> TransitionState {
    TransitionState {
        opacity: 0.0,
        transform: translate(anchor, orientation),
        is_animating: false,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::cell::RefCell;
    use std::time::Duration;

    use super::*;
    use crate::text::ShapeKind;

    fn data(id: &str, x: f64, y: f64, parent: Option<ParentRef>) -> NodeData {
        NodeData {
            id: id.to_string(),
            name: id.to_uppercase(),
            x,
            y,
            attributes: Attributes::new(),
            parent,
            has_children: false,
        }
    }

    fn props(node_data: NodeData, duration: u64) -> NodeProps {
        NodeProps {
            node_data,
            node_svg_shape: NodeShape::default(),
            circle_radius: None,
            orientation: Orientation::Vertical,
            transition_duration: duration,
            text_layout: TextLayout::default(),
            styles: TreeStyles::default(),
            overlay_label: None,
            subscriptions: 0,
        }
    }

    fn parent_at(x: f64, y: f64) -> Option<ParentRef> {
        Some(ParentRef { x, y, collapsed: false })
    }

    #[test]
    fn test_unmounted_render_sits_on_parent() {
        let scheduler = TransformScheduler::new();
        let node = Node::new(props(data("c", 50.0, 100.0, parent_at(10.0, 20.0)), 500));
        let fragment = node.render(&scheduler);
        assert_eq!(fragment.transform, "translate(10,20)");
        assert_eq!(fragment.opacity, 0.0);
    }

    #[test]
    fn test_mount_zero_duration() {
        let mut scheduler = TransformScheduler::new();
        let mut p = props(data("c", 50.0, 100.0, parent_at(10.0, 20.0)), 0);
        p.orientation = Orientation::Horizontal;
        let node = Node::new(p);
        let state = node.mount(&mut scheduler);
        assert_eq!(state.transform, "translate(100,50)");
        assert_eq!(state.opacity, 1.0);
    }

    #[test]
    fn test_mount_animates_from_parent() {
        let mut scheduler = TransformScheduler::new();
        let node = Node::new(props(data("c", 50.0, 100.0, parent_at(10.0, 20.0)), 400));
        node.mount(&mut scheduler);
        assert_eq!(node.render(&scheduler).transform, "translate(10,20)");
        scheduler.advance(Duration::from_millis(400));
        let fragment = node.render(&scheduler);
        assert_eq!(fragment.transform, "translate(50,100)");
        assert_eq!(fragment.opacity, 1.0);
    }

    #[test]
    fn test_root_enters_from_origin() {
        let mut scheduler = TransformScheduler::new();
        let node = Node::new(props(data("root", 30.0, 0.0, None), 400));
        let state = node.mount(&mut scheduler);
        assert_eq!(state.transform, "translate(0,0)");
    }

    #[test]
    fn test_should_update_on_position_change() {
        let scheduler = TransformScheduler::new();
        let node = Node::new(props(data("root", 0.0, 0.0, None), 0));
        let same = props(data("root", 0.0, 0.0, None), 0);
        assert!(!node.should_update(&same, &scheduler));

        let moved = props(data("root", 5.0, 0.0, None), 0);
        assert!(node.should_update(&moved, &scheduler));

        let mut bumped = props(data("root", 0.0, 0.0, None), 0);
        bumped.subscriptions = 1;
        assert!(node.should_update(&bumped, &scheduler));

        let mut rotated = props(data("root", 0.0, 0.0, None), 0);
        rotated.orientation = Orientation::Horizontal;
        assert!(node.should_update(&rotated, &scheduler));
    }

    #[test]
    fn test_should_update_child_of_expanded_parent() {
        let scheduler = TransformScheduler::new();
        let node = Node::new(props(data("c", 0.0, 10.0, parent_at(0.0, 0.0)), 0));
        let next = props(data("c", 0.0, 10.0, parent_at(0.0, 0.0)), 0);
        assert!(node.should_update(&next, &scheduler));

        let collapsed = props(
            data("c", 0.0, 10.0, Some(ParentRef { x: 0.0, y: 0.0, collapsed: true })),
            0,
        );
        assert!(!node.should_update(&collapsed, &scheduler));
    }

    #[test]
    fn test_should_update_suppressed_while_leaving() {
        let mut scheduler = TransformScheduler::new();
        let node = Node::new(props(data("c", 0.0, 10.0, parent_at(0.0, 0.0)), 300));
        node.mount(&mut scheduler);
        scheduler.settle_all(Duration::from_millis(16));
        node.leave(&mut scheduler, None);
        let next = props(data("c", 0.0, 10.0, parent_at(0.0, 0.0)), 300);
        assert!(!node.should_update(&next, &scheduler));
    }

    #[test]
    fn test_leave_returns_to_parent() {
        let mut scheduler = TransformScheduler::new();
        let node = Node::new(props(data("c", 40.0, 80.0, parent_at(10.0, 20.0)), 0));
        node.mount(&mut scheduler);
        let done = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&done);
        node.leave(
            &mut scheduler,
            crate::transition::on_settled(move || *flag.borrow_mut() = true),
        );
        assert!(*done.borrow());
        assert!(!scheduler.contains("c"));
    }

    #[test]
    fn test_shape_classes() {
        let scheduler = TransformScheduler::new();
        let mut d = data("n", 0.0, 0.0, None);
        let leaf = Node::new(props(d.clone(), 0)).render(&scheduler);
        assert_eq!(leaf.shape.unwrap().class_name.as_deref(), Some(LEAF_NODE_CLASS));

        d.has_children = true;
        let inner = Node::new(props(d, 0)).render(&scheduler);
        let shape = inner.shape.unwrap();
        assert_eq!(shape.class_name.as_deref(), Some(NODE_CLASS));
        assert_eq!(shape.tag, "circle");
        assert_eq!(shape.attrs.get("r").map(String::as_str), Some("10"));
    }

    #[test]
    fn test_legacy_circle_radius() {
        let scheduler = TransformScheduler::new();
        let mut p = props(data("n", 0.0, 0.0, None), 0);
        p.circle_radius = Some(7.0);
        p.overlay_label = Some(OverlayLabel::new("hi"));
        let mut node = Node::new(p);
        node.handle_mouse_over();
        let fragment = node.render(&scheduler);
        let shape = fragment.shape.unwrap();
        assert_eq!(shape.attrs.get("r").map(String::as_str), Some("7"));
        assert!(shape.class_name.is_none());
        assert!(fragment.overlay.is_none());
    }

    #[test]
    fn test_shape_none() {
        let scheduler = TransformScheduler::new();
        let mut p = props(data("n", 0.0, 0.0, None), 0);
        p.node_svg_shape.shape = ShapeKind::None;
        assert!(Node::new(p).render(&scheduler).shape.is_none());
    }

    #[test]
    fn test_handlers_receive_id_and_toggle_hover() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
        let handlers = NodeHandlers {
            on_click: Some(Rc::new(move |id: &str| a.borrow_mut().push(format!("click:{id}")))),
            on_mouse_over: Some(Rc::new(move |id: &str| b.borrow_mut().push(format!("over:{id}")))),
            on_mouse_out: Some(Rc::new(move |id: &str| c.borrow_mut().push(format!("out:{id}")))),
        };
        let mut node = Node::new(props(data("n", 0.0, 0.0, None), 0)).with_handlers(handlers);

        node.handle_mouse_over();
        assert!(node.hover().is_active());
        node.handle_click();
        node.handle_mouse_out();
        assert!(!node.hover().is_active());
        assert_eq!(*log.borrow(), ["over:n", "click:n", "out:n"]);
    }

    #[test]
    fn test_overlay_local_midpoint() {
        let scheduler = TransformScheduler::new();
        let mut p = props(data("c", 10.0, 20.0, parent_at(0.0, 0.0)), 0);
        p.overlay_label = Some(OverlayLabel::new("info"));
        let mut node = Node::new(p);
        assert!(node.render(&scheduler).overlay.is_none());

        node.handle_mouse_over();
        let overlay = node.render(&scheduler).overlay.unwrap();
        assert_eq!(overlay.position, Point::new(-5.0, -10.0));
    }
}
