//! Owning registry for one diagram instance.
//!
//! A [`Scene`] keeps every mounted [`Node`] and [`Link`] keyed by stable
//! identity. Each render pass is diffed against the previous one: new ids
//! enter, known ids update, and missing ids start leaving. A leaving
//! element stays in the scene, and keeps rendering, until its exit
//! completion fires.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::link::{Link, LinkFragment, LinkProps};
use crate::node::{Node, NodeFragment, NodeProps};
use crate::transition::{on_settled, OnSettled, TransformScheduler};
use crate::tree::FlatTree;

/// Kind of element a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Node,
    Link,
}

type DetachQueue = Rc<RefCell<Vec<(Kind, String)>>>;

/// Counts of what a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassSummary {
    pub entered: usize,
    pub updated: usize,
    pub left: usize,
}

/// Every fragment of the scene, links first so nodes paint on top.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneFragments {
    pub links: Vec<LinkFragment>,
    pub nodes: Vec<NodeFragment>,
}

/// A diagram's mounted elements and their transitions.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: IndexMap<String, Node>,
    links: IndexMap<String, Link>,
    node_transitions: TransformScheduler,
    link_transitions: TransformScheduler,
    leaving: HashSet<(Kind, String)>,
    detached: DetachQueue,
    subscriptions: u64,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scene whose transitions use the configured easing.
    #[must_use]
    pub fn with_config(config: &RenderConfig) -> Self {
        Self {
            node_transitions: TransformScheduler::new().with_easing(config.easing),
            link_transitions: TransformScheduler::new().with_easing(config.easing),
            ..Self::default()
        }
    }

    /// Diffs `nodes` and `links` against the mounted elements.
    pub fn render_pass(
        &mut self,
        nodes: Vec<NodeProps>,
        links: Vec<(String, LinkProps)>,
    ) -> PassSummary {
        let mut summary = PassSummary::default();

        let incoming: HashSet<String> = nodes.iter().map(|p| p.node_data.id.clone()).collect();
        let departing: Vec<String> = self
            .nodes
            .keys()
            .filter(|id| !incoming.contains(*id) && !self.is_leaving(Kind::Node, id))
            .cloned()
            .collect();
        for props in nodes {
            let id = props.node_data.id.clone();
            let resumed = self.leaving.remove(&(Kind::Node, id.clone()));
            if let Some(node) = self.nodes.get_mut(&id) {
                if resumed {
                    node.resume(props, &mut self.node_transitions);
                } else {
                    node.update(props, &mut self.node_transitions);
                }
                summary.updated += 1;
            } else {
                let node = Node::new(props);
                node.mount(&mut self.node_transitions);
                self.nodes.insert(id, node);
                summary.entered += 1;
            }
        }
        for id in departing {
            let done = self.detach_callback(Kind::Node, &id);
            if let Some(node) = self.nodes.get(&id) {
                self.leaving.insert((Kind::Node, id));
                node.leave(&mut self.node_transitions, done);
                summary.left += 1;
            }
        }

        let incoming: HashSet<String> = links.iter().map(|(id, _)| id.clone()).collect();
        let departing: Vec<String> = self
            .links
            .keys()
            .filter(|id| !incoming.contains(*id) && !self.is_leaving(Kind::Link, id))
            .cloned()
            .collect();
        for (id, props) in links {
            self.leaving.remove(&(Kind::Link, id.clone()));
            if let Some(link) = self.links.get_mut(&id) {
                link.update(props, &mut self.link_transitions);
                summary.updated += 1;
            } else {
                let link = Link::new(id.clone(), props);
                link.mount(&mut self.link_transitions);
                self.links.insert(id, link);
                summary.entered += 1;
            }
        }
        for id in departing {
            let done = self.detach_callback(Kind::Link, &id);
            if let Some(link) = self.links.get(&id) {
                self.leaving.insert((Kind::Link, id));
                link.leave(&mut self.link_transitions, done);
                summary.left += 1;
            }
        }

        self.drain_detached();
        debug!(
            entered = summary.entered,
            updated = summary.updated,
            left = summary.left,
            "render pass"
        );
        summary
    }

    /// Runs a render pass for a flattened tree.
    pub fn render_tree(&mut self, tree: &FlatTree, config: &RenderConfig) -> PassSummary {
        let path_func = config.path_strategy();
        let nodes = tree
            .nodes
            .iter()
            .map(|node| config.node_props(node, self.subscriptions))
            .collect();
        let links = tree
            .links
            .iter()
            .map(|link| (link.id.clone(), config.link_props(link, &path_func)))
            .collect();
        self.render_pass(nodes, links)
    }

    /// Forces every node to re-render on the next pass.
    pub fn bump_subscriptions(&mut self) {
        self.subscriptions = self.subscriptions.wrapping_add(1);
    }

    /// Advances all transitions by `dt` and detaches settled leavers.
    pub fn advance(&mut self, dt: Duration) {
        self.node_transitions.advance(dt);
        self.link_transitions.advance(dt);
        self.drain_detached();
    }

    /// Advances in `step` increments until nothing is animating.
    pub fn settle(&mut self, step: Duration) {
        if step.is_zero() {
            return;
        }
        while self.is_animating() {
            self.advance(step);
        }
        info!(nodes = self.nodes.len(), links = self.links.len(), "scene settled");
    }

    /// Jumps every transition to its end and detaches settled leavers.
    pub fn finish(&mut self) {
        loop {
            let longest = self
                .node_transitions
                .longest_remaining()
                .max(self.link_transitions.longest_remaining());
            let Some(dt) = longest else {
                break;
            };
            self.advance(dt);
        }
        info!(nodes = self.nodes.len(), links = self.links.len(), "scene finished");
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.node_transitions.is_animating() || self.link_transitions.is_animating()
    }

    /// Whether node or link `id` is mounted (including while leaving).
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    #[must_use]
    pub fn contains_link(&self, id: &str) -> bool {
        self.links.contains_key(id)
    }

    #[must_use]
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    #[must_use]
    pub fn link_mut(&mut self, id: &str) -> Option<&mut Link> {
        self.links.get_mut(id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Renders every mounted element in mount order.
    #[must_use]
    pub fn fragments(&self) -> SceneFragments {
        SceneFragments {
            links: self
                .links
                .values()
                .map(|link| link.render(&self.link_transitions))
                .collect(),
            nodes: self
                .nodes
                .values()
                .map(|node| node.render(&self.node_transitions))
                .collect(),
        }
    }

    fn is_leaving(&self, kind: Kind, id: &str) -> bool {
        self.leaving.contains(&(kind, id.to_string()))
    }

    fn detach_callback(&self, kind: Kind, id: &str) -> Option<OnSettled> {
        let queue = Rc::clone(&self.detached);
        let id = id.to_string();
        on_settled(move || queue.borrow_mut().push((kind, id)))
    }

    fn drain_detached(&mut self) {
        let detached: Vec<(Kind, String)> = self.detached.borrow_mut().drain(..).collect();
        for (kind, id) in detached {
            if !self.leaving.remove(&(kind, id.clone())) {
                continue;
            }
            match kind {
                Kind::Node => {
                    self.nodes.shift_remove(&id);
                }
                Kind::Link => {
                    self.links.shift_remove(&id);
                }
            }
            debug!(id = id.as_str(), kind = ?kind, "removed from scene");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::node::NodeHandlers;
    use crate::tree::{Forest, TreeNode};

    fn tree(with_leaf: bool) -> FlatTree {
        let mut root = TreeNode::new("root", 0.0, 0.0).with_id("root");
        if with_leaf {
            root = root.with_child(TreeNode::new("leaf", 10.0, 20.0).with_id("leaf"));
        }
        Forest::Single(Box::new(root)).flatten().unwrap()
    }

    fn config(duration: i64) -> RenderConfig {
        RenderConfig {
            transition_duration_ms: duration,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_first_pass_enters_everything() {
        let mut scene = Scene::new();
        let summary = scene.render_tree(&tree(true), &config(0));
        assert_eq!(summary, PassSummary { entered: 3, updated: 0, left: 0 });

        let fragments = scene.fragments();
        assert_eq!(fragments.nodes.len(), 2);
        assert_eq!(fragments.links.len(), 1);
        assert_eq!(fragments.nodes[1].transform, "translate(10,20)");
        assert_eq!(fragments.nodes[1].opacity, 1.0);
    }

    #[test]
    fn test_zero_duration_leave_detaches_in_pass() {
        let mut scene = Scene::new();
        scene.render_tree(&tree(true), &config(0));
        let summary = scene.render_tree(&tree(false), &config(0));
        assert_eq!(summary.left, 2);
        assert!(!scene.contains_node("leaf"));
        assert!(!scene.contains_link("root->leaf"));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_leaving_elements_render_until_settled() {
        let mut scene = Scene::with_config(&config(200));
        scene.render_tree(&tree(true), &config(200));
        scene.settle(Duration::from_millis(50));

        scene.render_tree(&tree(false), &config(200));
        assert!(scene.contains_node("leaf"));
        scene.advance(Duration::from_millis(100));
        let fragments = scene.fragments();
        assert_eq!(fragments.nodes.len(), 2);
        assert!(fragments.nodes[1].opacity < 1.0);

        scene.advance(Duration::from_millis(100));
        assert!(!scene.contains_node("leaf"));
        assert!(!scene.contains_link("root->leaf"));
        assert!(!scene.is_animating());
    }

    #[test]
    fn test_returning_element_is_kept() {
        let mut scene = Scene::new();
        scene.render_tree(&tree(true), &config(200));
        scene.settle(Duration::from_millis(50));

        scene.render_tree(&tree(false), &config(200));
        scene.advance(Duration::from_millis(50));
        scene.render_tree(&tree(true), &config(200));
        scene.settle(Duration::from_millis(50));

        assert!(scene.contains_node("leaf"));
        assert!(scene.contains_link("root->leaf"));
        let fragments = scene.fragments();
        assert_eq!(fragments.nodes[1].opacity, 1.0);
        assert_eq!(fragments.nodes[1].transform, "translate(10,20)");
    }

    #[test]
    fn test_finish_ignores_duration() {
        let slow = config(1_000_000_000_000);
        let mut scene = Scene::with_config(&slow);
        scene.render_tree(&tree(true), &slow);
        scene.finish();
        assert!(!scene.is_animating());
        assert_eq!(scene.fragments().nodes[1].opacity, 1.0);

        scene.render_tree(&tree(false), &slow);
        scene.finish();
        assert!(!scene.contains_node("leaf"));
        assert!(!scene.contains_link("root->leaf"));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_returning_link_is_kept() {
        let mut scene = Scene::new();
        scene.render_tree(&tree(true), &config(0));
        scene.render_tree(&tree(false), &config(200));
        scene.render_tree(&tree(true), &config(0));

        scene.finish();
        assert!(scene.contains_link("root->leaf"));
        assert_eq!(scene.fragments().links.len(), 1);
    }

    #[test]
    fn test_handlers_replaced_in_place() {
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new();
        scene.render_tree(&tree(true), &config(0));

        let log = Rc::clone(&clicks);
        let handlers = NodeHandlers {
            on_click: Some(Rc::new(move |id: &str| log.borrow_mut().push(id.to_string()))),
            ..NodeHandlers::default()
        };
        scene.node_mut("leaf").unwrap().set_handlers(handlers);
        scene.node_mut("leaf").unwrap().handle_click();

        assert_eq!(*clicks.borrow(), vec!["leaf".to_string()]);
    }

    #[test]
    fn test_hover_through_scene() {
        let mut scene = Scene::new();
        scene.render_tree(&tree(true), &config(0));
        scene.node_mut("leaf").unwrap().handle_mouse_over();
        assert!(scene.node_mut("leaf").unwrap().hover().is_active());
        assert!(scene.node_mut("missing").is_none());
    }
}
