//! Read-only traversal of a row template.

use crate::collections::map::HashSet;
use crate::template::{TemplateNode, TemplateTree, WidgetId};

/// Ordered result of walking one row template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateWalk {
    /// Nodes to instantiate per row, in pre-order. The root comes first.
    pub order: Vec<WidgetId>,
    /// Nested repeating containers. They are part of `order`, but their
    /// subtrees are left to the generator one level deeper.
    pub stops: Vec<WidgetId>,
    /// Child references that did not resolve to a node.
    pub skipped: Vec<WidgetId>,
    members: HashSet<WidgetId>,
    stop_members: HashSet<WidgetId>,
}

impl TemplateWalk {
    pub fn root(&self) -> Option<&WidgetId> {
        self.order.first()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.members.contains(id)
    }

    pub fn is_stop(&self, id: &WidgetId) -> bool {
        self.stop_members.contains(id)
    }

    fn push(&mut self, id: &WidgetId) {
        self.order.push(id.clone());
        self.members.insert(id.clone());
    }

    fn push_stop(&mut self, id: &WidgetId) {
        self.stops.push(id.clone());
        self.stop_members.insert(id.clone());
    }
}

/// Walks `tree` from `root`, collecting the nodes one row is made of.
///
/// Descendants matching `stop` are included but not descended into. Dangling
/// child ids are skipped, as is any node reached twice.
pub fn walk_template<F>(tree: &TemplateTree, root: &WidgetId, stop: F) -> TemplateWalk
where
    F: Fn(&TemplateNode) -> bool,
{
    let mut walk = TemplateWalk::default();
    if !tree.contains_key(root) {
        log::warn!("template root {root} missing; nothing to walk");
        return walk;
    }

    let mut stack: Vec<(&WidgetId, bool)> = vec![(root, true)];

    while let Some((id, is_root)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            log::warn!("template child {id} has no node; skipping");
            walk.skipped.push(id.clone());
            continue;
        };
        if walk.contains(id) {
            continue;
        }
        walk.push(id);

        if !is_root && stop(node) {
            walk.push_stop(id);
            continue;
        }
        for child in node.children.iter().rev() {
            stack.push((child, false));
        }
    }

    walk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::template_tree;

    fn ids(walk: &TemplateWalk) -> Vec<&str> {
        walk.order.iter().map(WidgetId::as_str).collect()
    }

    fn is_list(node: &TemplateNode) -> bool {
        node.kind == "LIST_WIDGET_V2"
    }

    #[test]
    fn walks_in_pre_order() {
        let tree = template_tree([
            TemplateNode::new("container", "Container1", "CONTAINER_WIDGET").with_children(["canvas"]),
            TemplateNode::new("canvas", "Canvas1", "CANVAS_WIDGET")
                .with_parent("container")
                .with_children(["text1", "text2"]),
            TemplateNode::new("text1", "Text1", "TEXT_WIDGET").with_parent("canvas"),
            TemplateNode::new("text2", "Text2", "TEXT_WIDGET").with_parent("canvas"),
        ]);

        let walk = walk_template(&tree, &WidgetId::from("container"), is_list);
        assert_eq!(ids(&walk), vec!["container", "canvas", "text1", "text2"]);
        assert!(walk.stops.is_empty());
        assert!(walk.skipped.is_empty());
    }

    #[test]
    fn stops_at_nested_list() {
        let tree = template_tree([
            TemplateNode::new("container", "Container1", "CONTAINER_WIDGET").with_children(["canvas"]),
            TemplateNode::new("canvas", "Canvas1", "CANVAS_WIDGET").with_children(["list", "text"]),
            TemplateNode::new("list", "List2", "LIST_WIDGET_V2").with_children(["inner"]),
            TemplateNode::new("inner", "Canvas2", "CANVAS_WIDGET").with_children(["deep"]),
            TemplateNode::new("deep", "Text9", "TEXT_WIDGET"),
            TemplateNode::new("text", "Text1", "TEXT_WIDGET"),
        ]);

        let walk = walk_template(&tree, &WidgetId::from("container"), is_list);
        assert_eq!(ids(&walk), vec!["container", "canvas", "list", "text"]);
        assert_eq!(walk.stops, vec![WidgetId::from("list")]);
        assert!(walk.is_stop(&WidgetId::from("list")));
        assert!(!walk.is_stop(&WidgetId::from("text")));
        assert!(walk.contains(&WidgetId::from("text")));
        assert!(!walk.contains(&WidgetId::from("inner")));
        assert!(!walk.contains(&WidgetId::from("deep")));
    }

    #[test]
    fn dangling_children_are_skipped() {
        let tree = template_tree([
            TemplateNode::new("container", "Container1", "CONTAINER_WIDGET")
                .with_children(["ghost", "text"]),
            TemplateNode::new("text", "Text1", "TEXT_WIDGET"),
        ]);

        let walk = walk_template(&tree, &WidgetId::from("container"), is_list);
        assert_eq!(ids(&walk), vec!["container", "text"]);
        assert_eq!(walk.skipped, vec![WidgetId::from("ghost")]);
    }

    #[test]
    fn cycles_do_not_loop() {
        let tree = template_tree([
            TemplateNode::new("a", "A", "CONTAINER_WIDGET").with_children(["b"]),
            TemplateNode::new("b", "B", "CANVAS_WIDGET").with_children(["a"]),
        ]);

        let walk = walk_template(&tree, &WidgetId::from("a"), is_list);
        assert_eq!(ids(&walk), vec!["a", "b"]);
    }

    #[test]
    fn missing_root_yields_empty_walk() {
        let tree = TemplateTree::new();
        let walk = walk_template(&tree, &WidgetId::from("nope"), is_list);
        assert!(walk.is_empty());
        assert_eq!(walk.root(), None);
    }
}
