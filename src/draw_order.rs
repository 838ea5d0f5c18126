//! Explicit draw-order list handed to the rendering pass.
//!
//! Built fresh from a resolved tree instead of a process-wide widget
//! registry. Entries are collected depth-first (a node before its widgets,
//! parents before children) and then stable-sorted by z-index, so equal
//! z-indices keep tree order.

use blake3::Hash;

use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::{LayoutTree, NodeId};
use crate::widget::{Widget, WidgetRef};

#[derive(Debug, Clone)]
pub enum DrawTarget {
    Node(NodeId),
    Widget(WidgetRef),
}

#[derive(Debug, Clone)]
pub struct DrawEntry {
    pub target: DrawTarget,
    pub rect: Rect,
    pub z_index: i32,
    pub depth: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    entries: Vec<DrawEntry>,
}

impl DrawList {
    /// Collect every visible node and live, visible widget under `root`.
    pub fn collect(tree: &LayoutTree, root: NodeId) -> Result<Self> {
        let mut entries = Vec::new();
        tree.walk(root, |id, node, depth| {
            if !node.is_visible() {
                return false;
            }
            entries.push(DrawEntry {
                target: DrawTarget::Node(id),
                rect: node.resolved_rect(),
                z_index: node.z_index(),
                depth,
            });
            for handle in node.widgets() {
                let Some(widget) = handle.upgrade() else {
                    continue;
                };
                let widget = widget.borrow();
                if widget.is_visible() {
                    entries.push(DrawEntry {
                        target: DrawTarget::Widget(handle.clone()),
                        rect: widget.bounds(),
                        z_index: widget.z_index(),
                        depth: depth + 1,
                    });
                }
            }
            true
        })?;
        entries.sort_by_key(|entry| entry.z_index);
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DrawEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of every entry's identity, z-index and rectangle, in draw order.
    pub fn fingerprint(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        for entry in &self.entries {
            match &entry.target {
                DrawTarget::Node(id) => {
                    hasher.update(&[0]);
                    hasher.update(&(id.index() as u64).to_le_bytes());
                }
                DrawTarget::Widget(handle) => {
                    hasher.update(&[1]);
                    let addr = handle.as_ptr() as *const () as usize;
                    hasher.update(&(addr as u64).to_le_bytes());
                }
            }
            hasher.update(&entry.z_index.to_le_bytes());
            for value in [entry.rect.x, entry.rect.y, entry.rect.width, entry.rect.height] {
                hasher.update(&value.to_bits().to_le_bytes());
            }
        }
        hasher.finalize()
    }
}

/// Remembers the last frame's fingerprint so unchanged frames can be skipped.
#[derive(Debug, Default)]
pub struct FrameTracker {
    last: Option<Hash>,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `list`; returns `true` when its geometry differs from the last one.
    pub fn observe(&mut self, list: &DrawList) -> bool {
        let hash = list.fingerprint();
        let changed = self.last.map(|h| h != hash).unwrap_or(true);
        self.last = Some(hash);
        changed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutNode;
    use crate::widget::{MonospaceMeasure, TextLabel};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn collect_orders_by_z_then_tree_order() {
        let measure = MonospaceMeasure::default();
        let mut tree = LayoutTree::new();
        let root = tree.insert(LayoutNode::column("root"));
        let menu = tree.insert(LayoutNode::row("menu"));
        tree.add_layout(root, menu).unwrap();
        let body = tree.insert(LayoutNode::row("body"));
        tree.add_layout(root, body).unwrap();
        let popup = Rc::new(RefCell::new(TextLabel::new("File", &measure).with_z_index(10_000)));
        tree.add_widget(menu, &popup).unwrap();
        tree.resolve(root, Rect::new(0.0, 0.0, 200.0, 100.0)).unwrap();

        let list = DrawList::collect(&tree, root).unwrap();
        let order: Vec<_> = list
            .entries()
            .iter()
            .map(|e| match &e.target {
                DrawTarget::Node(id) => tree.node(*id).unwrap().name().to_string(),
                DrawTarget::Widget(_) => "popup".to_string(),
            })
            .collect();
        assert_eq!(order, vec!["root", "menu", "body", "popup"]);
    }

    #[test]
    fn hidden_subtrees_are_not_drawn() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(LayoutNode::column("root"));
        let hidden = tree.insert(LayoutNode::column("hidden"));
        tree.add_layout(root, hidden).unwrap();
        let inner = tree.insert(LayoutNode::new("inner"));
        tree.add_layout(hidden, inner).unwrap();
        tree.node_mut(hidden).unwrap().set_visible(false);

        let list = DrawList::collect(&tree, root).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn tracker_detects_geometry_changes() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(LayoutNode::row("root"));
        let child = tree.insert(LayoutNode::new("child"));
        tree.add_layout(root, child).unwrap();
        let mut tracker = FrameTracker::new();

        tree.resolve(root, Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        assert!(tracker.observe(&DrawList::collect(&tree, root).unwrap()));
        tree.resolve(root, Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        assert!(!tracker.observe(&DrawList::collect(&tree, root).unwrap()));
        tree.resolve(root, Rect::new(0.0, 0.0, 120.0, 50.0)).unwrap();
        assert!(tracker.observe(&DrawList::collect(&tree, root).unwrap()));
    }
}
