//! Serialisable dump of a resolved tree, for debugging layouts.

use serde::Serialize;

use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::{Arrangement, LayoutTree, NodeId};
use crate::widget::Widget;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub arrangement: Arrangement,
    pub depth: usize,
    pub visible: bool,
    pub rect: Rect,
    pub widget_rects: Vec<Rect>,
}

/// Every node under `root` in depth-first order, hidden ones included.
pub fn snapshot(tree: &LayoutTree, root: NodeId) -> Result<Vec<NodeSnapshot>> {
    let mut nodes = Vec::new();
    tree.walk(root, |id, node, depth| {
        let widget_rects = node
            .widgets()
            .iter()
            .filter_map(|handle| handle.upgrade())
            .map(|widget| widget.borrow().bounds())
            .collect();
        nodes.push(NodeSnapshot {
            id,
            name: node.name().to_string(),
            arrangement: node.arrangement(),
            depth,
            visible: node.is_visible(),
            rect: node.resolved_rect(),
            widget_rects,
        });
        true
    })?;
    Ok(nodes)
}

impl LayoutTree {
    pub fn snapshot(&self, root: NodeId) -> Result<Vec<NodeSnapshot>> {
        snapshot(self, root)
    }
}

pub fn to_json(nodes: &[NodeSnapshot]) -> Result<String> {
    Ok(serde_json::to_string_pretty(nodes)?)
}
