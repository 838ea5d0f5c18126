use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::json;

use super::arrange::{Arrangement, Distribution};
use super::constraint::{Axis, AxisConstraint, BoundConflict, Sizing};
use crate::error::{LayoutError, Result};
use crate::geometry::{Padding, Rect, Size, clamp_extent};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::LayoutMetrics;
use crate::widget::{Widget, WidgetRef, same_widget, widget_ref};

const TREE_TARGET: &str = "boxlayout::tree";

/// Handle to a node stored in a [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the layout tree: constraints, arrangement policy and children.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    name: String,
    arrangement: Arrangement,
    spacing: u16,
    padding: Padding,
    width: AxisConstraint,
    height: AxisConstraint,
    visible: bool,
    z_index: i32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    widgets: Vec<WidgetRef>,
    rect: Rect,
}

impl LayoutNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arrangement: Arrangement::default(),
            spacing: 0,
            padding: Padding::NONE,
            width: AxisConstraint::default(),
            height: AxisConstraint::default(),
            visible: true,
            z_index: 0,
            parent: None,
            children: Vec::new(),
            widgets: Vec::new(),
            rect: Rect::ZERO,
        }
    }

    pub fn row(name: impl Into<String>) -> Self {
        Self::new(name).with_arrangement(Arrangement::Row)
    }

    pub fn column(name: impl Into<String>) -> Self {
        Self::new(name).with_arrangement(Arrangement::Column)
    }

    pub fn grid(name: impl Into<String>) -> Self {
        Self::new(name).with_arrangement(Arrangement::Grid)
    }

    pub fn with_arrangement(mut self, arrangement: Arrangement) -> Self {
        self.arrangement = arrangement;
        self
    }

    pub fn with_spacing(mut self, spacing: u16) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding.sanitized();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    pub fn set_arrangement(&mut self, arrangement: Arrangement) {
        self.arrangement = arrangement;
    }

    pub fn spacing(&self) -> u16 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: u16) {
        self.spacing = spacing;
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding.sanitized();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn widgets(&self) -> &[WidgetRef] {
        &self.widgets
    }

    /// Last rectangle written by a resolve pass.
    pub fn resolved_rect(&self) -> Rect {
        self.rect
    }

    pub fn constraint(&self, axis: Axis) -> &AxisConstraint {
        match axis {
            Axis::Width => &self.width,
            Axis::Height => &self.height,
        }
    }

    /// Constraints plus spacing, as the resolver consumes them.
    pub fn sizing(&self) -> Sizing {
        Sizing {
            width: self.width,
            height: self.height,
            spacing: f32::from(self.spacing),
        }
    }

    pub fn fixed_width(&self) -> Option<f32> {
        self.width.fixed()
    }

    pub fn fixed_height(&self) -> Option<f32> {
        self.height.fixed()
    }

    pub fn minimum_width(&self) -> Option<f32> {
        self.width.min()
    }

    pub fn minimum_height(&self) -> Option<f32> {
        self.height.min()
    }

    pub fn maximum_width(&self) -> Option<f32> {
        self.width.max()
    }

    pub fn maximum_height(&self) -> Option<f32> {
        self.height.max()
    }

    /// Pin the width; clears the width bounds.
    pub fn set_fixed_width(&mut self, width: f32) -> Result<()> {
        self.set_fixed(Axis::Width, width)
    }

    /// Pin the height; clears the height bounds.
    pub fn set_fixed_height(&mut self, height: f32) -> Result<()> {
        self.set_fixed(Axis::Height, height)
    }

    pub fn clear_fixed_width(&mut self) {
        self.width.clear_fixed();
    }

    pub fn clear_fixed_height(&mut self) {
        self.height.clear_fixed();
    }

    /// Set a width floor; clears the fixed width. Fails if above the maximum.
    pub fn set_minimum_width(&mut self, width: f32) -> Result<()> {
        self.set_bound(Axis::Width, width, AxisConstraint::set_min)
    }

    /// Set a width ceiling; clears the fixed width. Fails if below the minimum.
    pub fn set_maximum_width(&mut self, width: f32) -> Result<()> {
        self.set_bound(Axis::Width, width, AxisConstraint::set_max)
    }

    pub fn set_minimum_height(&mut self, height: f32) -> Result<()> {
        self.set_bound(Axis::Height, height, AxisConstraint::set_min)
    }

    pub fn set_maximum_height(&mut self, height: f32) -> Result<()> {
        self.set_bound(Axis::Height, height, AxisConstraint::set_max)
    }

    fn set_fixed(&mut self, axis: Axis, value: f32) -> Result<()> {
        self.validate_extent(value)?;
        self.axis_mut(axis).set_fixed(value);
        Ok(())
    }

    fn set_bound(
        &mut self,
        axis: Axis,
        value: f32,
        apply: fn(&mut AxisConstraint, f32) -> std::result::Result<(), BoundConflict>,
    ) -> Result<()> {
        self.validate_extent(value)?;
        apply(self.axis_mut(axis), value).map_err(|conflict| LayoutError::ConstraintConflict {
            node: self.name.clone(),
            axis,
            requested: value,
            existing: conflict.existing(),
        })
    }

    fn validate_extent(&self, value: f32) -> Result<()> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(LayoutError::InvalidExtent {
                node: self.name.clone(),
                value,
            })
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisConstraint {
        match axis {
            Axis::Width => &mut self.width,
            Axis::Height => &mut self.height,
        }
    }
}

impl Widget for LayoutNode {
    fn bounds(&self) -> Rect {
        self.rect
    }

    /// Store `bounds` with both extents passed through the constraint resolver.
    fn set_bounds(&mut self, bounds: Rect) {
        let sizing = self.sizing();
        self.rect = Rect::new(
            bounds.x,
            bounds.y,
            sizing.sanitize(Axis::Width, bounds.width),
            sizing.sanitize(Axis::Height, bounds.height),
        );
    }

    /// Declared floor only; see [`LayoutTree::min_size`] for the aggregated value.
    fn min_size(&self) -> Size {
        Size::new(self.width.floor(), self.height.floor())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }
}

/// Arena owning every node; parents hold child handles, children a parent handle.
#[derive(Debug, Default)]
pub struct LayoutTree {
    nodes: Vec<Option<LayoutNode>>,
    free: Vec<usize>,
    logger: Option<Logger>,
    metrics: LayoutMetrics,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn set_logger(&mut self, logger: Option<Logger>) {
        self.logger = logger;
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub(crate) fn metrics_mut(&mut self) -> &mut LayoutMetrics {
        &mut self.metrics
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a detached node and return its handle.
    pub fn insert(&mut self, mut node: LayoutNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node(&self, id: NodeId) -> Result<&LayoutNode> {
        self.get(id).ok_or(LayoutError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut LayoutNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(LayoutError::NodeNotFound(id))
    }

    /// Apply constraint changes to a node, logging any rejected configuration.
    pub fn configure<F>(&mut self, id: NodeId, apply: F) -> Result<()>
    where
        F: FnOnce(&mut LayoutNode) -> Result<()>,
    {
        let node = self.node_mut(id)?;
        let outcome = apply(node);
        if let Err(err @ LayoutError::ConstraintConflict { .. }) = &outcome {
            self.log(
                LogLevel::Warn,
                "constraint_conflict",
                [
                    json_kv("node", json!(id.0)),
                    json_kv("error", json!(err.to_string())),
                ],
            );
        }
        outcome
    }

    /// Last resolved rectangle of `id`.
    pub fn bounds(&self, id: NodeId) -> Result<Rect> {
        Ok(self.node(id)?.rect)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Append `widget` to `parent`'s widget list. The tree does not own it.
    pub fn add_widget<W: Widget + 'static>(
        &mut self,
        parent: NodeId,
        widget: &Rc<RefCell<W>>,
    ) -> Result<()> {
        self.node_mut(parent)?.widgets.push(widget_ref(widget));
        Ok(())
    }

    /// Unbind the first handle pointing at `widget`. Absent widgets are a no-op.
    pub fn remove_widget<W: Widget + 'static>(
        &mut self,
        parent: NodeId,
        widget: &Rc<RefCell<W>>,
    ) -> Result<bool> {
        let node = self.node_mut(parent)?;
        match node.widgets.iter().position(|h| same_widget(h, widget)) {
            Some(pos) => {
                node.widgets.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop handles whose widget no longer exists; returns how many were dropped.
    pub fn prune_widgets(&mut self, parent: NodeId) -> Result<usize> {
        let node = self.node_mut(parent)?;
        let before = node.widgets.len();
        node.widgets.retain(|handle| handle.strong_count() > 0);
        Ok(before - node.widgets.len())
    }

    /// Attach a detached `child` under `parent` and resolve it once in place.
    pub fn add_layout(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        if let Some(existing) = self.node(child)?.parent {
            return Err(LayoutError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LayoutError::CycleDetected { parent, child });
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.log(
            LogLevel::Debug,
            "layout_attached",
            [json_kv("parent", json!(parent.0)), json_kv("child", json!(child.0))],
        );

        if self.node(child)?.visible {
            self.metrics.record_pass();
            self.resolve_contents(child, 0.0);
        }
        Ok(())
    }

    /// Detach the first occurrence of `child` from `parent`.
    ///
    /// Returns `false` without error when `child` is not among the children.
    pub fn remove_layout(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let node = self.node_mut(parent)?;
        let Some(pos) = node.children.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        node.children.remove(pos);
        if let Some(detached) = self.nodes.get_mut(child.0).and_then(Option::as_mut) {
            detached.parent = None;
        }
        self.log(
            LogLevel::Debug,
            "layout_detached",
            [json_kv("parent", json!(parent.0)), json_kv("child", json!(child.0))],
        );
        Ok(true)
    }

    /// Free a detached subtree. Widgets it referenced are left untouched.
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            return Err(LayoutError::AlreadyAttached { child: id, parent });
        }
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                pending.extend(node.children);
                self.free.push(current.0);
            }
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Depth-first, pre-order walk from `root`. Returning `false` from `visit`
    /// skips that node's subtree.
    pub fn walk<F>(&self, root: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(NodeId, &LayoutNode, usize) -> bool,
    {
        self.node(root)?;
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if visit(id, node, depth) {
                stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
            }
        }
        Ok(())
    }

    /// Bind `id` to `rect` and resolve its whole subtree.
    pub fn resolve(&mut self, id: NodeId, rect: Rect) -> Result<()> {
        self.resolve_framed(id, rect, 0.0)
    }

    /// As [`resolve`](Self::resolve), with a title band of `title_bar` pixels
    /// removed from the top of the root's content rectangle.
    pub fn resolve_framed(&mut self, id: NodeId, rect: Rect, title_bar: f32) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.visible {
            return Ok(());
        }
        node.rect = Rect::new(
            rect.x,
            rect.y,
            clamp_extent(rect.width),
            clamp_extent(rect.height),
        );
        self.metrics.record_pass();
        self.resolve_contents(id, clamp_extent(title_bar));
        Ok(())
    }

    fn resolve_contents(&mut self, id: NodeId, title_bar: f32) {
        let Some(node) = self.get(id) else { return };
        let arrangement = node.arrangement;
        let spacing = f32::from(node.spacing);
        let content = node.rect.inset(node.padding).below_top(title_bar);
        let children = node.children.clone();
        let widgets = node.widgets.clone();
        self.metrics.record_node();

        self.place_layouts(id, arrangement, spacing, content, &children);
        self.place_widgets(id, arrangement, spacing, content, &widgets);
    }

    fn place_layouts(
        &mut self,
        parent: NodeId,
        arrangement: Arrangement,
        spacing: f32,
        content: Rect,
        children: &[NodeId],
    ) {
        let visible: Vec<(NodeId, Sizing)> = children
            .iter()
            .filter_map(|id| self.get(*id).map(|node| (*id, node)))
            .filter(|(_, node)| node.visible)
            .map(|(id, node)| (id, node.sizing()))
            .collect();
        if visible.is_empty() {
            return;
        }

        let sizings: Vec<Sizing> = visible.iter().map(|(_, s)| *s).collect();
        let plan = Distribution::plan(arrangement, content, spacing, &sizings);
        let mut previous = None;

        for (index, (child, sizing)) in visible.iter().enumerate() {
            let placement = plan.place(index, sizing, previous);
            if placement.clamped {
                self.note_clamp(*child, placement.rect);
            }
            if let Some(node) = self.nodes.get_mut(child.0).and_then(Option::as_mut) {
                node.rect = placement.rect;
            }
            self.resolve_contents(*child, 0.0);
            self.pull_parent(parent, *child, spacing);
            previous = self.get(*child).map(|node| node.rect);
        }
    }

    fn place_widgets(
        &mut self,
        parent: NodeId,
        arrangement: Arrangement,
        spacing: f32,
        content: Rect,
        widgets: &[WidgetRef],
    ) {
        let live: Vec<(Rc<RefCell<dyn Widget>>, Sizing)> = widgets
            .iter()
            .filter_map(|handle| handle.upgrade())
            .filter(|widget| widget.borrow().is_visible())
            .map(|widget| {
                let min = widget.borrow().min_size();
                (widget, Sizing::with_floor(min.width, min.height))
            })
            .collect();
        if live.is_empty() {
            return;
        }

        let sizings: Vec<Sizing> = live.iter().map(|(_, s)| *s).collect();
        let plan = Distribution::plan(arrangement, content, spacing, &sizings);
        let mut previous = None;

        for (index, (widget, sizing)) in live.iter().enumerate() {
            let placement = plan.place(index, sizing, previous);
            if placement.clamped {
                self.note_clamp(parent, placement.rect);
            }
            widget.borrow_mut().set_bounds(placement.rect);
            self.metrics.record_widget();
            previous = Some(widget.borrow().bounds());
        }
    }

    /// Grow `parent` so a fixed-size `child` plus its own children fit.
    fn pull_parent(&mut self, parent: NodeId, child: NodeId, spacing: f32) {
        let Some(node) = self.get(child) else { return };
        let child_spacing = f32::from(node.spacing);
        let (mut grand_width, mut grand_height) = (0.0_f32, 0.0_f32);
        for grandchild in node.children.iter().filter_map(|id| self.get(*id)) {
            if grandchild.visible {
                grand_width += grandchild.rect.width;
                grand_height += grandchild.rect.height;
            }
        }
        let width_pull = node
            .width
            .is_fixed()
            .then(|| node.rect.width + spacing + child_spacing + grand_width);
        let height_pull = node
            .height
            .is_fixed()
            .then(|| node.rect.height + spacing + child_spacing + grand_height);

        let mut pulled = false;
        if let Some(target) = width_pull {
            pulled |= self.grow(parent, Axis::Width, target);
        }
        if let Some(target) = height_pull {
            pulled |= self.grow(parent, Axis::Height, target);
        }
        if pulled {
            self.metrics.record_size_pull();
        }
    }

    fn grow(&mut self, id: NodeId, axis: Axis, target: f32) -> bool {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::as_mut) else {
            return false;
        };
        let constraint = *node.constraint(axis);
        if constraint.is_fixed() {
            return false;
        }
        let ceiling = constraint
            .max()
            .map(|max| clamp_extent(max - f32::from(node.spacing)))
            .unwrap_or(f32::INFINITY);
        let target = target.min(ceiling);
        let extent = match axis {
            Axis::Width => &mut node.rect.width,
            Axis::Height => &mut node.rect.height,
        };
        if target > *extent {
            *extent = target;
            true
        } else {
            false
        }
    }

    fn note_clamp(&mut self, id: NodeId, rect: Rect) {
        self.metrics.record_clamp();
        let name = self.get(id).map(|n| n.name.clone()).unwrap_or_default();
        self.log(
            LogLevel::Trace,
            "extent_clamped",
            [
                json_kv("node", json!(name)),
                json_kv("x", json!(rect.x)),
                json_kv("y", json!(rect.y)),
                json_kv("width", json!(rect.width)),
                json_kv("height", json!(rect.height)),
            ],
        );
    }

    /// Smallest size `id`'s content can be compressed into. Recomputed on
    /// every call; never enforced by the engine itself.
    pub fn min_size(&self, id: NodeId) -> Result<Size> {
        self.node(id)?;
        Ok(self.aggregate_min(id))
    }

    /// Minimum size of a window-bound root whose title band is `title_bar` tall.
    pub fn min_size_framed(&self, id: NodeId, title_bar: f32) -> Result<Size> {
        let min = self.min_size(id)?;
        if !self.node(id)?.visible {
            return Ok(min);
        }
        Ok(Size::new(min.width, min.height + clamp_extent(title_bar)))
    }

    fn aggregate_min(&self, id: NodeId) -> Size {
        let Some(node) = self.get(id) else {
            return Size::ZERO;
        };
        if !node.visible {
            return Size::ZERO;
        }
        let spacing = f32::from(node.spacing);

        let layouts: Vec<Size> = node
            .children
            .iter()
            .filter(|child| self.get(**child).is_some_and(|c| c.visible))
            .map(|child| self.aggregate_min(*child))
            .collect();
        let widgets: Vec<Size> = node
            .widgets
            .iter()
            .filter_map(|handle| handle.upgrade())
            .filter(|widget| widget.borrow().is_visible())
            .map(|widget| widget.borrow().min_size())
            .collect();

        let content = node
            .arrangement
            .aggregate_min(spacing, &layouts)
            .max(node.arrangement.aggregate_min(spacing, &widgets));
        let inset = node.padding.total();

        Size::new(
            floor_for(&node.width, content.width + inset.width),
            floor_for(&node.height, content.height + inset.height),
        )
    }

    fn log<const N: usize>(
        &self,
        level: LogLevel,
        message: &str,
        fields: [(String, serde_json::Value); N],
    ) {
        if let Some(logger) = &self.logger {
            if logger.enabled(level) {
                let _ = logger.log_event(event_with_fields(level, TREE_TARGET, message, fields));
            }
        }
    }
}

/// Fixed overrides the content; otherwise min is a floor and max a ceiling.
fn floor_for(constraint: &AxisConstraint, content: f32) -> f32 {
    if let Some(fixed) = constraint.fixed() {
        return fixed;
    }
    let floored = content.max(constraint.min().unwrap_or(0.0));
    match constraint.max() {
        Some(max) => floored.min(max),
        None => floored,
    }
}
