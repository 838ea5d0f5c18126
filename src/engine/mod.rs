//! Per-frame driver binding a layout tree to a host window.
//!
//! The host calls [`LayoutEngine::frame`] once per frame (or on any resize or
//! content change). Each call resolves the whole tree against the current
//! client area, rebuilds the draw list and reports whether the geometry moved.

use serde_json::json;

use crate::draw_order::{DrawList, FrameTracker};
use crate::error::Result;
use crate::geometry::{Padding, Rect, Size};
use crate::host::HostFrame;
use crate::layout::{Arrangement, LayoutNode, LayoutTree, NodeId};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::widget::{MonospaceMeasure, TextMeasure};

const ENGINE_TARGET: &str = "boxlayout::engine";

/// Configuration knobs for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Spacing given to nodes created through the engine.
    pub default_spacing: u16,
    /// Inner padding given to nodes created through the engine.
    pub default_padding: Padding,
    /// Height of the root window's title band. Zero disables it.
    pub title_bar_height: f32,
    /// Optional structured logger shared with the tree.
    pub logger: Option<Logger>,
    /// Frames between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: u64,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_spacing: 10,
            default_padding: Padding::uniform(5.0),
            title_bar_height: 25.0,
            logger: None,
            metrics_interval: 0,
            metrics_target: "boxlayout::metrics".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_spacing(mut self, spacing: u16) -> Self {
        self.default_spacing = spacing;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.default_padding = padding;
        self
    }

    pub fn with_title_bar_height(mut self, height: f32) -> Self {
        self.title_bar_height = height;
        self
    }

    pub fn with_metrics_interval(mut self, frames: u64) -> Self {
        self.metrics_interval = frames;
        self
    }
}

/// Outcome of one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub draw_list: DrawList,
    /// `false` when every rectangle matches the previous frame.
    pub changed: bool,
}

pub struct LayoutEngine {
    tree: LayoutTree,
    root: NodeId,
    host: HostFrame,
    measure: Box<dyn TextMeasure>,
    config: EngineConfig,
    tracker: FrameTracker,
    frames: u64,
}

impl LayoutEngine {
    /// Create an engine whose root node is named after the window title.
    pub fn new(title: &str, arrangement: Arrangement, client: Rect, config: EngineConfig) -> Self {
        let mut tree = LayoutTree::new();
        tree.set_logger(config.logger.clone());
        let root = tree.insert(
            LayoutNode::new(format!("{title}_layout"))
                .with_arrangement(arrangement)
                .with_spacing(config.default_spacing)
                .with_padding(config.default_padding),
        );
        let mut host = HostFrame::new(client);
        if config.title_bar_height > 0.0 {
            host = host.with_title_bar(config.title_bar_height, title);
        }

        Self {
            tree,
            root,
            host,
            measure: Box::new(MonospaceMeasure::default()),
            config,
            tracker: FrameTracker::new(),
            frames: 0,
        }
    }

    pub fn with_measure<M>(mut self, measure: M) -> Self
    where
        M: TextMeasure + 'static,
    {
        self.measure = Box::new(measure);
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    pub fn host(&self) -> &HostFrame {
        &self.host
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Insert a detached node carrying the configured spacing and padding.
    pub fn create_node(&mut self, name: impl Into<String>, arrangement: Arrangement) -> NodeId {
        self.tree.insert(
            LayoutNode::new(name)
                .with_arrangement(arrangement)
                .with_spacing(self.config.default_spacing)
                .with_padding(self.config.default_padding),
        )
    }

    /// Host-driven client area change (e.g. the OS resized the window).
    pub fn set_client(&mut self, client: Rect) {
        self.host.client = client;
    }

    /// Interactive resize request, clamped to the content's minimum size.
    pub fn request_resize(&mut self, requested: Size) -> Result<Size> {
        let min = self.min_size()?;
        let applied = self.host.resize(requested, min);
        if applied != requested {
            self.log(
                LogLevel::Debug,
                "resize_clamped",
                [
                    json_kv("requested_width", json!(requested.width)),
                    json_kv("requested_height", json!(requested.height)),
                    json_kv("width", json!(applied.width)),
                    json_kv("height", json!(applied.height)),
                ],
            );
        }
        Ok(applied)
    }

    /// Minimum window size for the current tree.
    pub fn min_size(&self) -> Result<Size> {
        self.host
            .min_size(&self.tree, self.root, self.measure.as_ref())
    }

    /// Resolve the tree against the host and rebuild the draw list.
    pub fn frame(&mut self) -> Result<FrameReport> {
        self.host.resolve(&mut self.tree, self.root)?;
        let draw_list = DrawList::collect(&self.tree, self.root)?;
        let changed = self.tracker.observe(&draw_list);
        if changed {
            self.tree.metrics_mut().record_geometry_change();
        }
        self.frames = self.frames.saturating_add(1);

        self.log(
            LogLevel::Trace,
            "frame_resolved",
            [
                json_kv("frame", json!(self.frames)),
                json_kv("entries", json!(draw_list.len())),
                json_kv("changed", json!(changed)),
            ],
        );
        self.maybe_emit_metrics();

        Ok(FrameReport { draw_list, changed })
    }

    /// Force the next frame to report a change, e.g. after the surface was lost.
    pub fn invalidate(&mut self) {
        self.tracker.reset();
    }

    fn maybe_emit_metrics(&self) {
        if self.config.metrics_interval == 0 || self.frames % self.config.metrics_interval != 0 {
            return;
        }
        if let Some(logger) = self.config.logger.as_ref() {
            let snapshot = self.tree.metrics().snapshot();
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    fn log<const N: usize>(
        &self,
        level: LogLevel,
        message: &str,
        fields: [(String, serde_json::Value); N],
    ) {
        if let Some(logger) = self.config.logger.as_ref() {
            if logger.enabled(level) {
                let _ = logger.log_event(event_with_fields(level, ENGINE_TARGET, message, fields));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;

    #[test]
    fn frame_reports_changes_only_when_geometry_moves() {
        let mut engine = LayoutEngine::new(
            "Main",
            Arrangement::Column,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            EngineConfig::default(),
        );
        let child = engine.create_node("panel", Arrangement::Row);
        let root = engine.root();
        engine.tree_mut().add_layout(root, child).unwrap();

        assert!(engine.frame().unwrap().changed);
        assert!(!engine.frame().unwrap().changed);
        engine.set_client(Rect::new(0.0, 0.0, 500.0, 300.0));
        assert!(engine.frame().unwrap().changed);
        engine.invalidate();
        assert!(engine.frame().unwrap().changed);
    }

    #[test]
    fn root_content_sits_below_title_band() {
        let mut engine = LayoutEngine::new(
            "Main",
            Arrangement::Column,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            EngineConfig::default().with_spacing(0).with_padding(Padding::NONE),
        );
        let child = engine.create_node("panel", Arrangement::Row);
        let root = engine.root();
        engine.tree_mut().add_layout(root, child).unwrap();
        engine.frame().unwrap();

        assert_eq!(
            engine.tree().bounds(child).unwrap(),
            Rect::new(0.0, 25.0, 400.0, 275.0)
        );
    }

    #[test]
    fn resize_requests_are_clamped_to_content() {
        let mut engine = LayoutEngine::new(
            "Main",
            Arrangement::Column,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            EngineConfig::default().with_spacing(0).with_padding(Padding::NONE),
        );
        let root = engine.root();
        let panel = engine.create_node("panel", Arrangement::Row);
        engine
            .tree_mut()
            .configure(panel, |node| node.set_minimum_height(200.0))
            .unwrap();
        engine.tree_mut().add_layout(root, panel).unwrap();

        let applied = engine.request_resize(Size::new(10.0, 10.0)).unwrap();
        // title: 4 glyphs * 7 + 20 + 50 + 12; height: 200 + 25
        assert_eq!(applied, Size::new(110.0, 225.0));
        assert_eq!(engine.host().client.height, 225.0);
    }

    #[test]
    fn metrics_snapshots_follow_the_interval() {
        let sink = MemorySink::new();
        let config = EngineConfig::default()
            .with_logger(Logger::new(sink.clone()).with_min_level(LogLevel::Info))
            .with_metrics_interval(2);
        let mut engine =
            LayoutEngine::new("Main", Arrangement::Row, Rect::new(0.0, 0.0, 10.0, 10.0), config);
        for _ in 0..4 {
            engine.frame().unwrap();
        }
        let snapshots = sink
            .messages()
            .into_iter()
            .filter(|m| m == "layout_metrics")
            .count();
        assert_eq!(snapshots, 2);
    }
}
