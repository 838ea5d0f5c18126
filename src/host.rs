//! Binding between a host window and the root of a layout tree.
//!
//! The host supplies the client rectangle and, optionally, a title band.
//! The band is the only chrome the layout ever accounts for: it shortens the
//! root's content rectangle and adds to the root's minimum height.

use crate::error::Result;
use crate::geometry::{Rect, Size, clamp_extent};
use crate::layout::{LayoutTree, NodeId};
use crate::widget::TextMeasure;

/// Font size used when measuring the window title.
pub const TITLE_FONT_SIZE: f32 = 14.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TitleBar {
    pub height: f32,
    pub title: String,
}

/// Client area of the window a root layout is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct HostFrame {
    pub client: Rect,
    pub title_bar: Option<TitleBar>,
}

impl HostFrame {
    pub fn new(client: Rect) -> Self {
        Self {
            client,
            title_bar: None,
        }
    }

    pub fn with_title_bar(mut self, height: f32, title: impl Into<String>) -> Self {
        self.title_bar = Some(TitleBar {
            height: clamp_extent(height),
            title: title.into(),
        });
        self
    }

    pub fn title_bar_height(&self) -> f32 {
        self.title_bar.as_ref().map_or(0.0, |bar| bar.height)
    }

    /// Resolve `root` against this frame's client area.
    pub fn resolve(&self, tree: &mut LayoutTree, root: NodeId) -> Result<()> {
        tree.resolve_framed(root, self.client, self.title_bar_height())
    }

    /// Narrowest width at which the title text and the window buttons fit.
    pub fn title_min_width(&self, measure: &dyn TextMeasure) -> f32 {
        match &self.title_bar {
            Some(bar) => {
                let text = measure.measure(&bar.title, TITLE_FONT_SIZE);
                text.width + 20.0 + bar.height * 2.0 + 12.0
            }
            None => 0.0,
        }
    }

    /// Minimum window size: the root's content needs plus title chrome.
    pub fn min_size(
        &self,
        tree: &LayoutTree,
        root: NodeId,
        measure: &dyn TextMeasure,
    ) -> Result<Size> {
        let content = tree.min_size_framed(root, self.title_bar_height())?;
        Ok(content.max(Size::new(self.title_min_width(measure), 0.0)))
    }

    /// Clamp an interactive resize so the window never drops below `min`.
    pub fn clamp_resize(requested: Size, min: Size) -> Size {
        Size::new(
            clamp_extent(requested.width).max(min.width),
            clamp_extent(requested.height).max(min.height),
        )
    }

    /// Apply a resize request to the client area, clamped against `min`.
    pub fn resize(&mut self, requested: Size, min: Size) -> Size {
        let size = Self::clamp_resize(requested, min);
        self.client.width = size.width;
        self.client.height = size.height;
        size
    }
}
