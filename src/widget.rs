//! Capability interface between the layout engine and leaf content.
//!
//! The engine never draws. It only asks a widget for its minimum content size
//! and visibility, and hands it a rectangle. Widgets are owned by application
//! code; the tree keeps [`WidgetRef`] handles that do not extend their life.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::geometry::{Rect, Size};
use crate::width::display_width;

/// Anything that can report a minimum size and accept a rectangle.
pub trait Widget {
    fn bounds(&self) -> Rect;

    fn set_bounds(&mut self, bounds: Rect);

    fn min_size(&self) -> Size;

    fn is_visible(&self) -> bool {
        true
    }

    /// Draw-order key; higher values paint later.
    fn z_index(&self) -> i32 {
        0
    }
}

/// Non-owning handle to an application-owned widget.
pub type WidgetRef = Weak<RefCell<dyn Widget>>;

/// Downgrade an application-owned widget into a tree handle.
pub fn widget_ref<W: Widget + 'static>(widget: &Rc<RefCell<W>>) -> WidgetRef {
    let weak: Weak<RefCell<W>> = Rc::downgrade(widget);
    weak
}

/// Identity comparison between a handle and an owned widget.
pub fn same_widget<W: Widget + 'static>(handle: &WidgetRef, widget: &Rc<RefCell<W>>) -> bool {
    std::ptr::addr_eq(handle.as_ptr(), Rc::as_ptr(widget))
}

/// Injected text-extent capability.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> Size;
}

/// Measures text as a run of equally wide glyphs.
///
/// Glyph advance is `font_size * advance_ratio`; line height is
/// `font_size * line_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub advance_ratio: f32,
    pub line_ratio: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            line_ratio: 1.0,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, font_size: f32) -> Size {
        let columns = text.lines().map(display_width).max().unwrap_or(0);
        let lines = text.lines().count().max(1);
        Size::new(
            columns as f32 * font_size * self.advance_ratio,
            lines as f32 * font_size * self.line_ratio,
        )
    }
}

/// Leaf widget sized from its text.
#[derive(Debug, Clone)]
pub struct TextLabel {
    text: String,
    font_size: f32,
    inset: Size,
    measured: Size,
    bounds: Rect,
    visible: bool,
    z_index: i32,
}

impl TextLabel {
    pub const DEFAULT_FONT_SIZE: f32 = 14.0;

    pub fn new(text: impl Into<String>, measure: &dyn TextMeasure) -> Self {
        let mut label = Self {
            text: text.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            inset: Size::new(10.0, 0.0),
            measured: Size::ZERO,
            bounds: Rect::ZERO,
            visible: true,
            z_index: 0,
        };
        label.remeasure(measure);
        label
    }

    pub fn with_font_size(mut self, font_size: f32, measure: &dyn TextMeasure) -> Self {
        self.font_size = font_size;
        self.remeasure(measure);
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>, measure: &dyn TextMeasure) {
        self.text = text.into();
        self.remeasure(measure);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn remeasure(&mut self, measure: &dyn TextMeasure) {
        self.measured = measure.measure(&self.text, self.font_size);
    }
}

impl Widget for TextLabel {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    fn min_size(&self) -> Size {
        Size::new(
            self.measured.width + 2.0 * self.inset.width,
            self.measured.height + 2.0 * self.inset.height,
        )
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }
}
