//! Box-layout engine: turns a tree of size-constrained layout nodes into
//! concrete rectangles for every node and every leaf widget it holds.
//!
//! Nothing here draws. A rendering collaborator walks the resolved tree (or
//! the [`DrawList`] built from it) and paints each rectangle; text extents
//! come in through the [`TextMeasure`] capability.

pub mod draw_order;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod snapshot;
pub mod widget;
pub mod width;

pub use draw_order::{DrawEntry, DrawList, DrawTarget, FrameTracker};
pub use engine::{EngineConfig, FrameReport, LayoutEngine};
pub use error::{LayoutError, Result};
pub use geometry::{Padding, Rect, Size};
pub use host::{HostFrame, TitleBar};
pub use layout::{
    Arrangement, Axis, AxisConstraint, GridDims, LayoutNode, LayoutTree, NodeId, Sizing,
};
pub use logging::{LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use snapshot::NodeSnapshot;
pub use widget::{MonospaceMeasure, TextLabel, TextMeasure, Widget, WidgetRef};
pub use width::display_width;
