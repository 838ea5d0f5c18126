//! Box-layout engine.
//!
//! [`LayoutTree`] owns every [`LayoutNode`]; `resolve` turns constraints into
//! rectangles depth-first, left to right. Placement math lives in `arrange`
//! and `grid`, the per-axis constraint resolver in `constraint`.

pub mod arrange;
pub mod constraint;
mod core;
pub mod grid;

pub use arrange::{Arrangement, Distribution, Placement};
pub use constraint::{Axis, AxisConstraint, Sizing};
pub use self::core::{LayoutNode, LayoutTree, NodeId};
pub use grid::GridDims;
