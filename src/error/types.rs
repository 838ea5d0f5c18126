use thiserror::Error;

use crate::layout::{Axis, NodeId};
use crate::logging::LoggingError;

/// Unified result type for the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the layout engine.
///
/// Degenerate geometry is never reported here; it is clamped to zero inside
/// the resolver.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("constraint conflict on `{node}` ({axis}): {requested} conflicts with {existing}")]
    ConstraintConflict {
        node: String,
        axis: Axis,
        requested: f32,
        existing: f32,
    },
    #[error("invalid extent {value} on `{node}`: extents must be finite and non-negative")]
    InvalidExtent { node: String, value: f32 },
    #[error("layout node {0} not found")]
    NodeNotFound(NodeId),
    #[error("layout node {child} is already attached to {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("logging failure: {0}")]
    Logging(#[from] LoggingError),
    #[error("snapshot serialisation failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
