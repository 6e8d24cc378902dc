// Error types for scene transforms

use std::error::Error;
use std::fmt;

use crate::scene::NodeId;

/// Everything that can go wrong while querying or restructuring a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformError {
    /// Rotation or scale pulled out of a composed matrix was not finite,
    /// usually because some ancestor has a zero scale.
    MatrixDecomposition,
    /// A matrix with a zero determinant was asked to invert.
    SingularTransform,
    /// `parent` is `node` itself or one of its descendants.
    HierarchyCycle { node: NodeId, parent: NodeId },
    /// The handle does not refer to a live node.
    NodeNotFound(NodeId),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::MatrixDecomposition => {
                write!(f, "Failed to decompose matrix: rotation or scale is not finite")
            }
            TransformError::SingularTransform => {
                write!(f, "Cannot invert a singular transform (zero determinant)")
            }
            TransformError::HierarchyCycle { node, parent } => {
                write!(f, "Cannot parent {node} to {parent}: it would become its own ancestor")
            }
            TransformError::NodeNotFound(id) => write!(f, "No node with handle {id}"),
        }
    }
}

impl Error for TransformError {}

pub type Result<T> = std::result::Result<T, TransformError>;
