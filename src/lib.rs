//! Hierarchical position/rotation/scale transforms for scene objects.
//!
//! A [`Scene`] owns [`TransformNode`]s addressed by [`NodeId`]. Each node
//! stores a local [`Transform`] relative to its parent; world-space pose and
//! matrices are recomposed from the parent chain on every query.

pub mod error;
pub mod math;
pub mod scene;
pub mod uniform;

pub use error::TransformError;
pub use math::{AxisAngle, Transform, ROTATION_EPSILON};
pub use scene::{Ancestors, NodeId, Scene, TransformNode};
pub use uniform::ModelUniform;
