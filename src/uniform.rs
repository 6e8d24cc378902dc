// GPU-facing packing of a node's world matrices

use glam::Mat4;

use crate::error::Result;
use crate::scene::{NodeId, Scene};

/// Per-object uniform block: the model matrix and the matching normal matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

impl ModelUniform {
    /// Fails with `SingularTransform` when the node's world matrix cannot be
    /// inverted, since no normal matrix exists then.
    pub fn from_node(scene: &Scene, id: NodeId) -> Result<Self> {
        let model = scene.local_to_world_matrix(id)?;
        let normal = scene.world_to_local_matrix(id)?.transpose();
        Ok(Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        })
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn normal_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::math::{AxisAngle, Transform};
    use glam::Vec3;

    #[test]
    fn packs_world_matrices() {
        let mut scene = Scene::new();
        let parent = scene.add_node("parent", Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));
        let child = scene.add_node(
            "child",
            Transform::new(Vec3::X, AxisAngle::new(Vec3::Z, 45.0), Vec3::new(1.0, 3.0, 1.0)),
        );
        scene.set_parent(child, Some(parent), 0).unwrap();

        let uniform = ModelUniform::from_node(&scene, child).unwrap();
        let model = scene.local_to_world_matrix(child).unwrap();
        assert!(uniform.model_matrix().abs_diff_eq(model, 1e-6));
        assert!(uniform
            .normal_matrix()
            .abs_diff_eq(model.inverse().transpose(), 1e-5));
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 128);
    }

    #[test]
    fn singular_node_has_no_uniform() {
        let mut scene = Scene::new();
        let id = scene.add_node("flat", Transform::ZEROED);
        assert_eq!(
            ModelUniform::from_node(&scene, id),
            Err(TransformError::SingularTransform)
        );
    }
}
