// Math utilities for scene transforms
//
// Matrices follow glam's column-major, column-vector convention. A local matrix
// is `T * R * S` (scale first, then rotate, then translate) and a world matrix
// is `parent_world * local`. Translation sits in `w_axis`, rotation and scale
// share the upper-left 3x3 block.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::error::{Result, TransformError};

/// Rotations at or below this angle (radians) are reported as identity.
pub const ROTATION_EPSILON: f32 = 0.001;

/// Rotation as seen by callers: a unit axis and an angle in degrees.
///
/// The identity rotation is `{ axis: (0, 0, 0), angle: 0 }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub axis: Vec3,
    pub angle: f32,
}

impl Default for AxisAngle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AxisAngle {
    pub const IDENTITY: Self = Self {
        axis: Vec3::ZERO,
        angle: 0.0,
    };

    pub fn new(axis: Vec3, angle: f32) -> Self {
        Self { axis, angle }
    }

    /// Build from XYZ Euler angles in degrees.
    pub fn from_euler_degrees(euler: Vec3) -> Self {
        let quat = Quat::from_euler(
            EulerRot::XYZ,
            euler.x.to_radians(),
            euler.y.to_radians(),
            euler.z.to_radians(),
        );
        Self::from_quat(quat)
    }

    /// XYZ Euler angles in degrees.
    pub fn to_euler_degrees(&self) -> Vec3 {
        let (x, y, z) = self.to_quat().to_euler(EulerRot::XYZ);
        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    /// Convert a quaternion, collapsing anything within [`ROTATION_EPSILON`]
    /// of zero to [`AxisAngle::IDENTITY`].
    ///
    /// The quaternion is flipped to `w >= 0` first so the angle always lands
    /// in `[0, 180]` degrees.
    pub fn from_quat(quat: Quat) -> Self {
        Self::from_quat_above(quat, ROTATION_EPSILON)
    }

    /// Like [`AxisAngle::from_quat`] but keeps arbitrarily small angles.
    /// Only an exact identity quaternion maps to [`AxisAngle::IDENTITY`].
    pub fn from_quat_exact(quat: Quat) -> Self {
        Self::from_quat_above(quat, 0.0)
    }

    fn from_quat_above(quat: Quat, min_angle: f32) -> Self {
        let quat = if quat.w < 0.0 { -quat } else { quat };
        let xyz = Vec3::new(quat.x, quat.y, quat.z);
        let sin_half = xyz.length();
        let angle = 2.0 * sin_half.atan2(quat.w);
        if angle <= min_angle || sin_half == 0.0 {
            return Self::IDENTITY;
        }
        Self {
            axis: xyz / sin_half,
            angle: angle.to_degrees(),
        }
    }

    /// Unit quaternion for this rotation.
    ///
    /// A zero-length or non-finite axis, or a non-finite angle, has no
    /// meaningful rotation and yields `Quat::IDENTITY`.
    pub fn to_quat(&self) -> Quat {
        if self.angle == 0.0 {
            return Quat::IDENTITY;
        }
        match self.axis.try_normalize() {
            Some(axis) if self.angle.is_finite() => {
                Quat::from_axis_angle(axis, self.angle.to_radians()).normalize()
            }
            _ => {
                log::debug!(
                    "Degenerate rotation input (axis {:?}, angle {}), using identity",
                    self.axis,
                    self.angle
                );
                Quat::IDENTITY
            }
        }
    }
}

/// Represents a 3D transformation relative to a parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Everything zeroed, including scale. Singular until a scale is set.
    pub const ZEROED: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ZERO,
    };

    /// Create a new transform
    pub fn new(position: Vec3, rotation: AxisAngle, scale: Vec3) -> Self {
        Self {
            position,
            rotation: rotation.to_quat(),
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Stored rotation as is, without the identity collapse applied to
    /// decomposed rotations.
    pub fn rotation(&self) -> AxisAngle {
        AxisAngle::from_quat_exact(self.rotation)
    }

    /// Stored orientation, always normalized.
    pub fn quaternion(&self) -> Quat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: AxisAngle) {
        self.rotation = rotation.to_quat();
    }

    /// Local-to-parent matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Parent-to-local matrix.
    pub fn inverse_matrix(&self) -> Result<Mat4> {
        invert(&self.matrix())
    }
}

/// Invert an affine matrix, refusing singular ones instead of producing
/// infinities.
pub fn invert(matrix: &Mat4) -> Result<Mat4> {
    let det = matrix.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(TransformError::SingularTransform);
    }
    let inverse = matrix.inverse();
    if !inverse.is_finite() {
        return Err(TransformError::SingularTransform);
    }
    Ok(inverse)
}

/// Translation column of an affine matrix.
pub fn extract_translation(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

/// Per-axis scale: length of each basis column of the upper-left 3x3 block.
///
/// A reflection (negative determinant) is reported as a negative x factor,
/// so the rotation left after dividing it out is a proper rotation.
pub fn extract_scale(matrix: &Mat4) -> Vec3 {
    let det = Mat3::from_mat4(*matrix).determinant();
    let x = matrix.x_axis.truncate().length();
    Vec3::new(
        if det < 0.0 { -x } else { x },
        matrix.y_axis.truncate().length(),
        matrix.z_axis.truncate().length(),
    )
}

/// Upper-left 3x3 block with each column divided by its signed scale.
///
/// A zero-length column yields NaN entries; [`extract_quaternion`] reports that.
pub fn extract_rotation(matrix: &Mat4) -> Mat3 {
    let scale = extract_scale(matrix);
    Mat3::from_cols(
        matrix.x_axis.truncate() / scale.x,
        matrix.y_axis.truncate() / scale.y,
        matrix.z_axis.truncate() / scale.z,
    )
}

pub fn extract_quaternion(matrix: &Mat4) -> Result<Quat> {
    let rotation = extract_rotation(matrix);
    if !rotation.is_finite() {
        return Err(TransformError::MatrixDecomposition);
    }
    let quat = Quat::from_mat3(&rotation);
    if !quat.is_finite() {
        return Err(TransformError::MatrixDecomposition);
    }
    Ok(quat.normalize())
}
