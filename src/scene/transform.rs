//! Affine transforms
//!
//! Matrices are stored in column-vector convention (`p' = M * p`). POV-Ray
//! uses row vectors, so the 12-value `matrix` form is the transpose's first
//! three columns.

use nalgebra::{Matrix4, Rotation3, Vector3};

/// An affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(Matrix4<f64>);

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self(matrix)
    }

    pub fn translate(by: [f64; 3]) -> Self {
        Self(Matrix4::new_translation(&Vector3::from(by)))
    }

    pub fn scale(by: [f64; 3]) -> Self {
        Self(Matrix4::new_nonuniform_scaling(&Vector3::from(by)))
    }

    pub fn uniform_scale(by: f64) -> Self {
        Self(Matrix4::new_scaling(by))
    }

    /// Rotation in degrees about X, then Y, then Z.
    pub fn rotate(degrees: [f64; 3]) -> Self {
        let [x, y, z] = degrees.map(f64::to_radians);
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), x);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), y);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), z);
        Self((rz * ry * rx).to_homogeneous())
    }

    /// Builds a transform from POV-Ray's 12-value `matrix` form.
    pub fn from_rows(rows: [f64; 12]) -> Self {
        let mut m = Matrix4::identity();
        for r in 0..4 {
            for c in 0..3 {
                m[(c, r)] = rows[r * 3 + c];
            }
        }
        Self(m)
    }

    /// POV-Ray's 12-value `matrix` form.
    pub fn to_rows(&self) -> [f64; 12] {
        let mut rows = [0.0; 12];
        for r in 0..4 {
            for c in 0..3 {
                rows[r * 3 + c] = self.0[(c, r)];
            }
        }
        rows
    }

    /// Composition: `self` first, then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform(next.0 * self.0)
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0 == Matrix4::identity()
    }

    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        let v = self.0 * nalgebra::Vector4::new(p[0], p[1], p[2], 1.0);
        [v.x, v.y, v.z]
    }
}

/// Original and cumulative transform of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformState {
    base: Transform,
    current: Transform,
}

impl TransformState {
    pub fn new(base: Transform) -> Self {
        Self {
            base,
            current: base,
        }
    }

    pub fn base(&self) -> Transform {
        self.base
    }

    pub fn current(&self) -> Transform {
        self.current
    }

    /// Composes `t` after everything applied so far.
    pub fn apply(&mut self, t: &Transform) {
        self.current = self.current.then(t);
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}
