//! Mesh math utilities

use crate::Mesh;
use nalgebra::Vector3;

impl Mesh {
    /// Unit normal of a triangle given by its corners, `None` if degenerate
    pub fn face_normal(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Option<Vector3<f32>> {
        let cross = (b - a).cross(&(c - a));
        let norm = cross.norm();
        if norm <= 1e-10 {
            None
        } else {
            Some(cross / norm)
        }
    }
}
