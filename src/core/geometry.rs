use nalgebra::{Point3, Vector3};

/// A single terrain vertex as fed to the vertex stage.
///
/// Attribute location 0 is `position`, location 1 is `normal`. Both are in
/// model (object-local) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in local object space.
    pub position: Point3<f32>,
    /// Surface normal in local object space. Not required to be unit length.
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            normal: Vector3::y(),
        }
    }
}
