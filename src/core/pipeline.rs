use crate::core::geometry::Vertex;
use nalgebra::{Vector2, Vector4};
use std::ops::{Add, Mul};

/// Trait for per-vertex outputs that the next stage interpolates across a primitive.
///
/// Requirements:
/// - Copy + Clone: cheaply duplicable values for per-vertex storage and interpolation.
/// - Add + Mul<f32>: support linear combination (a + b * t) used by barycentric interpolation.
/// - Send + Sync: invocations run concurrently on the rayon pool.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
    /// Optionally return UV coordinates if the varying contains them.
    fn get_uv(&self) -> Option<Vector2<f32>> {
        None
    }
}

/// The programmable vertex stage.
///
/// One invocation per vertex. Invocations share only read-only state (the
/// uniform blocks held by the implementor) and may run in any order, which is
/// why implementors must be `Send + Sync`.
pub trait VertexStage: Send + Sync {
    /// Per-vertex varying data handed to the next stage.
    type Varying: Interpolatable;

    /// Transforms the given vertex into homogeneous clip space and returns the
    /// varying associated with it.
    ///
    /// # Returns
    /// - `(Vector4<f32>, Self::Varying)`: clip-space position and per-vertex varying.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);
}
