use crate::core::geometry::Vertex;
use crate::core::math::interpolation::{interpolate, perspective_correct_barycentric};
use crate::core::pipeline::{Interpolatable, VertexStage};
use crate::scene::mesh::Mesh;
use log::{debug, info};
use nalgebra::{Vector3, Vector4};
use rayon::prelude::*;

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Outputs of one stage run, in input vertex order.
#[derive(Debug, Clone)]
pub struct ProcessedVertices<V> {
    pub clip_positions: Vec<Vector4<f32>>,
    pub varyings: Vec<V>,
}

impl<V> ProcessedVertices<V> {
    pub fn len(&self) -> usize {
        self.varyings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.varyings.is_empty()
    }
}

/// A mesh after vertex processing: per-vertex outputs plus the untouched index buffer.
#[derive(Debug, Clone)]
pub struct TransformedMesh<V> {
    pub vertices: ProcessedVertices<V>,
    pub indices: Vec<u32>,
}

impl<V: Interpolatable> TransformedMesh<V> {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interpolates the varyings of triangle `triangle` at screen-space
    /// barycentric weights `bary`, correcting for perspective with each
    /// corner's clip `w`.
    ///
    /// Returns `None` for an out-of-range triangle, indices past the vertex
    /// buffer, or weights that collapse under perspective correction.
    pub fn varying_at(&self, triangle: usize, bary: Vector3<f32>) -> Option<V> {
        let corners = self.indices.get(triangle * 3..triangle * 3 + 3)?;
        let mut ws = [0.0f32; 3];
        let mut varyings = Vec::with_capacity(3);
        for (slot, &index) in corners.iter().enumerate() {
            let index = index as usize;
            ws[slot] = self.vertices.clip_positions.get(index)?.w;
            varyings.push(*self.vertices.varyings.get(index)?);
        }

        let corrected = perspective_correct_barycentric(bary, ws[0], ws[1], ws[2])?;
        Some(interpolate(corrected, &[varyings[0], varyings[1], varyings[2]]))
    }
}

/// Runs a vertex stage over vertex buffers on the rayon pool.
///
/// Each vertex is an independent invocation; `chunk_size` is the smallest
/// batch rayon may hand to one worker. Output order always matches input order.
#[derive(Debug, Clone, Copy)]
pub struct VertexProcessor {
    pub chunk_size: usize,
}

impl Default for VertexProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl VertexProcessor {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn process<S: VertexStage>(
        &self,
        vertices: &[Vertex],
        stage: &S,
    ) -> ProcessedVertices<S::Varying> {
        debug!(
            "Processing {} vertices (min batch {})",
            vertices.len(),
            self.chunk_size
        );

        let (clip_positions, varyings): (Vec<Vector4<f32>>, Vec<S::Varying>) = vertices
            .par_iter()
            .with_min_len(self.chunk_size)
            .map(|v| stage.vertex(v))
            .unzip();

        ProcessedVertices {
            clip_positions,
            varyings,
        }
    }

    pub fn process_mesh<S: VertexStage>(
        &self,
        mesh: &Mesh,
        stage: &S,
    ) -> TransformedMesh<S::Varying> {
        let vertices = self.process(&mesh.vertices, stage);
        info!(
            "Vertex stage done: {} vertices, {} triangles",
            vertices.len(),
            mesh.indices.len() / 3
        );
        TransformedMesh {
            vertices,
            indices: mesh.indices.clone(),
        }
    }
}
