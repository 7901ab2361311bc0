use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector3};

/// A collection of vertices and indices representing a terrain patch.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// List of vertices.
    pub vertices: Vec<Vertex>,
    /// List of indices defining triangles (3 indices per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Creates a simple triangle mesh for testing purposes.
    ///
    /// Vertices are arranged in Counter-Clockwise (CCW) order.
    pub fn create_test_triangle() -> Self {
        let vertices = vec![
            Vertex::new(
                Point3::new(0.0, 0.5, 0.0),  // Top
                Vector3::new(0.0, 0.0, 1.0), // Normal facing Z+
            ),
            Vertex::new(
                Point3::new(-0.5, -0.5, 0.0), // Bottom Left
                Vector3::new(0.0, 0.0, 1.0),
            ),
            Vertex::new(
                Point3::new(0.5, -0.5, 0.0), // Bottom Right
                Vector3::new(0.0, 0.0, 1.0),
            ),
        ];

        let indices = vec![0, 1, 2];

        Self::new(vertices, indices)
    }

    /// Builds a square heightfield in the XZ plane, centred on the origin.
    ///
    /// `resolution` is the number of quads per side; `height(x, z)` gives the
    /// y of each grid point. Normals come from central differences of the
    /// height function.
    pub fn create_grid<F>(size: f32, resolution: u32, height: F) -> Self
    where
        F: Fn(f32, f32) -> f32,
    {
        let resolution = resolution.max(1);
        let side = resolution + 1;
        let step = size / resolution as f32;
        let half = size * 0.5;
        let eps = step * 0.5;

        let mut vertices = Vec::with_capacity((side * side) as usize);
        for row in 0..side {
            for col in 0..side {
                let x = -half + col as f32 * step;
                let z = -half + row as f32 * step;
                let y = height(x, z);

                let dx = height(x + eps, z) - height(x - eps, z);
                let dz = height(x, z + eps) - height(x, z - eps);
                let normal = Vector3::new(-dx, 2.0 * eps, -dz).normalize();

                vertices.push(Vertex::new(Point3::new(x, y, z), normal));
            }
        }

        let mut indices = Vec::with_capacity((resolution * resolution * 6) as usize);
        for row in 0..resolution {
            for col in 0..resolution {
                let i0 = row * side + col;
                let i1 = i0 + 1;
                let i2 = i0 + side;
                let i3 = i2 + 1;
                // CCW seen from +Y
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        Self::new(vertices, indices)
    }
}
