use crate::core::geometry::Vertex;
use crate::core::math::transform::upper_left_3x3;
use crate::core::pipeline::{Interpolatable, VertexStage};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use serde::Deserialize;
use std::ops::{Add, Mul};

/// Fixed U coordinate: terrain texturing varies with elevation only.
pub const TERRAIN_U: f32 = 0.5;

/// Camera block (set 0, binding 0). Owned by whoever drives the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraUniform {
    pub view_proj: Matrix4<f32>,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Matrix4::identity(),
        }
    }
}

/// Per-drawable transform block (set 2, binding 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformUniform {
    pub model: Matrix4<f32>,
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self {
            model: Matrix4::identity(),
        }
    }
}

/// Terrain material parameters. `scale` sits at set 2 binding 1 and `offset`
/// at set 2 binding 2, each in its own block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainMaterial {
    pub scale: f32,
    pub offset: f32,
}

impl TerrainMaterial {
    pub fn new(scale: f32, offset: f32) -> Self {
        Self { scale, offset }
    }

    /// Texture V coordinate for a world-space height.
    #[inline]
    pub fn v_for_height(&self, height: f32) -> f32 {
        height * self.scale + self.offset
    }
}

impl Default for TerrainMaterial {
    /// One full LUT repeat every six world units.
    fn default() -> Self {
        Self {
            scale: 1.0 / 6.0,
            offset: 0.0,
        }
    }
}

/// How normals are carried into world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalTransform {
    /// `mat3(Model) * n`. Only correct for rotations and uniform scale; kept as
    /// the default so outputs match the GPU stage bit for bit.
    #[default]
    Model3x3,
    /// `transpose(inverse(mat3(Model))) * n`. Falls back to the plain 3x3 block
    /// when the model matrix is singular.
    InverseTranspose,
}

/// Data passed from the terrain vertex stage to the next stage.
///
/// Output locations: 0 = world position, 1 = world normal, 2 = UV.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainVarying {
    pub world_position: Point3<f32>,
    pub world_normal: Vector3<f32>,
    pub uv: Vector2<f32>,
}

impl Add for TerrainVarying {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            world_position: Point3::from(self.world_position.coords + other.world_position.coords),
            world_normal: self.world_normal + other.world_normal,
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for TerrainVarying {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            world_position: Point3::from(self.world_position.coords * scalar),
            world_normal: self.world_normal * scalar,
            uv: self.uv * scalar,
        }
    }
}

impl Interpolatable for TerrainVarying {
    fn get_uv(&self) -> Option<Vector2<f32>> {
        Some(self.uv)
    }
}

// --- Terrain Stage ---
#[derive(Debug, Clone)]
pub struct TerrainStage {
    pub camera: CameraUniform,
    pub material: TerrainMaterial,
    transform: TransformUniform,
    normal_transform: NormalTransform,
    normal_matrix: Matrix3<f32>,
}

impl TerrainStage {
    pub fn new(
        camera: CameraUniform,
        transform: TransformUniform,
        material: TerrainMaterial,
    ) -> Self {
        Self::with_normal_transform(camera, transform, material, NormalTransform::default())
    }

    pub fn with_normal_transform(
        camera: CameraUniform,
        transform: TransformUniform,
        material: TerrainMaterial,
        normal_transform: NormalTransform,
    ) -> Self {
        let normal_matrix = Self::normal_matrix_for(&transform.model, normal_transform);
        Self {
            camera,
            transform,
            material,
            normal_transform,
            normal_matrix,
        }
    }

    fn normal_matrix_for(model: &Matrix4<f32>, mode: NormalTransform) -> Matrix3<f32> {
        let model_3x3 = upper_left_3x3(model);
        match mode {
            NormalTransform::Model3x3 => model_3x3,
            NormalTransform::InverseTranspose => {
                model_3x3.try_inverse().unwrap_or(model_3x3).transpose()
            }
        }
    }

    pub fn model(&self) -> &Matrix4<f32> {
        &self.transform.model
    }

    pub fn normal_transform(&self) -> NormalTransform {
        self.normal_transform
    }

    /// Replaces the transform block, e.g. when the same stage draws another instance.
    pub fn set_model(&mut self, model: Matrix4<f32>) {
        self.transform.model = model;
        self.normal_matrix = Self::normal_matrix_for(&model, self.normal_transform);
    }
}

impl VertexStage for TerrainStage {
    type Varying = TerrainVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        // Full homogeneous product; the clip position uses all four components.
        let world = self.transform.model * vertex.position.to_homogeneous();
        let world_position = Point3::new(world.x, world.y, world.z);

        let world_normal = self.normal_matrix * vertex.normal;

        let uv = Vector2::new(TERRAIN_U, self.material.v_for_height(world.y));

        let clip_pos = self.camera.view_proj * world;

        (
            clip_pos,
            TerrainVarying {
                world_position,
                world_normal,
                uv,
            },
        )
    }
}
