//! Bit-exact attribute, uniform and output layout of the terrain vertex stage.
//!
//! Everything here mirrors what a GPU pipeline binds for the same stage, so
//! vertex buffers and uniform blocks produced for the GPU can be fed to the
//! CPU implementation unchanged (and the other way round).

use crate::core::geometry::Vertex;
use crate::error::{Error, Result};
use crate::pipeline::terrain::{
    CameraUniform, NormalTransform, TerrainMaterial, TerrainStage, TransformUniform,
};
use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Point3, Vector3};

/// Scalar element type of every binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
    Float32x4x4,
}

impl Format {
    pub const fn size(self) -> usize {
        match self {
            Format::Float32 => 4,
            Format::Float32x2 => 8,
            Format::Float32x3 => 12,
            Format::Float32x4 => 16,
            Format::Float32x4x4 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
    pub location: u32,
    pub name: &'static str,
    pub format: Format,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub set: u32,
    pub binding: u32,
    pub name: &'static str,
    pub format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSlot {
    Location {
        location: u32,
        name: &'static str,
        format: Format,
    },
    ClipPosition,
}

pub const ATTRIBUTES: [AttributeSlot; 2] = [
    AttributeSlot {
        location: 0,
        name: "position",
        format: Format::Float32x3,
        offset: 0,
    },
    AttributeSlot {
        location: 1,
        name: "normal",
        format: Format::Float32x3,
        offset: 12,
    },
];

pub const BINDINGS: [UniformSlot; 4] = [
    UniformSlot {
        set: 0,
        binding: 0,
        name: "view_proj",
        format: Format::Float32x4x4,
    },
    UniformSlot {
        set: 2,
        binding: 0,
        name: "model",
        format: Format::Float32x4x4,
    },
    UniformSlot {
        set: 2,
        binding: 1,
        name: "scale",
        format: Format::Float32,
    },
    UniformSlot {
        set: 2,
        binding: 2,
        name: "offset",
        format: Format::Float32,
    },
];

pub const OUTPUTS: [OutputSlot; 4] = [
    OutputSlot::Location {
        location: 0,
        name: "world_position",
        format: Format::Float32x3,
    },
    OutputSlot::Location {
        location: 1,
        name: "world_normal",
        format: Format::Float32x3,
    },
    OutputSlot::Location {
        location: 2,
        name: "uv",
        format: Format::Float32x2,
    },
    OutputSlot::ClipPosition,
];

/// Looks up the uniform bound at `(set, binding)`.
pub fn find_binding(set: u32, binding: u32) -> Option<&'static UniformSlot> {
    BINDINGS
        .iter()
        .find(|slot| slot.set == set && slot.binding == binding)
}

/// Interleaved vertex record: location 0 then location 1, tightly packed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexAttributes {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

pub const VERTEX_STRIDE: usize = std::mem::size_of::<VertexAttributes>();

impl From<&Vertex> for VertexAttributes {
    fn from(v: &Vertex) -> Self {
        Self {
            position: [v.position.x, v.position.y, v.position.z],
            normal: [v.normal.x, v.normal.y, v.normal.z],
        }
    }
}

impl From<VertexAttributes> for Vertex {
    fn from(a: VertexAttributes) -> Self {
        Vertex::new(Point3::from(a.position), Vector3::from(a.normal))
    }
}

/// A 4x4 matrix block, stored column-major as the GPU reads it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MatrixBlock {
    pub columns: [[f32; 4]; 4],
}

impl MatrixBlock {
    pub fn from_matrix(m: &Matrix4<f32>) -> Self {
        let mut columns = [[0.0; 4]; 4];
        for (c, column) in columns.iter_mut().enumerate() {
            for (r, value) in column.iter_mut().enumerate() {
                *value = m[(r, c)];
            }
        }
        Self { columns }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_fn(|r, c| self.columns[c][r])
    }
}

/// A block holding a single float.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ScalarBlock {
    pub value: f32,
}

impl ScalarBlock {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

fn expect_len(what: &'static str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::Layout {
            what,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Decodes an interleaved vertex buffer. The slice does not need to be aligned.
pub fn decode_vertices(bytes: &[u8]) -> Result<Vec<Vertex>> {
    if bytes.len() % VERTEX_STRIDE != 0 {
        let expected = (bytes.len() / VERTEX_STRIDE + 1) * VERTEX_STRIDE;
        return Err(Error::Layout {
            what: "vertex buffer",
            expected,
            actual: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(VERTEX_STRIDE)
        .map(|chunk| Vertex::from(bytemuck::pod_read_unaligned::<VertexAttributes>(chunk)))
        .collect())
}

pub fn encode_vertices(vertices: &[Vertex]) -> Vec<u8> {
    let records: Vec<VertexAttributes> = vertices.iter().map(VertexAttributes::from).collect();
    bytemuck::cast_slice(&records).to_vec()
}

pub fn decode_matrix(bytes: &[u8]) -> Result<Matrix4<f32>> {
    expect_len("matrix block", bytes, std::mem::size_of::<MatrixBlock>())?;
    Ok(bytemuck::pod_read_unaligned::<MatrixBlock>(bytes).to_matrix())
}

pub fn decode_scalar(bytes: &[u8]) -> Result<f32> {
    expect_len("scalar block", bytes, std::mem::size_of::<ScalarBlock>())?;
    Ok(bytemuck::pod_read_unaligned::<ScalarBlock>(bytes).value)
}

/// Raw contents of the four uniform bindings.
#[derive(Debug, Clone, Copy)]
pub struct UniformBytes<'a> {
    pub view_proj: &'a [u8],
    pub model: &'a [u8],
    pub scale: &'a [u8],
    pub offset: &'a [u8],
}

/// Builds a terrain stage from raw uniform blocks.
pub fn stage_from_bytes(
    uniforms: UniformBytes<'_>,
    normal_transform: NormalTransform,
) -> Result<TerrainStage> {
    let camera = CameraUniform {
        view_proj: decode_matrix(uniforms.view_proj)?,
    };
    let transform = TransformUniform {
        model: decode_matrix(uniforms.model)?,
    };
    let material = TerrainMaterial::new(
        decode_scalar(uniforms.scale)?,
        decode_scalar(uniforms.offset)?,
    );
    Ok(TerrainStage::with_normal_transform(
        camera,
        transform,
        material,
        normal_transform,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::TransformFactory;
    use crate::core::pipeline::VertexStage;

    #[test]
    fn block_sizes_match_the_binding_table() {
        assert_eq!(VERTEX_STRIDE, 24);
        assert_eq!(std::mem::size_of::<MatrixBlock>(), Format::Float32x4x4.size());
        assert_eq!(std::mem::size_of::<ScalarBlock>(), Format::Float32.size());

        let attribute_bytes: usize = ATTRIBUTES.iter().map(|a| a.format.size()).sum();
        assert_eq!(attribute_bytes, VERTEX_STRIDE);
        assert_eq!(ATTRIBUTES[1].offset, ATTRIBUTES[0].format.size());
    }

    #[test]
    fn binding_table_lookup() {
        assert_eq!(find_binding(0, 0).map(|s| s.name), Some("view_proj"));
        assert_eq!(find_binding(2, 0).map(|s| s.name), Some("model"));
        assert_eq!(find_binding(2, 1).map(|s| s.name), Some("scale"));
        assert_eq!(find_binding(2, 2).map(|s| s.name), Some("offset"));
        assert!(find_binding(1, 0).is_none());
        assert!(find_binding(2, 3).is_none());
    }

    #[test]
    fn outputs_end_with_clip_position() {
        assert_eq!(OUTPUTS[3], OutputSlot::ClipPosition);
        let locations: Vec<u32> = OUTPUTS
            .iter()
            .filter_map(|o| match o {
                OutputSlot::Location { location, .. } => Some(*location),
                OutputSlot::ClipPosition => None,
            })
            .collect();
        assert_eq!(locations, vec![0, 1, 2]);
    }

    #[test]
    fn vertex_buffer_is_position_then_normal() {
        let mut bytes = Vec::new();
        for f in [1.0f32, 2.0, 3.0, 0.0, 1.0, 0.0] {
            bytes.extend_from_slice(&f.to_ne_bytes());
        }
        let vertices = decode_vertices(&bytes).unwrap();
        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(vertices[0].normal, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(encode_vertices(&vertices), bytes);
    }

    #[test]
    fn unaligned_vertex_slices_decode() {
        let v = Vertex::new(Point3::new(-1.0, 0.5, 4.0), Vector3::z());
        let mut bytes = vec![0u8];
        bytes.extend(encode_vertices(&[v, v]));
        assert_eq!(decode_vertices(&bytes[1..]).unwrap(), vec![v, v]);
    }

    #[test]
    fn truncated_vertex_buffer_is_rejected() {
        let err = decode_vertices(&[0u8; 30]).unwrap_err();
        assert!(matches!(
            err,
            Error::Layout {
                expected: 48,
                actual: 30,
                ..
            }
        ));
    }

    #[test]
    fn matrix_block_is_column_major() {
        let m = TransformFactory::translation(&Vector3::new(7.0, 8.0, 9.0));
        let block = MatrixBlock::from_matrix(&m);
        assert_eq!(block.columns[3], [7.0, 8.0, 9.0, 1.0]);

        let bytes = bytemuck::bytes_of(&block);
        assert_eq!(decode_matrix(bytes).unwrap(), m);
    }

    #[test]
    fn wrong_sized_blocks_are_rejected() {
        assert!(decode_matrix(&[0u8; 48]).is_err());
        assert!(decode_scalar(&[0u8; 8]).is_err());
        assert_eq!(decode_scalar(&2.5f32.to_ne_bytes()).unwrap(), 2.5);
    }

    #[test]
    fn stage_built_from_bytes_matches_direct_stage() {
        let model = TransformFactory::translation(&Vector3::new(0.0, 10.0, 0.0));
        let view_proj = Matrix4::identity();
        let model_block = MatrixBlock::from_matrix(&model);
        let view_block = MatrixBlock::from_matrix(&view_proj);
        let scale = ScalarBlock::new(1.0);
        let offset = ScalarBlock::new(0.0);

        let stage = stage_from_bytes(
            UniformBytes {
                view_proj: bytemuck::bytes_of(&view_block),
                model: bytemuck::bytes_of(&model_block),
                scale: bytemuck::bytes_of(&scale),
                offset: bytemuck::bytes_of(&offset),
            },
            NormalTransform::Model3x3,
        )
        .unwrap();

        let (_, out) = stage.vertex(&Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::y()));
        assert_eq!(out.world_position.y, 12.0);
        assert_eq!(out.uv.y, 12.0);
    }
}
