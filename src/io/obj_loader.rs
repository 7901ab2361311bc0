use crate::core::geometry::Vertex;
use crate::error::{Error, Result};
use crate::scene::mesh::Mesh;
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::path::Path;

/// Loads an OBJ file and returns a single merged terrain Mesh.
///
/// Only positions and normals are read; texture coordinates are derived by
/// the terrain stage instead.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path_obj = path.as_ref();
    if !path_obj.exists() {
        return Err(Error::Obj {
            path: path_obj.to_path_buf(),
            message: "file not found".to_string(),
        });
    }

    info!("Loading OBJ file: {}", path_obj.display());

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // Unifies indices for position/normal
        ..Default::default()
    };

    // MTL files are irrelevant here; a missing one is not an error.
    let (models, _materials) =
        tobj::load_obj(path_obj, &load_options).map_err(|e| Error::Obj {
            path: path_obj.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut index_offset = 0;

    for model in models {
        let mesh = &model.mesh;
        let num_vertices = mesh.positions.len() / 3;
        let has_normals = !mesh.normals.is_empty();

        if !has_normals {
            warn!(
                "Mesh '{}' is missing normals. Using default (0, 1, 0).",
                model.name
            );
        }

        for i in 0..num_vertices {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );

            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vector3::y()
            };

            vertices.push(Vertex::new(position, normal));
        }

        // Sub-meshes are merged, so their indices shift by what came before.
        indices.extend(mesh.indices.iter().map(|index| index + index_offset));

        index_offset += num_vertices as u32;
    }

    info!(
        "OBJ loaded successfully. Total vertices: {}, Total indices: {}",
        vertices.len(),
        indices.len()
    );

    Ok(Mesh::new(vertices, indices))
}
