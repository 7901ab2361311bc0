use crate::core::math::transform::{TransformFactory, matrix_from_rows};
use crate::error::Result;
use crate::io::config::Config;
use crate::io::obj_loader::load_obj;
use crate::pipeline::terrain::{CameraUniform, TerrainMaterial, TerrainStage, TransformUniform};
use crate::scene::draped_line::{DrapedLine, DrapedLineSet};
use crate::scene::mesh::Mesh;
use log::info;
use nalgebra::{Point3, Vector3};

/// Resolution and extent of the grid used when no terrain mesh is configured.
const FALLBACK_GRID_SIZE: f32 = 20.0;
const FALLBACK_GRID_RESOLUTION: u32 = 32;

/// Builds the terrain stage (all three uniform groups) from config.
pub fn build_stage(config: &Config) -> TerrainStage {
    let t = &config.transform;
    let model = TransformFactory::from_trs(
        &Vector3::from(t.position),
        &Vector3::from(t.rotation),
        &Vector3::from(t.scale),
    );

    TerrainStage::with_normal_transform(
        CameraUniform {
            view_proj: matrix_from_rows(&config.camera.view_proj),
        },
        TransformUniform { model },
        TerrainMaterial::new(config.material.scale, config.material.offset),
        config.stage.normal_transform,
    )
}

/// Collects the configured draped lines, capped at `max_draped_lines`.
pub fn build_draped_lines(config: &Config) -> DrapedLineSet {
    let mut set = DrapedLineSet::new(config.max_draped_lines);
    for l in &config.draped_lines {
        set.push(DrapedLine {
            point0: Point3::from(l.point0),
            point1: Point3::from(l.point1),
            width: l.width,
            color: l.color,
            plane_dir: Vector3::from(l.plane_dir),
        });
    }
    set
}

/// Loads the configured terrain mesh, or generates a rolling test grid.
pub fn load_terrain_mesh(config: &Config) -> Result<Mesh> {
    match &config.stage.input {
        Some(path) => load_obj(path),
        None => {
            info!(
                "No terrain mesh configured; generating a {}x{} grid",
                FALLBACK_GRID_RESOLUTION, FALLBACK_GRID_RESOLUTION
            );
            Ok(Mesh::create_grid(
                FALLBACK_GRID_SIZE,
                FALLBACK_GRID_RESOLUTION,
                |x, z| (x * 0.3).sin() * 2.0 + (z * 0.2).cos() * 3.0,
            ))
        }
    }
}
