use crate::error::{Error, Result};
use crate::pipeline::processor::DEFAULT_CHUNK_SIZE;
use crate::pipeline::terrain::NormalTransform;
use crate::scene::draped_line::{DEFAULT_MAX_DRAPED_LINES, DrapedLineSet};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stage: StageConfig,
    #[serde(default)]
    pub material: MaterialConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "default_max_draped_lines")]
    pub max_draped_lines: usize,
    #[serde(default)]
    pub draped_lines: Vec<DrapedLineConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stage: StageConfig::default(),
            material: MaterialConfig::default(),
            transform: TransformConfig::default(),
            camera: CameraConfig::default(),
            max_draped_lines: default_max_draped_lines(),
            draped_lines: Vec::new(),
        }
    }
}

fn default_max_draped_lines() -> usize {
    DEFAULT_MAX_DRAPED_LINES
}

#[derive(Debug, Deserialize)]
pub struct StageConfig {
    /// Terrain mesh (.obj). When absent a generated grid is used.
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub normal_transform: NormalTransform,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: default_output(),
            chunk_size: default_chunk_size(),
            normal_transform: NormalTransform::default(),
        }
    }
}

fn default_output() -> String {
    "terrain_vertices.csv".to_string()
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

#[derive(Debug, Deserialize)]
pub struct MaterialConfig {
    #[serde(default = "default_material_scale")]
    pub scale: f32,
    #[serde(default)]
    pub offset: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            scale: default_material_scale(),
            offset: 0.0,
        }
    }
}

fn default_material_scale() -> f32 {
    1.0 / 6.0
}

#[derive(Debug, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees, applied X then Y then Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: default_scale(),
        }
    }
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// The camera block is supplied as-is; nothing here derives it from a camera.
#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    /// Row-major view-projection matrix.
    #[serde(default = "default_identity")]
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            view_proj: default_identity(),
        }
    }
}

fn default_identity() -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[derive(Debug, Deserialize)]
pub struct DrapedLineConfig {
    pub point0: [f32; 3],
    pub point1: [f32; 3],
    #[serde(default = "default_line_width")]
    pub width: f32,
    #[serde(default = "default_line_color")]
    pub color: [f32; 4],
    #[serde(default = "default_plane_dir")]
    pub plane_dir: [f32; 3],
}

fn default_line_width() -> f32 {
    1.0
}
fn default_line_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}
fn default_plane_dir() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.stage.chunk_size == 0 {
            return Err(Error::Config("stage.chunk_size must be at least 1".into()));
        }
        if DrapedLineSet::checked_block_size(self.max_draped_lines).is_none() {
            return Err(Error::Config(format!(
                "max_draped_lines = {} is too large for the draped-line block",
                self.max_draped_lines
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.material.scale, 1.0 / 6.0);
        assert_eq!(config.material.offset, 0.0);
        assert_eq!(config.stage.output, "terrain_vertices.csv");
        assert_eq!(config.stage.normal_transform, NormalTransform::Model3x3);
        assert_eq!(config.camera.view_proj, default_identity());
        assert_eq!(config.max_draped_lines, 50);
        assert!(config.draped_lines.is_empty());
        assert!(config.stage.input.is_none());
    }

    #[test]
    fn full_document_parses() {
        let config = Config::from_toml_str(
            r#"
            max_draped_lines = 8

            [stage]
            input = "assets/quarry.obj"
            output = "out.csv"
            chunk_size = 64
            normal_transform = "inverse_transpose"

            [material]
            scale = 2.0
            offset = 1.0

            [transform]
            position = [0.0, 10.0, 0.0]

            [camera]
            view_proj = [[2, 0, 0, 0], [0, 2, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]

            [[draped_lines]]
            point0 = [200.0, 0.0, 100.0]
            point1 = [200.0, 0.0, -100.0]
            color = [1.0, 0.0, 0.0, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.stage.input.as_deref(), Some("assets/quarry.obj"));
        assert_eq!(config.stage.chunk_size, 64);
        assert_eq!(config.stage.normal_transform, NormalTransform::InverseTranspose);
        assert_eq!(config.material.scale, 2.0);
        assert_eq!(config.transform.position, [0.0, 10.0, 0.0]);
        assert_eq!(config.transform.scale, [1.0, 1.0, 1.0]);
        assert_eq!(config.camera.view_proj[0][0], 2.0);
        assert_eq!(config.max_draped_lines, 8);
        assert_eq!(config.draped_lines.len(), 1);
        assert_eq!(config.draped_lines[0].width, 1.0);
        assert_eq!(config.draped_lines[0].plane_dir, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(
            Config::from_toml_str("[stage]\nchunk_size = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[material]\nscale = \"big\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn huge_draped_line_cap_is_rejected() {
        let err = Config::from_toml_str(
            "max_draped_lines = 1000000000000000000\n\
             [[draped_lines]]\n\
             point0 = [0.0, 0.0, 0.0]\n\
             point1 = [1.0, 0.0, 0.0]\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("max_draped_lines")));

        let at_limit = format!("max_draped_lines = {}", u32::MAX as u64 + 1);
        assert!(matches!(
            Config::from_toml_str(&at_limit),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load("definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
