use crate::error::{Error, Result};
use crate::pipeline::processor::ProcessedVertices;
use crate::pipeline::terrain::TerrainVarying;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "index,clip_x,clip_y,clip_z,clip_w,world_x,world_y,world_z,normal_x,normal_y,normal_z,u,v";

/// Writes one CSV row per vertex with every output of the terrain stage.
pub fn write_vertices_csv<W: Write>(
    out: &mut W,
    processed: &ProcessedVertices<TerrainVarying>,
) -> std::io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for (i, (clip, varying)) in processed
        .clip_positions
        .iter()
        .zip(&processed.varyings)
        .enumerate()
    {
        let p = varying.world_position;
        let n = varying.world_normal;
        writeln!(
            out,
            "{i},{},{},{},{},{},{},{},{},{},{},{},{}",
            clip.x, clip.y, clip.z, clip.w, p.x, p.y, p.z, n.x, n.y, n.z, varying.uv.x, varying.uv.y
        )?;
    }
    Ok(())
}

pub fn save_vertices_csv<P: AsRef<Path>>(
    path: P,
    processed: &ProcessedVertices<TerrainVarying>,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_vertices_csv(&mut writer, processed)
        .and_then(|_| writer.flush())
        .map_err(|e| Error::io(path, e))?;
    info!("Wrote {} vertices to '{}'", processed.len(), path.display());
    Ok(())
}

/// Smallest and largest of `values`, or `None` when there are none.
pub fn value_range(values: impl IntoIterator<Item = f32>) -> Option<(f32, f32)> {
    values.into_iter().fold(None, |acc, x| {
        Some(match acc {
            None => (x, x),
            Some((lo, hi)) => (lo.min(x), hi.max(x)),
        })
    })
}

/// Writes a packed draped-line block as raw bytes.
pub fn save_draped_lines<P: AsRef<Path>>(path: P, block: &[u8]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, block).map_err(|e| Error::io(path, e))?;
    info!("Wrote {} byte draped-line block to '{}'", block.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector2, Vector3, Vector4};

    #[test]
    fn rows_follow_the_header() {
        let processed = ProcessedVertices {
            clip_positions: vec![Vector4::new(0.0, 0.0, 0.0, 1.0)],
            varyings: vec![TerrainVarying {
                world_position: Point3::new(1.0, 12.0, 3.0),
                world_normal: Vector3::new(0.0, 1.0, 0.0),
                uv: Vector2::new(0.5, 12.0),
            }],
        };

        let mut buf = Vec::new();
        write_vertices_csv(&mut buf, &processed).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "0,0,0,0,1,1,12,3,0,1,0,0.5,12");
        assert_eq!(
            lines[1].split(',').count(),
            CSV_HEADER.split(',').count()
        );
    }

    #[test]
    fn value_range_spans_inputs() {
        assert_eq!(value_range(Vec::<f32>::new()), None);
        assert_eq!(value_range([3.0]), Some((3.0, 3.0)));
        assert_eq!(value_range([2.0, -1.5, 7.0, 0.0]), Some((-1.5, 7.0)));
    }

    #[test]
    fn draped_block_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.bin");
        save_draped_lines(&path, &[1, 2, 3]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }
}
