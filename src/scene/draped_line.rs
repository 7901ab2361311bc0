use bytemuck::{Pod, Zeroable};
use log::warn;
use nalgebra::{Matrix4, Point3, Vector3};

pub const DEFAULT_MAX_DRAPED_LINES: usize = 50;

/// A line segment projected onto the terrain surface along `plane_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrapedLine {
    pub point0: Point3<f32>,
    pub point1: Point3<f32>,
    pub width: f32,
    /// Linear RGBA.
    pub color: [f32; 4],
    pub plane_dir: Vector3<f32>,
}

impl Default for DrapedLine {
    fn default() -> Self {
        Self {
            point0: Point3::origin(),
            point1: Point3::origin(),
            width: 1.0,
            color: [1.0, 1.0, 1.0, 1.0],
            plane_dir: -Vector3::y(),
        }
    }
}

impl DrapedLine {
    /// Packs the line for the uniform array, moving endpoints to world space with `model`.
    pub fn to_uniform(&self, model: &Matrix4<f32>) -> DrapedLineUniform {
        let p0 = model * self.point0.to_homogeneous();
        let p1 = model * self.point1.to_homogeneous();
        DrapedLineUniform {
            point0: p0.into(),
            point1: p1.into(),
            width: [self.width, 0.0, 0.0, 0.0],
            color: self.color,
            plane_dir: [self.plane_dir.x, self.plane_dir.y, self.plane_dir.z, 0.0],
        }
    }
}

/// One slot of the draped-line array. Every field is a vec4 so the array has
/// no interior padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrapedLineUniform {
    pub point0: [f32; 4],
    pub point1: [f32; 4],
    pub width: [f32; 4],
    pub color: [f32; 4],
    pub plane_dir: [f32; 4],
}

/// Header of the draped-line block; the count sits in the first lane.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrapedLineCount {
    pub num_draped_lines: [u32; 4],
}

pub const DRAPED_LINE_SIZE: usize = std::mem::size_of::<DrapedLineUniform>();
pub const DRAPED_LINE_COUNT_SIZE: usize = std::mem::size_of::<DrapedLineCount>();

/// The set of draped lines drawn over one terrain, capped at `max_lines`.
#[derive(Debug, Clone)]
pub struct DrapedLineSet {
    max_lines: usize,
    pub lines: Vec<DrapedLine>,
}

impl Default for DrapedLineSet {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DRAPED_LINES)
    }
}

impl DrapedLineSet {
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines,
            lines: Vec::new(),
        }
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn push(&mut self, line: DrapedLine) {
        self.lines.push(line);
    }

    /// Number of lines that make it into the block.
    pub fn count(&self) -> usize {
        self.lines.len().min(self.max_lines)
    }

    /// Total byte size of the block, independent of how many lines are set.
    pub fn block_size(&self) -> usize {
        DRAPED_LINE_COUNT_SIZE + DRAPED_LINE_SIZE * self.max_lines
    }

    /// Block size for a cap of `max_lines`, or `None` when the cap does not fit
    /// the `u32` count header or the size overflows `usize`.
    pub fn checked_block_size(max_lines: usize) -> Option<usize> {
        u32::try_from(max_lines).ok()?;
        DRAPED_LINE_SIZE
            .checked_mul(max_lines)?
            .checked_add(DRAPED_LINE_COUNT_SIZE)
    }

    /// Serializes the block: a `[count, 0, 0, 0]` header followed by
    /// `max_lines` slots. Slots past `count` stay zeroed; lines past
    /// `max_lines` are dropped.
    pub fn pack(&self, model: &Matrix4<f32>) -> Vec<u8> {
        let count = self.count();
        if self.lines.len() > self.max_lines {
            warn!(
                "{} draped lines exceed the limit of {}; extra lines are dropped",
                self.lines.len(),
                self.max_lines
            );
        }

        let mut data = vec![0u8; self.block_size()];
        let header = DrapedLineCount {
            num_draped_lines: [count as u32, 0, 0, 0],
        };
        data[..DRAPED_LINE_COUNT_SIZE].copy_from_slice(bytemuck::bytes_of(&header));

        let array_end = DRAPED_LINE_COUNT_SIZE + DRAPED_LINE_SIZE * count;
        for (line, slot) in self
            .lines
            .iter()
            .zip(data[DRAPED_LINE_COUNT_SIZE..array_end].chunks_exact_mut(DRAPED_LINE_SIZE))
        {
            slot.copy_from_slice(bytemuck::bytes_of(&line.to_uniform(model)));
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::TransformFactory;

    fn line(x: f32) -> DrapedLine {
        DrapedLine {
            point0: Point3::new(x, 0.0, 100.0),
            point1: Point3::new(x, 0.0, -100.0),
            color: [1.0, 0.0, 0.0, 1.0],
            ..Default::default()
        }
    }

    fn read_count(data: &[u8]) -> u32 {
        bytemuck::pod_read_unaligned::<DrapedLineCount>(&data[..DRAPED_LINE_COUNT_SIZE])
            .num_draped_lines[0]
    }

    fn read_slot(data: &[u8], i: usize) -> DrapedLineUniform {
        let start = DRAPED_LINE_COUNT_SIZE + i * DRAPED_LINE_SIZE;
        bytemuck::pod_read_unaligned(&data[start..start + DRAPED_LINE_SIZE])
    }

    #[test]
    fn slot_layout_is_five_vec4s() {
        assert_eq!(DRAPED_LINE_SIZE, 80);
        assert_eq!(DRAPED_LINE_COUNT_SIZE, 16);
    }

    #[test]
    fn default_line_drapes_downwards() {
        let l = DrapedLine::default();
        assert_eq!(l.width, 1.0);
        assert_eq!(l.plane_dir, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(l.color, [1.0; 4]);
    }

    #[test]
    fn endpoints_move_to_world_space() {
        let model = TransformFactory::translation(&Vector3::new(0.0, 5.0, 0.0));
        let u = line(200.0).to_uniform(&model);
        assert_eq!(u.point0, [200.0, 5.0, 100.0, 1.0]);
        assert_eq!(u.point1, [200.0, 5.0, -100.0, 1.0]);
        assert_eq!(u.width, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(u.plane_dir, [0.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn block_is_sized_for_the_maximum() {
        let mut set = DrapedLineSet::new(4);
        set.push(line(1.0));
        set.push(line(2.0));

        let data = set.pack(&Matrix4::identity());
        assert_eq!(data.len(), 16 + 4 * 80);
        assert_eq!(read_count(&data), 2);
        assert_eq!(read_slot(&data, 1).point0[0], 2.0);
        assert_eq!(read_slot(&data, 2), DrapedLineUniform::zeroed());
    }

    #[test]
    fn excess_lines_are_dropped() {
        let mut set = DrapedLineSet::new(2);
        for i in 0..5 {
            set.push(line(i as f32));
        }
        assert_eq!(set.count(), 2);

        let data = set.pack(&Matrix4::identity());
        assert_eq!(data.len(), set.block_size());
        assert_eq!(read_count(&data), 2);
        assert_eq!(read_slot(&data, 1).point0[0], 1.0);
    }

    #[test]
    fn oversized_caps_have_no_block_size() {
        assert_eq!(DrapedLineSet::checked_block_size(2), Some(16 + 2 * 80));
        assert_eq!(DrapedLineSet::checked_block_size(usize::MAX), None);
        assert_eq!(DrapedLineSet::checked_block_size(u32::MAX as usize + 1), None);
    }

    #[test]
    fn empty_set_packs_zero_count() {
        let set = DrapedLineSet::default();
        assert_eq!(set.max_lines(), DEFAULT_MAX_DRAPED_LINES);
        let data = set.pack(&Matrix4::identity());
        assert_eq!(read_count(&data), 0);
        assert!(data.iter().all(|&b| b == 0));
    }
}
