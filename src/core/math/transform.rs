use nalgebra::{Matrix3, Matrix4, Vector3};

//=================================
// Model Matrix Factory
//=================================

/// Factory for the model matrices fed to the transform uniform block.
/// Right-handed, column vectors (`M * v`), matching the stage's `Model × [p, 1]`.
///
/// View/projection matrices are not built here: the camera block arrives
/// fully formed from outside.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Creates a rotation matrix around the X-axis.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Y-axis.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Z-axis.
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Creates a uniform scaling matrix.
    pub fn scaling(factor: f32) -> Matrix4<f32> {
        Self::scaling_nonuniform(&Vector3::new(factor, factor, factor))
    }

    /// Composes `T * Rz * Ry * Rx * S` from a position, XYZ Euler angles in
    /// degrees and a per-axis scale.
    pub fn from_trs(
        position: &Vector3<f32>,
        rotation_deg: &Vector3<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(position)
            * Self::rotation_z(rotation_deg.z.to_radians())
            * Self::rotation_y(rotation_deg.y.to_radians())
            * Self::rotation_x(rotation_deg.x.to_radians())
            * Self::scaling_nonuniform(scale)
    }
}

/// The upper-left 3x3 block of a 4x4 matrix (rotation and scale, no translation).
#[inline]
pub fn upper_left_3x3(m: &Matrix4<f32>) -> Matrix3<f32> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Builds a matrix from row-major arrays, the way matrices are written in config files.
pub fn matrix_from_rows(rows: &[[f32; 4]; 4]) -> Matrix4<f32> {
    Matrix4::from_fn(|r, c| rows[r][c])
}
