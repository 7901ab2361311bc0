use crate::core::pipeline::Interpolatable;
use nalgebra::Vector3;

const EPSILON: f32 = 1e-5;

/// Compute perspective-correct barycentric coordinates (alpha', beta', gamma').
///
///   wa = alpha * (1/w1), wb = beta * (1/w2), wc = gamma * (1/w3)
///   alpha' = wa / (wa + wb + wc), ...
///
/// Returns `None` when the weighted sum is near zero.
pub fn perspective_correct_barycentric(
    bary: Vector3<f32>,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3<f32>> {
    let inv_w1 = if w1.abs() > EPSILON { 1.0 / w1 } else { 1.0 };
    let inv_w2 = if w2.abs() > EPSILON { 1.0 / w2 } else { 1.0 };
    let inv_w3 = if w3.abs() > EPSILON { 1.0 / w3 } else { 1.0 };

    let wa = bary.x * inv_w1;
    let wb = bary.y * inv_w2;
    let wc = bary.z * inv_w3;

    let sum = wa + wb + wc;
    if sum.abs() < EPSILON {
        return None;
    }
    let inv_sum = 1.0 / sum;
    Some(Vector3::new(wa * inv_sum, wb * inv_sum, wc * inv_sum))
}

/// Blends three per-vertex varyings with the given barycentric weights.
#[inline]
pub fn interpolate<V: Interpolatable>(bary: Vector3<f32>, varyings: &[V; 3]) -> V {
    varyings[0] * bary.x + varyings[1] * bary.y + varyings[2] * bary.z
}
