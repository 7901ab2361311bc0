pub mod interpolation;
pub mod transform;
