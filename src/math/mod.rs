#[cfg(test)]
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type (millimetres or working-raster pixels).
pub type Point2 = nalgebra::Point2<f64>;

/// Integer pixel coordinate as produced by contour tracing.
pub type PixelPoint = nalgebra::Point2<i32>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
