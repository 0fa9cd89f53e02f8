pub mod boundary;
pub mod outline;

pub use boundary::{Boundary, BoundingBox};
pub use outline::OutlineShape;
