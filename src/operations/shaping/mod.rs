mod bevel;
mod extrude;

pub use bevel::{Bevel, BevelEnd, BevelProfile, Terrace};
pub use extrude::Extrude;
