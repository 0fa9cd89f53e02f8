//! Turns a picture of a shape into a printable cookie-cutter mesh.
//!
//! The pipeline classifies closed boundaries in a raster image, offsets the
//! chosen boundary by drawing and re-tracing it, extrudes the resulting rings
//! into a wall and a handle, and serialises the solid as binary STL.

pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod raster;
pub mod session;
pub mod tessellation;

pub use config::{CutterConfig, CutterConfigPatch, PipelineSettings};
pub use error::{CutterError, Result};
pub use session::{Event, EventOutcome, Session, Snapshot};
