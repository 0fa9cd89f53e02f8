use thiserror::Error;

/// Top-level error type for the cutter pipeline.
#[derive(Debug, Error)]
pub enum CutterError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Outline(#[from] OutlineError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors raised while ingesting or classifying a raster image.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no usable subject found in image")]
    NoSubjectFound,
}

/// Errors raised by the draw-and-detect outline generator.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The stroked ring did not yield an outer and an inner edge.
    #[error("ring degenerate: expected 2 usable contours, found {contours}")]
    RingDegenerate { contours: usize },
}

/// Errors related to tessellation and extrusion.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),

    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Errors related to exporting the solid.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export refused: {0}")]
    Refused(String),

    #[error("mesh serialization failed: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("failed to write {path:?}: {source}")]
    Persist {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

impl CutterError {
    /// Returns `true` for errors caused by bad caller input rather than by the pipeline.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Raster(RasterError::InvalidInput(_))
                | Self::Outline(OutlineError::InvalidInput(_))
                | Self::Tessellation(TessellationError::InvalidParameters(_))
        )
    }
}

/// Convenience type alias for results using [`CutterError`].
pub type Result<T> = std::result::Result<T, CutterError>;
