//! Raster ingestion and the pixel-level primitives of the pipeline.
//!
//! Everything here works on `image` buffers and delegates filtering,
//! contour tracing and drawing to `imageproc`.

mod stroke;
mod threshold;
mod transform;

pub use stroke::stroke_closed_mut;
pub use threshold::{adaptive_threshold, flatten_to_gray, pad_replicate, BinaryRaster};
pub use transform::RasterTransform;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::error::{RasterError, Result};

/// A decoded RGBA image handed to the pipeline by the host.
///
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    /// Wraps a tightly packed RGBA8 buffer.
    ///
    /// A zero width or height is treated as 1. A zero-size image with an empty
    /// buffer becomes a single white pixel.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidInput`] if the buffer length does not match
    /// the (clamped) dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let degenerate = width == 0 || height == 0;
        let width = width.max(1);
        let height = height.max(1);
        let pixels = if degenerate && pixels.is_empty() {
            vec![255; 4 * width as usize * height as usize]
        } else {
            pixels
        };
        let len = pixels.len();
        let pixels = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            RasterError::InvalidInput(format!(
                "pixel buffer of {len} bytes does not match {width}x{height} RGBA"
            ))
        })?;
        Ok(Self { pixels })
    }

    /// Converts any decoded image into an RGBA raster.
    #[must_use]
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            pixels: image.to_rgba8(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Downscales so the longest side is at most `max_dimension`.
    ///
    /// Returns the resized pixels and the factor applied (1.0 when untouched).
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn fit_within(&self, max_dimension: u32) -> (RgbaImage, f64) {
        let longest = self.width().max(self.height());
        if max_dimension == 0 || longest <= max_dimension {
            return (self.pixels.clone(), 1.0);
        }
        let factor = f64::from(max_dimension) / f64::from(longest);
        let w = ((f64::from(self.width()) * factor).round() as u32).max(1);
        let h = ((f64::from(self.height()) * factor).round() as u32).max(1);
        (
            image::imageops::resize(&self.pixels, w, h, FilterType::Triangle),
            factor,
        )
    }
}
