use image::{GrayImage, Luma, RgbaImage};
use imageproc::filter::box_filter;

use super::RasterImage;
use crate::config::PipelineSettings;

/// A padded, binarised working raster (foreground = 255).
#[derive(Debug, Clone)]
pub struct BinaryRaster {
    pub binary: GrayImage,
    /// Border width added on every side, in working pixels.
    pub padding: u32,
    /// Downscale factor applied to the source image before padding.
    pub resize_factor: f64,
}

impl BinaryRaster {
    /// Runs resize → grayscale → pad → adaptive threshold.
    #[must_use]
    pub fn from_image(image: &RasterImage, settings: &PipelineSettings) -> Self {
        let (rgba, resize_factor) = image.fit_within(settings.max_working_dimension);
        let gray = flatten_to_gray(&rgba);
        let padded = pad_replicate(&gray, settings.padding);
        let binary = adaptive_threshold(
            &padded,
            settings.threshold_radius,
            settings.threshold_offset,
        );
        Self {
            binary,
            padding: settings.padding,
            resize_factor,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.binary.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.binary.height()
    }
}

/// Converts RGBA to luma, compositing transparent pixels over white.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn flatten_to_gray(rgba: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        let alpha = f64::from(a) / 255.0;
        let composited = 255.0 - (255.0 - luma) * alpha;
        Luma([composited.round().clamp(0.0, 255.0) as u8])
    })
}

/// Adds a `margin`-pixel border on every side by replicating the edge pixels.
#[must_use]
pub fn pad_replicate(gray: &GrayImage, margin: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w + 2 * margin, h + 2 * margin, |x, y| {
        let sx = x.saturating_sub(margin).min(w - 1);
        let sy = y.saturating_sub(margin).min(h - 1);
        *gray.get_pixel(sx, sy)
    })
}

/// Marks pixels darker than their local box mean by more than `offset` as foreground.
///
/// Flat regions, whatever their brightness, stay background; edges and dark
/// strokes of the subject become foreground.
#[must_use]
pub fn adaptive_threshold(gray: &GrayImage, radius: u32, offset: u8) -> GrayImage {
    let mean = box_filter(gray, radius, radius);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = u16::from(gray.get_pixel(x, y).0[0]) + u16::from(offset);
        if value < u16::from(mean.get_pixel(x, y).0[0]) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
