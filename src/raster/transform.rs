use crate::math::Point2;

/// Maps host display coordinates onto the padded working raster.
///
/// The host shows the source image (unpadded) scaled by `display_scale`;
/// the working raster may have been downscaled by `resize_factor` and then
/// padded. Click handling and index-map painting agree through this type only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterTransform {
    pub display_scale: f64,
    pub resize_factor: f64,
    pub padding: u32,
    pub width: u32,
    pub height: u32,
}

impl RasterTransform {
    /// Converts a display point to a raster pixel, clamped to the raster bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_raster(&self, display: &Point2) -> (u32, u32) {
        let k = self.resize_factor / self.display_scale;
        let pad = f64::from(self.padding);
        let x = (display.x * k + pad).floor();
        let y = (display.y * k + pad).floor();
        let max_x = f64::from(self.width.saturating_sub(1));
        let max_y = f64::from(self.height.saturating_sub(1));
        (x.clamp(0.0, max_x) as u32, y.clamp(0.0, max_y) as u32)
    }
}
