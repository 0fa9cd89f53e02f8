use image::{ImageBuffer, Luma};

use super::Candidate;
use crate::raster::stroke_closed_mut;

/// Label raster used for click-to-select. 0 means background.
pub type LabelImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// A raster, the size of the working image, holding the label of the nearest
/// candidate stroke at each pixel.
#[derive(Debug, Clone)]
pub struct IndexMap {
    labels: LabelImage,
}

impl IndexMap {
    /// Paints every candidate once per pass, coarse to fine.
    ///
    /// Later (thinner) passes overwrite earlier ones, so the pixels closest to
    /// a stroke keep its label even when two boundaries run side by side.
    #[must_use]
    pub fn paint(width: u32, height: u32, candidates: &[Candidate], passes: &[u32]) -> Self {
        let mut labels = LabelImage::new(width, height);
        for &stroke in passes {
            for candidate in candidates {
                stroke_closed_mut(
                    &mut labels,
                    &candidate.boundary.to_points(),
                    f64::from(stroke),
                    Luma([candidate.label]),
                );
            }
        }
        Self { labels }
    }

    /// Label at a raster pixel; 0 outside the map.
    #[must_use]
    pub fn label_at(&self, x: u32, y: u32) -> u16 {
        if x < self.labels.width() && y < self.labels.height() {
            self.labels.get_pixel(x, y).0[0]
        } else {
            0
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.labels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.labels.height()
    }

    #[must_use]
    pub fn as_image(&self) -> &LabelImage {
        &self.labels
    }
}
