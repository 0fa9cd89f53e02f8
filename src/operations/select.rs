use image::RgbImage;
use tracing::debug;

use crate::geometry::Boundary;
use crate::math::Point2;
use crate::operations::classify::Classification;

/// A boundary picked by the user, with its highlighted preview.
#[derive(Debug, Clone)]
pub struct Selection {
    pub label: u16,
    /// The picked boundary, counter-clockwise.
    pub boundary: Boundary,
    /// Winding of the boundary as traced.
    pub was_clockwise: bool,
    /// Thresholded raster with the boundary stroked in red.
    pub preview: RgbImage,
}

/// Resolves a display-space point to a candidate boundary via the index map.
#[derive(Debug)]
pub struct SelectBoundary<'a> {
    classification: &'a Classification,
    point: Point2,
    display_scale: f64,
}

impl<'a> SelectBoundary<'a> {
    #[must_use]
    pub fn new(classification: &'a Classification, point: Point2, display_scale: f64) -> Self {
        Self {
            classification,
            point,
            display_scale,
        }
    }

    /// Returns the selection, or `None` when the point lies on background.
    #[must_use]
    pub fn execute(&self) -> Option<Selection> {
        let (x, y) = self
            .classification
            .transform(self.display_scale)
            .to_raster(&self.point);
        let label = self.classification.index_map().label_at(x, y);
        if label == 0 {
            debug!(x, y, "selection on background");
            return None;
        }
        let candidate = self.classification.candidate(label)?;
        debug!(x, y, label, area = candidate.boundary.area(), "boundary selected");
        Some(Selection {
            label,
            boundary: candidate.boundary.normalized(),
            was_clockwise: candidate.boundary.is_clockwise(),
            preview: self.classification.highlight(label),
        })
    }
}
