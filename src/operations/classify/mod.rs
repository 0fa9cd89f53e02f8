//! Boundary classification: trace every closed border of the thresholded
//! image, drop the frame and the noise, label what is left.

mod index_map;

pub use index_map::{IndexMap, LabelImage};

use image::{Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use tracing::{debug, info, warn};

use crate::config::PipelineSettings;
use crate::error::{RasterError, Result};
use crate::geometry::Boundary;
use crate::math::PixelPoint;
use crate::raster::{stroke_closed_mut, BinaryRaster, RasterImage, RasterTransform};

/// Stroke width of the selected boundary in highlight previews.
const HIGHLIGHT_STROKE: f64 = 3.0;

/// A selectable boundary and its stable label (1-based, in trace order).
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub label: u16,
    pub boundary: Boundary,
}

/// Output of [`ClassifyBoundaries`]: the candidate set, its index map and
/// the default active boundary.
#[derive(Debug, Clone)]
pub struct Classification {
    raster: BinaryRaster,
    candidates: Vec<Candidate>,
    index_map: IndexMap,
    default_label: Option<u16>,
    frame_cutoff: f64,
}

impl Classification {
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    #[must_use]
    pub fn candidate(&self, label: u16) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.label == label)
    }

    #[must_use]
    pub fn index_map(&self) -> &IndexMap {
        &self.index_map
    }

    #[must_use]
    pub fn raster(&self) -> &BinaryRaster {
        &self.raster
    }

    /// Boundaries at or above this area are the image frame.
    #[must_use]
    pub fn frame_cutoff(&self) -> f64 {
        self.frame_cutoff
    }

    #[must_use]
    pub fn default_label(&self) -> Option<u16> {
        self.default_label
    }

    /// The largest candidate, or [`RasterError::NoSubjectFound`].
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::NoSubjectFound`] when no boundary survived filtering.
    pub fn require_subject(&self) -> Result<&Candidate> {
        self.default_label
            .and_then(|label| self.candidate(label))
            .ok_or_else(|| RasterError::NoSubjectFound.into())
    }

    /// The default active boundary with counter-clockwise winding, or an empty one.
    #[must_use]
    pub fn default_boundary(&self) -> Boundary {
        self.require_subject()
            .map_or_else(|_| Boundary::empty(), |c| c.boundary.normalized())
    }

    /// Display → raster mapping for this classification's working raster.
    #[must_use]
    pub fn transform(&self, display_scale: f64) -> RasterTransform {
        RasterTransform {
            display_scale,
            resize_factor: self.raster.resize_factor,
            padding: self.raster.padding,
            width: self.index_map.width(),
            height: self.index_map.height(),
        }
    }

    /// Renders a fresh copy of the thresholded raster with `label` stroked in red.
    ///
    /// Unknown labels produce the plain raster.
    #[must_use]
    pub fn highlight(&self, label: u16) -> RgbImage {
        let binary = &self.raster.binary;
        let mut preview = RgbImage::from_fn(binary.width(), binary.height(), |x, y| {
            let v = binary.get_pixel(x, y).0[0];
            Rgb([v, v, v])
        });
        if let Some(candidate) = self.candidate(label) {
            stroke_closed_mut(
                &mut preview,
                &candidate.boundary.to_points(),
                HIGHLIGHT_STROKE,
                Rgb([255, 0, 0]),
            );
        }
        preview
    }
}

/// Enumerates and filters the closed boundaries of an image.
#[derive(Debug)]
pub struct ClassifyBoundaries<'a> {
    image: &'a RasterImage,
    settings: &'a PipelineSettings,
}

impl<'a> ClassifyBoundaries<'a> {
    #[must_use]
    pub fn new(image: &'a RasterImage, settings: &'a PipelineSettings) -> Self {
        Self { image, settings }
    }

    /// Runs the classification.
    ///
    /// A result with no candidates is not an error here; callers use
    /// [`Classification::require_subject`] to surface `NoSubjectFound`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidInput`] if the frame/noise ratios are not
    /// in `(0, 1]`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<Classification> {
        let ratios_ok = |r: f64| r.is_finite() && r > 0.0 && r <= 1.0;
        if !ratios_ok(self.settings.frame_ratio) || !ratios_ok(self.settings.noise_ratio) {
            return Err(RasterError::InvalidInput(format!(
                "frame_ratio {} and noise_ratio {} must be in (0, 1]",
                self.settings.frame_ratio, self.settings.noise_ratio
            ))
            .into());
        }

        // Step 1: Pad and binarise.
        let raster = BinaryRaster::from_image(self.image, self.settings);
        let padded_area = f64::from(raster.width()) * f64::from(raster.height());
        let frame_cutoff = self.settings.frame_ratio * padded_area;
        let noise_floor = self.settings.noise_ratio * frame_cutoff;

        // Step 2: Trace borders. Hole borders are the inside edge of a stroke,
        // not a subject outline.
        let contours = find_contours::<i32>(&raster.binary);
        let traced = contours.len();

        // Step 3: Area filter and labelling.
        let mut candidates = Vec::new();
        let mut frames = 0usize;
        for contour in contours {
            if contour.border_type != BorderType::Outer {
                continue;
            }
            let boundary = Boundary::new(
                contour
                    .points
                    .iter()
                    .map(|p| PixelPoint::new(p.x, p.y))
                    .collect(),
            );
            let area = boundary.area();
            if area >= frame_cutoff {
                frames += 1;
                continue;
            }
            if area <= noise_floor {
                continue;
            }
            if candidates.len() >= usize::from(u16::MAX) {
                warn!("candidate label space exhausted; ignoring remaining boundaries");
                break;
            }
            let label = (candidates.len() + 1) as u16;
            candidates.push(Candidate { label, boundary });
        }

        // Step 4: Default = largest candidate (first one on ties).
        let default = candidates.iter().fold(None::<&Candidate>, |best, c| match best {
            Some(b) if b.boundary.area() >= c.boundary.area() => Some(b),
            _ => Some(c),
        });
        let default_label = default.map(|c| c.label);
        if let Some(c) = default {
            debug!(
                label = c.label,
                area = c.boundary.area(),
                clockwise = c.boundary.is_clockwise(),
                "default boundary"
            );
        }

        // Step 5: Index map for click selection.
        let index_map = IndexMap::paint(
            raster.width(),
            raster.height(),
            &candidates,
            &self.settings.index_stroke_passes,
        );

        info!(
            traced,
            frames,
            candidates = candidates.len(),
            width = raster.width(),
            height = raster.height(),
            "classified boundaries"
        );

        Ok(Classification {
            raster,
            candidates,
            index_map,
            default_label,
            frame_cutoff,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn image_with_discs(size: u32, discs: &[(f64, f64, f64)]) -> RasterImage {
        let img = RgbaImage::from_fn(size, size, |x, y| {
            let inside = discs.iter().any(|&(cx, cy, r)| {
                let dx = f64::from(x) - cx;
                let dy = f64::from(y) - cy;
                dx * dx + dy * dy <= r * r
            });
            if inside {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        RasterImage::new(size, size, img.into_raw()).unwrap()
    }

    #[test]
    fn single_disc_yields_one_candidate() {
        let settings = PipelineSettings::default();
        let image = image_with_discs(200, &[(100.0, 100.0, 60.0)]);
        let result = ClassifyBoundaries::new(&image, &settings).execute().unwrap();
        assert_eq!(result.candidates().len(), 1);
        assert_eq!(result.default_label(), Some(1));
        let boundary = result.default_boundary();
        assert!(!boundary.is_clockwise());
        let expected = std::f64::consts::PI * 60.0 * 60.0;
        assert!((boundary.area() - expected).abs() / expected < 0.1);
    }

    #[test]
    fn default_is_largest_between_noise_floor_and_frame() {
        let settings = PipelineSettings::default();
        let image = image_with_discs(
            200,
            &[(55.0, 55.0, 40.0), (145.0, 145.0, 50.0), (170.0, 30.0, 4.0)],
        );
        let result = ClassifyBoundaries::new(&image, &settings).execute().unwrap();
        let cutoff = result.frame_cutoff();
        let floor = settings.noise_ratio * cutoff;
        let best = result
            .candidates()
            .iter()
            .map(|c| c.boundary.area())
            .fold(0.0, f64::max);
        assert_eq!(result.candidates().len(), 2, "tiny disc is noise");
        let default = result.require_subject().unwrap();
        assert!((default.boundary.area() - best).abs() < f64::EPSILON);
        assert!(default.boundary.area() < cutoff && default.boundary.area() > floor);
        // Labels are consecutive from 1.
        let labels: Vec<u16> = result.candidates().iter().map(|c| c.label).collect();
        assert_eq!(labels, vec![1, 2]);
    }

    #[test]
    fn blank_image_has_no_subject() {
        let settings = PipelineSettings::default();
        let image = image_with_discs(50, &[]);
        let result = ClassifyBoundaries::new(&image, &settings).execute().unwrap();
        assert!(result.candidates().is_empty());
        assert!(result.default_boundary().is_empty());
        assert!(matches!(
            result.require_subject(),
            Err(crate::error::CutterError::Raster(RasterError::NoSubjectFound))
        ));
    }

    #[test]
    fn index_map_labels_subject_outline() {
        let settings = PipelineSettings::default();
        let image = image_with_discs(200, &[(100.0, 100.0, 60.0)]);
        let result = ClassifyBoundaries::new(&image, &settings).execute().unwrap();
        let pad = settings.padding;
        // Leftmost point of the disc outline, in raster space.
        assert_eq!(result.index_map().label_at(40 + pad, 100 + pad), 1);
        assert_eq!(result.index_map().label_at(100 + pad, 100 + pad), 0);
    }

    #[test]
    fn highlight_marks_selected_boundary_in_red() {
        let settings = PipelineSettings::default();
        let image = image_with_discs(200, &[(100.0, 100.0, 60.0)]);
        let result = ClassifyBoundaries::new(&image, &settings).execute().unwrap();
        let preview = result.highlight(1);
        assert!(preview.pixels().any(|p| *p == Rgb([255, 0, 0])));
        let plain = result.highlight(99);
        assert!(!plain.pixels().any(|p| *p == Rgb([255, 0, 0])));
    }

    #[test]
    fn invalid_ratios_are_rejected() {
        let settings = PipelineSettings {
            frame_ratio: 1.5,
            ..PipelineSettings::default()
        };
        let image = image_with_discs(20, &[]);
        let err = ClassifyBoundaries::new(&image, &settings).execute().unwrap_err();
        assert!(err.is_invalid_input());
    }
}
