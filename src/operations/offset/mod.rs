//! Draw-and-detect offsetting.
//!
//! Instead of offsetting the boundary analytically, the boundary is stroked
//! onto an oversampled raster with the wall width as line thickness and the
//! resulting ring is traced again. Rasterised stroking resolves every overlap,
//! so the two traced edges are free of the cusps and loops an edge-by-edge
//! offset produces at concave corners.

mod simplify;

pub use simplify::filter_points;

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use tracing::{debug, warn};

use crate::error::{OutlineError, Result};
use crate::geometry::{Boundary, BoundingBox, OutlineShape};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;
use crate::raster::stroke_closed_mut;

/// Working-raster pixels per millimetre.
pub const SCALE_MULTIPLIER: f64 = 10.0;

/// Blank pixels kept between the stroke and the working-raster edge.
const MARGIN_SLACK: f64 = 4.0;

/// Largest working-raster side, in pixels. At [`SCALE_MULTIPLIER`] this is
/// about 800 mm of cutter.
pub const MAX_CANVAS_SIDE: f64 = 8_192.0;

/// Produces a ring of uniform width around a boundary, in millimetres.
#[derive(Debug)]
pub struct OffsetOutline<'a> {
    boundary: &'a Boundary,
    width: f64,
    target_size: f64,
    tolerance: f64,
}

impl<'a> OffsetOutline<'a> {
    /// Creates a new offset operation.
    ///
    /// `width` is the ring width and `tolerance` the point filter, both in
    /// millimetres; `target_size` is what the boundary's longest side maps to.
    #[must_use]
    pub fn new(boundary: &'a Boundary, width: f64, target_size: f64, tolerance: f64) -> Self {
        Self {
            boundary,
            width,
            target_size,
            tolerance,
        }
    }

    /// Executes draw-and-detect, returning the outer and inner edge of the ring.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::InvalidInput`] for an empty boundary, non-positive
    /// sizes or a working raster above [`MAX_CANVAS_SIDE`], and
    /// [`OutlineError::RingDegenerate`] if the traced ring does not have both an
    /// outer and an inner edge.
    pub fn execute(&self) -> Result<OutlineShape> {
        match self.trace()? {
            TracedRing {
                outer: Some(outer),
                inner: Some(inner),
            } => Ok(OutlineShape::ring(outer, inner)),
            traced => Err(OutlineError::RingDegenerate {
                contours: traced.usable_contours(),
            }
            .into()),
        }
    }

    /// Like [`execute`](Self::execute), but a ring that closed up becomes holeless.
    ///
    /// When the stroke fills the whole interior, the traced outer edge is kept
    /// as a solid outline so the piece still spans its full width. Only when
    /// nothing usable was traced does this fall back to
    /// [`solid_outline`](Self::solid_outline).
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::InvalidInput`] under the same conditions as
    /// [`execute`](Self::execute) or [`solid_outline`](Self::solid_outline).
    pub fn execute_or_fill(&self) -> Result<OutlineShape> {
        let traced = self.trace()?;
        let contours = traced.usable_contours();
        match traced {
            TracedRing {
                outer: Some(outer),
                inner: Some(inner),
            } => Ok(OutlineShape::ring(outer, inner)),
            TracedRing {
                outer: Some(outer),
                inner: None,
            } => {
                warn!(width = self.width, contours, "ring closed up, filling traced outer edge");
                Ok(OutlineShape::solid(outer))
            }
            TracedRing { outer: None, .. } => {
                warn!(width = self.width, contours, "ring degenerate, using boundary outline");
                self.solid_outline()
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn trace(&self) -> Result<TracedRing> {
        let frame = self.frame()?;
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(OutlineError::InvalidInput(format!(
                "ring width must be positive, got {}",
                self.width
            ))
            .into());
        }

        // Step 1: Scale the boundary into the oversampled working raster.
        let stroke = self.width * SCALE_MULTIPLIER;
        let margin = (stroke / 2.0).ceil() + MARGIN_SLACK;
        let px_per_boundary_px = frame.mm_per_px * SCALE_MULTIPLIER;
        let bbox = frame.bbox;
        let side = |extent: i32| (f64::from(extent) * px_per_boundary_px + 2.0 * margin).ceil() + 1.0;
        let (canvas_w, canvas_h) = (side(bbox.width()), side(bbox.height()));
        if canvas_w.max(canvas_h) > MAX_CANVAS_SIDE {
            return Err(OutlineError::InvalidInput(format!(
                "working raster {canvas_w}x{canvas_h} exceeds {MAX_CANVAS_SIDE} px per side \
                 (target size {} mm, ring width {} mm)",
                self.target_size, self.width
            ))
            .into());
        }
        let (canvas_w, canvas_h) = (canvas_w as u32, canvas_h as u32);
        let working: Vec<Point2> = self
            .boundary
            .points()
            .iter()
            .map(|p| {
                Point2::new(
                    f64::from(p.x - bbox.min.x) * px_per_boundary_px + margin,
                    f64::from(p.y - bbox.min.y) * px_per_boundary_px + margin,
                )
            })
            .collect();

        // Step 2: Stroke dark on light, then invert so the stroke is the foreground ring.
        let mut canvas = GrayImage::from_pixel(canvas_w, canvas_h, Luma([255]));
        stroke_closed_mut(&mut canvas, &working, stroke, Luma([0]));
        image::imageops::invert(&mut canvas);

        // Step 3: Re-trace and pick the ring's outer edge and its largest hole.
        let contours = find_contours::<i32>(&canvas);
        let outer = largest(&contours, |_, c| c.border_type == BorderType::Outer);
        let inner = outer.and_then(|(outer_idx, _)| {
            largest(&contours, |_, c| {
                c.border_type == BorderType::Hole && c.parent == Some(outer_idx)
            })
        });

        // Step 4: Back to millimetres, then thin out.
        let to_mm = |(_, c): (usize, &Contour<i32>)| -> Option<Vec<Point2>> {
            let pts: Vec<Point2> = c
                .points
                .iter()
                .map(|p| {
                    frame.working_to_mm(
                        (f64::from(p.x) - margin) / px_per_boundary_px,
                        (f64::from(p.y) - margin) / px_per_boundary_px,
                    )
                })
                .collect();
            Some(filter_points(&pts, self.tolerance)).filter(|pts| pts.len() >= 3)
        };
        let traced = TracedRing {
            outer: outer.and_then(&to_mm),
            inner: inner.and_then(&to_mm),
        };

        debug!(
            width = self.width,
            canvas_w,
            canvas_h,
            traced = contours.len(),
            outer = traced.outer.as_ref().map_or(0, Vec::len),
            inner = traced.inner.as_ref().map_or(0, Vec::len),
            "draw-and-detect ring"
        );
        Ok(traced)
    }

    /// The boundary itself in millimetres, without a hole.
    ///
    /// Used in place of the ring when nothing usable could be traced.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::InvalidInput`] for an empty boundary or when the
    /// filtered outline has fewer than 3 points.
    pub fn solid_outline(&self) -> Result<OutlineShape> {
        let frame = self.frame()?;
        let pts: Vec<Point2> = self
            .boundary
            .points()
            .iter()
            .map(|p| {
                frame.working_to_mm(
                    f64::from(p.x - frame.bbox.min.x),
                    f64::from(p.y - frame.bbox.min.y),
                )
            })
            .collect();
        let pts = filter_points(&pts, self.tolerance);
        if pts.len() < 3 || signed_area_2d(&pts).abs() <= 0.0 {
            return Err(OutlineError::InvalidInput(
                "boundary collapses below 3 points after filtering".into(),
            )
            .into());
        }
        Ok(OutlineShape::solid(pts))
    }

    fn frame(&self) -> Result<PhysicalFrame> {
        let bbox = self
            .boundary
            .bbox()
            .filter(|_| !self.boundary.is_empty())
            .ok_or_else(|| OutlineError::InvalidInput("boundary is empty".into()))?;
        if !self.target_size.is_finite() || self.target_size <= 0.0 {
            return Err(OutlineError::InvalidInput(format!(
                "target size must be positive, got {}",
                self.target_size
            ))
            .into());
        }
        Ok(PhysicalFrame {
            bbox,
            mm_per_px: self.target_size / f64::from(bbox.longest_side()),
        })
    }
}

/// Traced ring edges in millimetres; `None` where no usable loop was found.
#[derive(Debug)]
struct TracedRing {
    outer: Option<Vec<Point2>>,
    inner: Option<Vec<Point2>>,
}

impl TracedRing {
    fn usable_contours(&self) -> usize {
        usize::from(self.outer.is_some()) + usize::from(self.inner.is_some())
    }
}

/// Maps boundary pixels to millimetres: centred on the bounding box, y up.
#[derive(Debug, Clone, Copy)]
struct PhysicalFrame {
    bbox: BoundingBox,
    mm_per_px: f64,
}

impl PhysicalFrame {
    /// `(dx, dy)` are boundary pixels relative to the bounding-box minimum.
    fn working_to_mm(&self, dx: f64, dy: f64) -> Point2 {
        let center = self.bbox.center();
        let x = f64::from(self.bbox.min.x) + dx - center.x;
        let y = f64::from(self.bbox.min.y) + dy - center.y;
        Point2::new(x * self.mm_per_px, -y * self.mm_per_px)
    }
}

/// Index and contour with the largest enclosed area among those matching `keep`.
fn largest<F>(contours: &[Contour<i32>], keep: F) -> Option<(usize, &Contour<i32>)>
where
    F: Fn(usize, &Contour<i32>) -> bool,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in contours.iter().enumerate() {
        if !keep(i, c) {
            continue;
        }
        let area = contour_area(c);
        if best.is_none_or(|(_, a)| area > a) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| (i, &contours[i]))
}

fn contour_area(c: &Contour<i32>) -> f64 {
    let pts: Vec<Point2> = c
        .points
        .iter()
        .map(|p| Point2::new(f64::from(p.x), f64::from(p.y)))
        .collect();
    signed_area_2d(&pts).abs()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CutterError;
    use crate::math::polygon_2d::is_simple;
    use crate::math::PixelPoint;

    /// Regular polygon in boundary pixels, centred at (100, 100).
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn regular_polygon(radius: f64, sides: usize) -> Boundary {
        Boundary::new(
            (0..sides)
                .map(|i| {
                    let a = std::f64::consts::TAU * i as f64 / sides as f64;
                    PixelPoint::new(
                        (100.0 + radius * a.cos()).round() as i32,
                        (100.0 + radius * a.sin()).round() as i32,
                    )
                })
                .collect(),
        )
    }

    fn mean_radius(points: &[Point2]) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
        points
            .iter()
            .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
            .sum::<f64>()
            / n
    }

    #[test]
    fn convex_polygon_ring_has_requested_width() {
        let boundary = regular_polygon(50.0, 64);
        let width = 2.0;
        let shape = OffsetOutline::new(&boundary, width, 40.0, 0.15)
            .execute()
            .unwrap();
        let inner = shape.inner().unwrap();
        assert!(is_simple(shape.outer()), "outer ring edge self-intersects");
        assert!(is_simple(inner), "inner ring edge self-intersects");

        let separation = mean_radius(shape.outer()) - mean_radius(inner);
        // One working pixel of slack on each traced edge.
        let slack = 2.5 / SCALE_MULTIPLIER;
        assert!(
            (separation - width).abs() <= slack,
            "separation {separation} not within {slack} of {width}"
        );
    }

    #[test]
    fn ring_is_scaled_to_target_size_and_centred() {
        let boundary = regular_polygon(50.0, 64);
        let shape = OffsetOutline::new(&boundary, 1.0, 40.0, 0.0)
            .execute()
            .unwrap();
        let xs = shape.outer().iter().map(|p| p.x);
        let (lo, hi) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        // 40 mm across the boundary plus half the wall on each side.
        assert!((hi - lo - 41.0).abs() < 0.5, "outer span {}", hi - lo);
        assert!((hi + lo).abs() < 0.5, "outer ring not centred");
    }

    #[test]
    fn windings_are_normalised() {
        let boundary = regular_polygon(30.0, 32);
        let shape = OffsetOutline::new(&boundary, 1.0, 30.0, 0.15)
            .execute()
            .unwrap();
        assert!(signed_area_2d(shape.outer()) > 0.0);
        assert!(signed_area_2d(shape.inner().unwrap()) < 0.0);
    }

    #[test]
    fn oversized_wall_closes_the_ring() {
        // A 20 mm wall around a 10 mm shape leaves no hole.
        let boundary = regular_polygon(20.0, 16);
        let err = OffsetOutline::new(&boundary, 20.0, 10.0, 0.15)
            .execute()
            .unwrap_err();
        assert!(matches!(
            err,
            CutterError::Outline(OutlineError::RingDegenerate { contours: 1 })
        ));
    }

    #[test]
    fn closed_ring_fills_traced_outer_edge() {
        let boundary = regular_polygon(20.0, 16);
        let op = OffsetOutline::new(&boundary, 20.0, 10.0, 0.15);
        let filled = op.execute_or_fill().unwrap();
        assert!(!filled.has_hole());
        let span = |pts: &[Point2]| {
            let xs = pts.iter().map(|p| p.x);
            let (lo, hi) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
            hi - lo
        };
        // 10 mm subject plus 10 mm of stroke on each side.
        let filled_span = span(filled.outer());
        assert!((filled_span - 30.0).abs() < 1.0, "filled span {filled_span}");
        assert!(filled_span > span(op.solid_outline().unwrap().outer()) + 15.0);
    }

    #[test]
    fn open_ring_is_unchanged_by_fill() {
        let boundary = regular_polygon(30.0, 32);
        let op = OffsetOutline::new(&boundary, 1.0, 30.0, 0.15);
        assert_eq!(op.execute().unwrap(), op.execute_or_fill().unwrap());
    }

    #[test]
    fn oversized_working_raster_is_invalid_input() {
        let boundary = regular_polygon(50.0, 64);
        for (width, target_size) in [(1.0, 1e6), (1e4, 40.0)] {
            let op = OffsetOutline::new(&boundary, width, target_size, 0.15);
            assert!(op.execute().unwrap_err().is_invalid_input());
            assert!(op.execute_or_fill().unwrap_err().is_invalid_input());
        }
    }

    #[test]
    fn solid_outline_is_holeless_and_scaled() {
        let boundary = regular_polygon(50.0, 64);
        let shape = OffsetOutline::new(&boundary, 1.0, 40.0, 0.0)
            .solid_outline()
            .unwrap();
        assert!(!shape.has_hole());
        let r = mean_radius(shape.outer());
        assert!((r - 20.0).abs() < 0.5, "mean radius {r}");
    }

    #[test]
    fn empty_boundary_is_invalid_input() {
        let boundary = Boundary::empty();
        let err = OffsetOutline::new(&boundary, 1.0, 40.0, 0.1)
            .execute()
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn higher_tolerance_never_adds_vertices() {
        let boundary = regular_polygon(50.0, 64);
        let counts: Vec<usize> = [0.0, 0.15, 0.5, 1.5]
            .iter()
            .map(|&tol| {
                OffsetOutline::new(&boundary, 1.0, 40.0, tol)
                    .execute()
                    .unwrap()
                    .vertex_count()
            })
            .collect();
        for pair in counts.windows(2) {
            assert!(pair[1] <= pair[0], "vertex counts not monotonic: {counts:?}");
        }
    }

    #[test]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn higher_tolerance_never_adds_vertices_on_a_star() {
        let boundary = Boundary::new(
            (0..10)
                .map(|i| {
                    let r = if i % 2 == 0 { 50.0 } else { 25.0 };
                    let a = std::f64::consts::TAU * f64::from(i) / 10.0;
                    PixelPoint::new(
                        (100.0 + r * a.cos()).round() as i32,
                        (100.0 + r * a.sin()).round() as i32,
                    )
                })
                .collect(),
        );
        let counts: Vec<usize> = [0.0, 0.3, 1.2]
            .iter()
            .map(|&tol| {
                OffsetOutline::new(&boundary, 1.0, 40.0, tol)
                    .execute()
                    .unwrap()
                    .vertex_count()
            })
            .collect();
        for pair in counts.windows(2) {
            assert!(pair[1] < pair[0], "vertex counts not decreasing: {counts:?}");
        }
    }
}
