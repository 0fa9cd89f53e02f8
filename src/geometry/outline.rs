use crate::math::polygon_2d::{signed_area_2d, with_winding};
use crate::math::Point2;

/// A planar cross-section in millimetres: one outer loop and at most one hole.
///
/// The outer loop is counter-clockwise and the hole clockwise, which is the
/// orientation [`crate::operations::Extrude`] expects.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineShape {
    outer: Vec<Point2>,
    inner: Option<Vec<Point2>>,
}

impl OutlineShape {
    /// Creates a ring-shaped outline, normalising the winding of both loops.
    #[must_use]
    pub fn ring(outer: Vec<Point2>, inner: Vec<Point2>) -> Self {
        Self {
            outer: with_winding(outer, true),
            inner: Some(with_winding(inner, false)),
        }
    }

    /// Creates a holeless outline.
    #[must_use]
    pub fn solid(outer: Vec<Point2>) -> Self {
        Self {
            outer: with_winding(outer, true),
            inner: None,
        }
    }

    #[must_use]
    pub fn outer(&self) -> &[Point2] {
        &self.outer
    }

    #[must_use]
    pub fn inner(&self) -> Option<&[Point2]> {
        self.inner.as_deref()
    }

    #[must_use]
    pub fn has_hole(&self) -> bool {
        self.inner.is_some()
    }

    /// Area enclosed between the outer loop and the hole.
    #[must_use]
    pub fn area(&self) -> f64 {
        let hole = self.inner.as_deref().map_or(0.0, |h| signed_area_2d(h).abs());
        signed_area_2d(&self.outer).abs() - hole
    }

    /// Total number of vertices over both loops.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.outer.len() + self.inner.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(half: f64) -> Vec<Point2> {
        vec![
            Point2::new(-half, -half),
            Point2::new(half, -half),
            Point2::new(half, half),
            Point2::new(-half, half),
        ]
    }

    #[test]
    fn ring_normalises_winding() {
        let mut outer = square(2.0);
        outer.reverse();
        let shape = OutlineShape::ring(outer, square(1.0));
        assert!(signed_area_2d(shape.outer()) > 0.0);
        assert!(shape.inner().is_some_and(|h| signed_area_2d(h) < 0.0));
        assert!((shape.area() - 12.0).abs() < 1e-12);
        assert_eq!(shape.vertex_count(), 8);
    }

    #[test]
    fn solid_has_no_hole() {
        let shape = OutlineShape::solid(square(1.0));
        assert!(!shape.has_hole());
        assert!((shape.area() - 4.0).abs() < 1e-12);
    }
}
