use crate::math::polygon_2d::signed_area_px;
use crate::math::{PixelPoint, Point2};

/// Axis-aligned bounding box of a pixel polygon (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

impl BoundingBox {
    /// Computes the bounding box of a point set, or `None` if it is empty.
    #[must_use]
    pub fn of(points: &[PixelPoint]) -> Option<Self> {
        let first = *points.first()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// Length of the longer side, in pixels.
    #[must_use]
    pub fn longest_side(&self) -> i32 {
        self.width().max(self.height())
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            f64::midpoint(f64::from(self.min.x), f64::from(self.max.x)),
            f64::midpoint(f64::from(self.min.y), f64::from(self.max.y)),
        )
    }
}

/// A closed polygon traced from a binary raster, in working-raster pixels.
///
/// The sign of `signed_area` encodes the winding: negative means clockwise.
/// Boundaries are never mutated, only replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    points: Vec<PixelPoint>,
    signed_area: f64,
    bbox: Option<BoundingBox>,
}

impl Boundary {
    #[must_use]
    pub fn new(points: Vec<PixelPoint>) -> Self {
        let signed_area = signed_area_px(&points);
        let bbox = BoundingBox::of(&points);
        Self {
            points,
            signed_area,
            bbox,
        }
    }

    /// The "nothing selected" boundary.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A boundary with fewer than three points encloses nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.len() < 3 || self.bbox.is_none_or(|b| b.longest_side() == 0)
    }

    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    #[must_use]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area < 0.0
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    /// Returns the boundary with non-negative signed area.
    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.is_clockwise() {
            let mut points = self.points.clone();
            points.reverse();
            Self::new(points)
        } else {
            self.clone()
        }
    }

    /// The points as floating-point pixel coordinates.
    #[must_use]
    pub fn to_points(&self) -> Vec<Point2> {
        self.points
            .iter()
            .map(|p| Point2::new(f64::from(p.x), f64::from(p.y)))
            .collect()
    }
}
