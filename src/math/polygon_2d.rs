#[cfg(test)]
use super::intersect_2d::segment_segment_intersect_2d;
use super::{PixelPoint, Point2, Vector2, TOLERANCE};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise (in a y-up frame).
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Signed area of an integer pixel polygon, computed exactly in `i64`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn signed_area_px(points: &[PixelPoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum: i64 = 0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += i64::from(points[i].x) * i64::from(points[j].y)
            - i64::from(points[j].x) * i64::from(points[i].y);
    }
    sum as f64 * 0.5
}

/// Returns the polygon with counter-clockwise (`ccw = true`) or clockwise winding.
#[must_use]
pub fn with_winding(mut points: Vec<Point2>, ccw: bool) -> Vec<Point2> {
    let area = signed_area_2d(&points);
    if (area > 0.0) != ccw && area.abs() > TOLERANCE {
        points.reverse();
    }
    points
}

/// Computes the normalized direction from point `a` to point `b`.
///
/// Returns `None` for a zero-length segment.
#[must_use]
pub fn segment_direction(a: &Point2, b: &Point2) -> Option<Vector2> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(d / len)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Checks that no two non-adjacent edges of a closed polygon intersect.
///
/// Quadratic in the vertex count.
#[cfg(test)]
#[must_use]
pub fn is_simple(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a0 = &points[i];
        let a1 = &points[(i + 1) % n];
        for j in (i + 2)..n {
            // First and last edges share vertex 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = &points[j];
            let b1 = &points[(j + 1) % n];
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert!((signed_area_2d(&square()) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square();
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!((signed_area_2d(&[Point2::new(0.0, 0.0)])).abs() < TOLERANCE);
        assert!((signed_area_2d(&[])).abs() < TOLERANCE);
    }

    #[test]
    fn pixel_area_matches_float_area() {
        let px = [
            PixelPoint::new(0, 0),
            PixelPoint::new(4, 0),
            PixelPoint::new(4, 3),
            PixelPoint::new(0, 3),
        ];
        assert!((signed_area_px(&px) - 12.0).abs() < TOLERANCE);
    }

    #[test]
    fn with_winding_flips_only_when_needed() {
        let ccw = with_winding(square(), true);
        assert!(signed_area_2d(&ccw) > 0.0);
        let cw = with_winding(square(), false);
        assert!(signed_area_2d(&cw) < 0.0);
    }

    #[test]
    fn segment_direction_zero_length() {
        let a = Point2::new(1.0, 1.0);
        assert!(segment_direction(&a, &a).is_none());
    }

    #[test]
    fn left_normal_basic() {
        let n = left_normal(Vector2::new(1.0, 0.0));
        assert!((n.x).abs() < TOLERANCE);
        assert!((n.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn square_is_simple_bowtie_is_not() {
        assert!(is_simple(&square()));
        let bowtie = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(!is_simple(&bowtie));
    }
}
