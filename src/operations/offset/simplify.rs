use crate::math::Point2;

/// Drops points that stay within `tolerance` of the last kept point on both axes.
///
/// A point is kept when it differs from the previously kept point by more
/// than `tolerance` in x or in y. The first point is always kept.
///
/// The kept count only shrinks with `tolerance` on walks that do not double
/// back on themselves, such as traced contour borders. A walk that retraces
/// its steps can keep more points at a larger tolerance.
#[must_use]
pub fn filter_points(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut kept = Vec::with_capacity(points.len());
    kept.push(first);
    let mut last = first;
    for &p in &points[1..] {
        if (p.x - last.x).abs() > tolerance || (p.y - last.y).abs() > tolerance {
            kept.push(p);
            last = p;
        }
    }
    kept
}
