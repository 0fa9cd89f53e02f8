use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};
use tracing::warn;

use crate::error::{CutterError, Result, TessellationError};
use crate::math::Point2;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangles covering a polygon with holes.
#[derive(Debug, Clone, Default)]
pub struct CapTriangulation {
    /// Counter-clockwise triangles.
    pub triangles: Vec<[Point2; 3]>,
    /// Loop edges left out because they crossed an earlier constraint.
    pub skipped_constraints: usize,
}

impl CapTriangulation {
    /// Total area covered by the triangles.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|[a, b, c]| 0.5 * (b - a).perp(&(c - a)))
            .sum()
    }
}

/// Triangulates a polygon with holes using a constrained Delaunay triangulation.
///
/// Every loop edge becomes a constraint unless it would cross an already
/// inserted one. A triangle is kept when its centroid lies inside `outer` and
/// outside every hole (even-odd rule over all loops), so a skipped constraint
/// never turns hole triangles into material.
///
/// # Errors
///
/// Returns [`TessellationError::Failed`] if a loop has fewer than 3 points or a
/// point cannot be inserted (e.g. non-finite coordinates).
pub fn triangulate_with_holes(outer: &[Point2], holes: &[&[Point2]]) -> Result<CapTriangulation> {
    let mut cdt = Cdt::new();
    let mut skipped_constraints = insert_constraint_loop(&mut cdt, outer)?;
    for hole in holes {
        skipped_constraints += insert_constraint_loop(&mut cdt, hole)?;
    }
    if skipped_constraints > 0 {
        warn!(skipped = skipped_constraints, "skipped crossing constraint edges");
    }

    let loops: Vec<&[Point2]> = std::iter::once(outer).chain(holes.iter().copied()).collect();
    let mut triangles = Vec::with_capacity(cdt.num_inner_faces());
    for face in cdt.inner_faces() {
        let [a, b, c] = face.vertices().map(|v| {
            let pos = v.position();
            Point2::new(pos.x, pos.y)
        });
        let centroid = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        if crossings(&loops, &centroid) % 2 == 0 {
            continue;
        }
        let cross = (b - a).perp(&(c - a));
        if cross > 0.0 {
            triangles.push([a, b, c]);
        } else if cross < 0.0 {
            triangles.push([a, c, b]);
        }
    }

    Ok(CapTriangulation {
        triangles,
        skipped_constraints,
    })
}

/// Inserts a closed loop of points and constrains its edges.
///
/// Returns how many edges had to be skipped.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<usize> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let handles = points
        .iter()
        .map(|pt| {
            cdt.insert(SpadePoint2::new(pt.x, pt.y))
                .map_err(|e: InsertionError| {
                    CutterError::from(TessellationError::Failed(format!("CDT insert: {e}")))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut skipped = 0usize;
    for (i, &from) in handles.iter().enumerate() {
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        } else {
            skipped += 1;
        }
    }
    Ok(skipped)
}

/// Number of loop edges a ray from `p` towards +x crosses.
fn crossings(loops: &[&[Point2]], p: &Point2) -> usize {
    loops
        .iter()
        .flat_map(|pts| {
            let n = pts.len();
            (0..n).map(move |i| (pts[i], pts[(i + 1) % n]))
        })
        .filter(|(a, b)| {
            (a.y > p.y) != (b.y > p.y) && p.x < a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x)
        })
        .count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
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
    fn square_triangulates_into_two_ccw_triangles() {
        let cap = triangulate_with_holes(&square(1.0), &[]).unwrap();
        assert_eq!(cap.triangles.len(), 2);
        assert_eq!(cap.skipped_constraints, 0);
        assert!((cap.area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn hole_is_excluded_from_cover() {
        let inner = square(1.0);
        let cap = triangulate_with_holes(&square(2.0), &[&inner]).unwrap();
        assert!((cap.area() - 12.0).abs() < 1e-9);
        for [a, b, c] in &cap.triangles {
            let centroid = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            assert!(centroid.x.abs() > 1.0 || centroid.y.abs() > 1.0);
        }
    }

    #[test]
    fn concave_outline_keeps_only_interior() {
        // U shape: the notch between the arms must stay empty.
        let u = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 3.0),
            Point2::new(2.0, 3.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(0.0, 3.0),
        ];
        let cap = triangulate_with_holes(&u, &[]).unwrap();
        assert!((cap.area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn crossing_hole_edge_is_counted_not_filled() {
        // The hole's last edge cuts back across its first one.
        let bow_tie = vec![
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, -1.0),
            Point2::new(-1.0, 2.0),
        ];
        let cap = triangulate_with_holes(&square(3.0), &[&bow_tie]).unwrap();
        assert!(cap.skipped_constraints > 0);
        assert!(cap.area() < 36.0);
    }

    #[test]
    fn too_short_loop_fails() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_with_holes(&line, &[]).is_err());
    }
}
