mod triangulate;

pub use triangulate::{triangulate_with_holes, CapTriangulation};

use crate::math::{Point3, Vector3, TOLERANCE};

/// A triangle mesh with flat per-vertex normals.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a counter-clockwise triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Appends a triangle with its own three vertices and a flat normal.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_triangle(&mut self, corners: [Point3; 3]) {
        let normal = face_normal(&corners);
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 3]);
        self.indices.push([base, base + 1, base + 2]);
    }

    /// Appends a planar quad `a → b → c → d` as two triangles.
    pub fn push_quad(&mut self, a: Point3, b: Point3, c: Point3, d: Point3) {
        self.push_triangle([a, b, c]);
        self.push_triangle([a, c, d]);
    }

    /// Appends all triangles of `other`, re-basing its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &TriangleMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|[a, b, c]| [a + base, b + base, c + base]),
        );
    }

    /// Moves every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Iterates over triangle corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.iter().map(|&[a, b, c]| {
            [
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            ]
        })
    }

    /// Axis-aligned bounds `(min, max)`, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (
                Point3::new(lo.x.min(v.x), lo.y.min(v.y), lo.z.min(v.z)),
                Point3::new(hi.x.max(v.x), hi.y.max(v.y), hi.z.max(v.z)),
            )
        }))
    }
}

/// Unit normal of a counter-clockwise triangle; `+Z` for degenerate ones.
#[must_use]
pub fn face_normal(corners: &[Point3; 3]) -> Vector3 {
    let n = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
    let len = n.norm();
    if len < TOLERANCE {
        Vector3::z()
    } else {
        n / len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn quad_produces_two_upward_triangles() {
        let mut mesh = TriangleMesh::default();
        mesh.push_quad(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0));
        assert_eq!(mesh.triangle_count(), 2);
        for n in &mesh.normals {
            assert!((n.z - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn merge_rebases_indices() {
        let mut a = TriangleMesh::default();
        a.push_triangle([p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        let mut b = a.clone();
        b.translate(Vector3::new(0.0, 0.0, 5.0));
        a.merge(&b);
        assert_eq!(a.triangle_count(), 2);
        assert_eq!(a.indices[1], [3, 4, 5]);
        let (lo, hi) = a.bounds().unwrap_or_else(|| panic!("bounds missing"));
        assert!((lo.z).abs() < 1e-12);
        assert!((hi.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_triangle_gets_fallback_normal() {
        let n = face_normal(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);
        assert_eq!(n, Vector3::z());
    }
}
