use crate::error::{Result, TessellationError};
use crate::geometry::OutlineShape;
use crate::math::{Point2, Point3};
use crate::tessellation::{triangulate_with_holes, TriangleMesh};

/// Extrudes an [`OutlineShape`] upward from `z = 0` to `z = height`.
///
/// Produces a closed, outward-facing triangle mesh: a bottom cap, a top cap
/// and one band of side quads for the outer loop and the hole.
#[derive(Debug)]
pub struct Extrude<'a> {
    shape: &'a OutlineShape,
    height: f64,
}

impl<'a> Extrude<'a> {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(shape: &'a OutlineShape, height: f64) -> Self {
        Self { shape, height }
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::InvalidParameters`] if the height is not
    /// positive or the outline has fewer than 3 points, and
    /// [`TessellationError::Failed`] if a cap cannot be triangulated.
    pub fn execute(&self) -> Result<TriangleMesh> {
        // Step 1: Validate.
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(TessellationError::InvalidParameters(format!(
                "extrusion height must be positive, got {}",
                self.height
            ))
            .into());
        }
        if self.shape.outer().len() < 3 {
            return Err(TessellationError::InvalidParameters(
                "outline needs at least 3 points".into(),
            )
            .into());
        }

        let loops: Vec<&[Point2]> = std::iter::once(self.shape.outer())
            .chain(self.shape.inner())
            .collect();
        let mut mesh = TriangleMesh::default();

        // Step 2: Caps. The bottom faces down, the top faces up.
        let cap = triangulate_with_holes(loops[0], &loops[1..])?;
        for [a, b, c] in &cap.triangles {
            mesh.push_triangle([at(a, 0.0), at(c, 0.0), at(b, 0.0)]);
            mesh.push_triangle([at(a, self.height), at(b, self.height), at(c, self.height)]);
        }

        // Step 3: One side band per loop.
        for pts in &loops {
            let n = pts.len();
            for j in 0..n {
                let j1 = (j + 1) % n;
                mesh.push_quad(
                    at(&pts[j], 0.0),
                    at(&pts[j1], 0.0),
                    at(&pts[j1], self.height),
                    at(&pts[j], self.height),
                );
            }
        }

        Ok(mesh)
    }
}

fn at(p: &Point2, z: f64) -> Point3 {
    Point3::new(p.x, p.y, z)
}
