//! Solid assembly: wall, optional relief base and handle, stacked along +Z
//! with the cutting edge on `z = 0`.

use tracing::debug;

use crate::config::CutterConfig;
use crate::error::Result;
use crate::geometry::{Boundary, OutlineShape};
use crate::math::Vector3;
use crate::operations::offset::OffsetOutline;
use crate::operations::shaping::{Bevel, BevelEnd, Extrude};
use crate::tessellation::TriangleMesh;

/// Width of the handle flange, independent of the wall thickness.
pub const HANDLE_WIDTH: f64 = 5.0;
/// Height of the handle flange.
pub const HANDLE_THICKNESS: f64 = 2.0;

const HANDLE_ROUND_THICKNESS: f64 = 0.5;
const HANDLE_ROUND_SIZE: f64 = 0.5;
const HANDLE_ROUND_SEGMENTS: u32 = 4;

const WALL_BEVEL_SEGMENTS: u32 = 4;

/// Role of a piece within the assembled solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// The cutting wall, straight or with a bevelled tip.
    Wall,
    /// The wider straight base the bevelled tip sits on.
    WallRelief,
    /// The flange on top of the wall.
    Handle,
}

#[derive(Debug, Clone)]
pub struct SolidPiece {
    pub kind: PieceKind,
    pub mesh: TriangleMesh,
}

/// The printable cutter. Rebuilt in full on every change, never edited.
#[derive(Debug, Clone, Default)]
pub struct Solid {
    pieces: Vec<SolidPiece>,
}

impl Solid {
    /// The solid of an empty boundary: nothing to render or export.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.iter().all(|p| p.mesh.is_empty())
    }

    #[must_use]
    pub fn pieces(&self) -> &[SolidPiece] {
        &self.pieces
    }

    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn piece(&self, kind: PieceKind) -> Option<&SolidPiece> {
        self.pieces.iter().find(|p| p.kind == kind)
    }

    /// All pieces merged into one mesh.
    #[must_use]
    pub fn merged(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::default();
        for piece in &self.pieces {
            mesh.merge(&piece.mesh);
        }
        mesh
    }
}

/// Builds the [`Solid`] for a boundary and a configuration snapshot.
#[derive(Debug)]
pub struct AssembleSolid<'a> {
    boundary: &'a Boundary,
    config: &'a CutterConfig,
}

impl<'a> AssembleSolid<'a> {
    #[must_use]
    pub fn new(boundary: &'a Boundary, config: &'a CutterConfig) -> Self {
        Self { boundary, config }
    }

    /// Executes the assembly.
    ///
    /// An empty boundary yields [`Solid::empty`]. A ring that closes up is
    /// filled and logged.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the configuration fails validation,
    /// or a tessellation error if a piece cannot be extruded.
    pub fn execute(&self) -> Result<Solid> {
        self.config.validate()?;
        if self.boundary.is_empty() {
            debug!("empty boundary, empty solid");
            return Ok(Solid::empty());
        }

        let depth = self.config.depth;
        let wall = self.config.wall_thickness;
        let mut pieces = Vec::with_capacity(3);

        // Step 1: Cutting wall, with the relief base when bevelled.
        if self.config.bevel_enabled {
            let half = depth / 2.0;
            let tip = self.terraced(
                wall / 2.0,
                half,
                Bevel::linear(half, wall / 2.0, WALL_BEVEL_SEGMENTS, BevelEnd::Bottom),
            )?;
            pieces.push(SolidPiece {
                kind: PieceKind::Wall,
                mesh: tip,
            });

            let relief_outline = self.outline(3.0 * wall / 2.0)?;
            let mut base = Extrude::new(&relief_outline, half).execute()?;
            base.translate(Vector3::new(0.0, 0.0, half));
            pieces.push(SolidPiece {
                kind: PieceKind::WallRelief,
                mesh: base,
            });
        } else {
            let wall_outline = self.outline(wall / 2.0)?;
            let mesh = Extrude::new(&wall_outline, depth).execute()?;
            pieces.push(SolidPiece {
                kind: PieceKind::Wall,
                mesh,
            });
        }

        // Step 2: Handle on top of the wall.
        let mut handle = if self.config.handle_round_enabled {
            self.terraced(
                HANDLE_WIDTH,
                HANDLE_THICKNESS,
                Bevel::round(
                    HANDLE_ROUND_THICKNESS,
                    HANDLE_ROUND_SIZE,
                    HANDLE_ROUND_SEGMENTS,
                    BevelEnd::Top,
                )
                .with_offset(-HANDLE_ROUND_SIZE),
            )?
        } else {
            Extrude::new(&self.outline(HANDLE_WIDTH)?, HANDLE_THICKNESS).execute()?
        };
        handle.translate(Vector3::new(0.0, 0.0, depth));
        pieces.push(SolidPiece {
            kind: PieceKind::Handle,
            mesh: handle,
        });

        debug!(
            pieces = pieces.len(),
            triangles = pieces.iter().map(|p| p.mesh.triangle_count()).sum::<usize>(),
            bevel = self.config.bevel_enabled,
            "assembled solid"
        );
        Ok(Solid { pieces })
    }

    /// Ring of `width` around the boundary, filled if it closes up.
    fn outline(&self, width: f64) -> Result<OutlineShape> {
        OffsetOutline::new(
            self.boundary,
            width,
            self.config.target_size,
            self.config.point_tolerance,
        )
        .execute_or_fill()
    }

    /// A bevelled piece of `height`, one traced ring per terrace.
    ///
    /// Each terrace widens the nominal ring by its offset on both sides, so
    /// every slab is a clean draw-and-detect outline.
    fn terraced(&self, width: f64, height: f64, bevel: Bevel) -> Result<TriangleMesh> {
        let mut mesh = TriangleMesh::default();
        for terrace in bevel.terraces(height)? {
            let outline = self.outline(width + 2.0 * terrace.offset)?;
            let mut slab = Extrude::new(&outline, terrace.height()).execute()?;
            slab.translate(Vector3::new(0.0, 0.0, terrace.z0));
            mesh.merge(&slab);
        }
        Ok(mesh)
    }
}
