pub mod assemble;
pub mod classify;
pub mod export;
pub mod offset;
pub mod select;
pub mod shaping;

pub use assemble::{AssembleSolid, PieceKind, Solid, SolidPiece};
pub use classify::{Candidate, Classification, ClassifyBoundaries};
pub use export::{DirectorySink, ExportPayload, ExportStl, PersistenceSink};
pub use offset::OffsetOutline;
pub use select::{SelectBoundary, Selection};
pub use shaping::{Bevel, BevelEnd, BevelProfile, Extrude, Terrace};
