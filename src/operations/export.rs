//! Binary STL export and the persistence hand-off.

use std::path::{Path, PathBuf};

use stl_io::{Normal, Triangle, Vertex};
use tracing::info;

use crate::config::CutterConfig;
use crate::error::{ExportError, Result};
use crate::geometry::Boundary;
use crate::operations::assemble::AssembleSolid;
use crate::tessellation::{face_normal, TriangleMesh};

/// Extension appended to every exported file name.
pub const MESH_EXTENSION: &str = "stl";

/// Stem used when sanitising leaves nothing.
const FALLBACK_STEM: &str = "cutter";

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
#[must_use]
pub fn sanitize_file_stem(base: &str) -> String {
    let stem: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// Strips a trailing extension from the last path component, keeping the rest.
///
/// `"my cookie!.png"` becomes `"my cookie!"`; `".hidden"` is left as is.
#[must_use]
pub fn file_stem_of(name: &str) -> &str {
    let tail_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match name[tail_start..].rfind('.') {
        Some(dot) if dot > 0 => &name[..tail_start + dot],
        _ => name,
    }
}

/// A finished export: the sanitised file name and the serialised mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Where export payloads end up. The core never touches the file system itself.
pub trait PersistenceSink {
    /// Stores one payload.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Persist`] if the payload cannot be stored.
    fn persist(&mut self, payload: &ExportPayload) -> Result<PathBuf>;
}

/// Writes payloads as files into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PersistenceSink for DirectorySink {
    fn persist(&mut self, payload: &ExportPayload) -> Result<PathBuf> {
        let path = self.dir.join(&payload.file_name);
        std::fs::write(&path, &payload.bytes).map_err(|source| ExportError::Persist {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = payload.bytes.len(), "saved mesh");
        Ok(path)
    }
}

/// Re-assembles the solid and serialises it as binary STL.
#[derive(Debug)]
pub struct ExportStl<'a> {
    boundary: &'a Boundary,
    config: &'a CutterConfig,
    base_name: &'a str,
}

impl<'a> ExportStl<'a> {
    #[must_use]
    pub fn new(boundary: &'a Boundary, config: &'a CutterConfig, base_name: &'a str) -> Self {
        Self {
            boundary,
            config,
            base_name,
        }
    }

    /// Executes the export.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Refused`] when the solid is empty, any error of
    /// the assembly, and [`ExportError::Serialize`] if writing the mesh fails.
    pub fn execute(&self) -> Result<ExportPayload> {
        // Step 1: Rebuild from the current boundary and configuration.
        let solid = AssembleSolid::new(self.boundary, self.config).execute()?;
        if solid.is_empty() {
            return Err(ExportError::Refused("there is no solid to export".into()).into());
        }

        // Step 2: Serialise.
        let mesh = solid.merged();
        let bytes = write_binary_stl(&mesh)?;
        let file_name = format!("{}.{MESH_EXTENSION}", sanitize_file_stem(self.base_name));

        info!(
            file_name,
            triangles = mesh.triangle_count(),
            bytes = bytes.len(),
            "exported solid"
        );
        Ok(ExportPayload { file_name, bytes })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_binary_stl(mesh: &TriangleMesh) -> Result<Vec<u8>> {
    let to_vertex = |p: &crate::math::Point3| Vertex::new([p.x as f32, p.y as f32, p.z as f32]);
    let triangles: Vec<Triangle> = mesh
        .triangles()
        .map(|corners| {
            let n = face_normal(&corners);
            Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    to_vertex(&corners[0]),
                    to_vertex(&corners[1]),
                    to_vertex(&corners[2]),
                ],
            }
        })
        .collect();

    let mut bytes = Vec::with_capacity(84 + 50 * triangles.len());
    stl_io::write_stl(&mut bytes, triangles.iter()).map_err(ExportError::Serialize)?;
    Ok(bytes)
}
