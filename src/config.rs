use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};

/// User-facing cutter parameters. Treated as an immutable snapshot per rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutterConfig {
    /// Height of the cutting wall in millimetres.
    pub depth: f64,
    /// Nominal wall thickness in millimetres.
    pub wall_thickness: f64,
    /// Minimum per-axis spacing between kept outline vertices, in millimetres.
    pub point_tolerance: f64,
    pub bevel_enabled: bool,
    pub handle_round_enabled: bool,
    /// Length the subject's longest side is scaled to, in millimetres.
    pub target_size: f64,
}

impl Default for CutterConfig {
    fn default() -> Self {
        Self {
            depth: 16.0,
            wall_thickness: 1.0,
            point_tolerance: 0.15,
            bevel_enabled: false,
            handle_round_enabled: false,
            target_size: 76.0,
        }
    }
}

impl CutterConfig {
    /// Checks that every dimensional field is a positive finite number.
    ///
    /// `point_tolerance` may be zero, which keeps every traced point.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("depth", self.depth),
            ("wall_thickness", self.wall_thickness),
            ("target_size", self.target_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RasterError::InvalidInput(format!(
                    "{name} must be a positive finite number, got {value}"
                ))
                .into());
            }
        }
        if !self.point_tolerance.is_finite() || self.point_tolerance < 0.0 {
            return Err(RasterError::InvalidInput(format!(
                "point_tolerance must be a non-negative finite number, got {}",
                self.point_tolerance
            ))
            .into());
        }
        Ok(())
    }

    /// Returns a copy with every field present in `patch` replaced.
    #[must_use]
    pub fn patched(&self, patch: &CutterConfigPatch) -> Self {
        Self {
            depth: patch.depth.unwrap_or(self.depth),
            wall_thickness: patch.wall_thickness.unwrap_or(self.wall_thickness),
            point_tolerance: patch.point_tolerance.unwrap_or(self.point_tolerance),
            bevel_enabled: patch.bevel_enabled.unwrap_or(self.bevel_enabled),
            handle_round_enabled: patch
                .handle_round_enabled
                .unwrap_or(self.handle_round_enabled),
            target_size: patch.target_size.unwrap_or(self.target_size),
        }
    }
}

/// A partial parameter update; absent fields keep their last-known value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterConfigPatch {
    pub depth: Option<f64>,
    pub wall_thickness: Option<f64>,
    pub point_tolerance: Option<f64>,
    pub bevel_enabled: Option<bool>,
    pub handle_round_enabled: Option<bool>,
    pub target_size: Option<f64>,
}

impl CutterConfigPatch {
    /// Parses a patch from a JSON object such as `{"depth": 12, "bevel_enabled": true}`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidInput`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| RasterError::InvalidInput(format!("config patch: {e}")).into())
    }

    /// Returns `true` when the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Tuned constants of the raster pipeline.
///
/// The frame/noise ratios and the index-map stroke passes were tuned by eye
/// on a small image set; they are settings rather than invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Border added around the image so subjects touching the edge stay closed.
    pub padding: u32,
    /// Box radius of the adaptive threshold's local mean.
    pub threshold_radius: u32,
    /// How much darker than its neighbourhood a pixel must be to count as foreground.
    pub threshold_offset: u8,
    /// Boundaries at or above this fraction of the padded area are the image frame.
    pub frame_ratio: f64,
    /// Candidates must exceed this fraction of the frame cutoff.
    pub noise_ratio: f64,
    /// Stroke widths of the index-map painting passes, coarse to fine.
    pub index_stroke_passes: [u32; 3],
    /// Images with a longer side are downscaled before classification.
    pub max_working_dimension: u32,
    /// Factor between raster pixels and host display pixels.
    pub display_scale: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            padding: 10,
            threshold_radius: 5,
            threshold_offset: 10,
            frame_ratio: 0.90,
            noise_ratio: 0.1,
            index_stroke_passes: [15, 7, 3],
            max_working_dimension: 1000,
            display_scale: 1.0,
        }
    }
}
