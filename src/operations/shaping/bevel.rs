use crate::error::{Result, TessellationError};
use crate::math::TOLERANCE;

/// Cross-section of a bevelled edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BevelProfile {
    /// Straight chamfer.
    Linear,
    /// Quarter-ellipse fillet.
    Round,
}

/// Which end of a piece carries the bevel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BevelEnd {
    /// At `z = 0`.
    Bottom,
    /// At `z = height`.
    Top,
}

/// Bevel parameters of a ring-shaped piece.
///
/// The profile is sampled at `segments + 1` nodes. Node `k` sits `dz_k` away
/// from the bevelled end and widens each side of the ring by `off_k`, going
/// from `offset` at the end to `offset + size` where the bevel meets the
/// straight part. Negative offsets narrow the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bevel {
    pub thickness: f64,
    pub size: f64,
    pub offset: f64,
    pub segments: u32,
    pub profile: BevelProfile,
    pub end: BevelEnd,
}

/// One straight slab of a bevelled piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terrace {
    pub z0: f64,
    pub z1: f64,
    /// Growth of each side of the ring over the nominal width.
    pub offset: f64,
}

impl Terrace {
    #[must_use]
    pub fn height(&self) -> f64 {
        self.z1 - self.z0
    }
}

impl Bevel {
    /// A chamfer at `end` sampled with `segments` steps.
    #[must_use]
    pub fn linear(thickness: f64, size: f64, segments: u32, end: BevelEnd) -> Self {
        Self {
            thickness,
            size,
            offset: 0.0,
            segments,
            profile: BevelProfile::Linear,
            end,
        }
    }

    /// A rounded edge at `end` sampled with `segments` steps.
    #[must_use]
    pub fn round(thickness: f64, size: f64, segments: u32, end: BevelEnd) -> Self {
        Self {
            thickness,
            size,
            offset: 0.0,
            segments,
            profile: BevelProfile::Round,
            end,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Distance from the bevelled end and side offset at node `k`.
    fn node(&self, k: u32) -> (f64, f64) {
        let t = f64::from(k) / f64::from(self.segments);
        match self.profile {
            BevelProfile::Linear => (self.thickness * t, self.offset + self.size * t),
            BevelProfile::Round => {
                let angle = t * std::f64::consts::FRAC_PI_2;
                (
                    self.thickness * (1.0 - angle.cos()),
                    self.offset + self.size * angle.sin(),
                )
            }
        }
    }

    /// Splits a piece of `height` into slabs, ordered by `z0`.
    ///
    /// Each profile node owns the slab between the midpoints to its
    /// neighbours. The bevelled end keeps the exact `offset` and the last
    /// node's slab runs through the straight part with `offset + size`.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::InvalidParameters`] if the bevel does not
    /// fit the height or has no segments.
    pub fn terraces(&self, height: f64) -> Result<Vec<Terrace>> {
        let finite = self.thickness.is_finite() && self.size.is_finite() && self.offset.is_finite();
        if !finite
            || !height.is_finite()
            || height <= 0.0
            || self.thickness <= 0.0
            || self.thickness > height + TOLERANCE
            || self.size < 0.0
            || self.segments == 0
        {
            return Err(TessellationError::InvalidParameters(format!(
                "bevel {self:?} does not fit height {height}"
            ))
            .into());
        }

        let nodes: Vec<(f64, f64)> = (0..=self.segments).map(|k| self.node(k)).collect();
        let mut cuts = Vec::with_capacity(nodes.len() + 1);
        cuts.push(0.0);
        cuts.extend(nodes.windows(2).map(|w| 0.5 * (w[0].0 + w[1].0)));
        cuts.push(height);

        let mut terraces: Vec<Terrace> = nodes
            .iter()
            .zip(cuts.windows(2))
            .map(|(&(_, offset), span)| match self.end {
                BevelEnd::Bottom => Terrace {
                    z0: span[0],
                    z1: span[1],
                    offset,
                },
                BevelEnd::Top => Terrace {
                    z0: height - span[1],
                    z1: height - span[0],
                    offset,
                },
            })
            .collect();
        terraces.sort_by(|a, b| a.z0.total_cmp(&b.z0));
        Ok(terraces)
    }
}
