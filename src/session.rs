//! The explicitly owned pipeline state and its event handler.
//!
//! A [`Session`] holds one immutable [`Snapshot`] behind an `Arc`. Every
//! event that changes anything builds a complete new snapshot and swaps it
//! in, so a reader holding the previous `Arc` never sees a half-updated
//! boundary/config/solid triple. Failed events leave the snapshot untouched.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info};

use crate::config::{CutterConfig, CutterConfigPatch, PipelineSettings};
use crate::error::Result;
use crate::geometry::Boundary;
use crate::math::Point2;
use crate::operations::{
    AssembleSolid, Classification, ClassifyBoundaries, ExportPayload, ExportStl, SelectBoundary,
    Solid,
};
use crate::raster::RasterImage;

/// One consistent state of the pipeline.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Candidates of the last loaded image, if any.
    pub classification: Option<Arc<Classification>>,
    /// The active boundary; empty when nothing is selected.
    pub active: Arc<Boundary>,
    pub active_label: Option<u16>,
    pub config: CutterConfig,
    /// The solid built from `active` and `config`.
    pub solid: Arc<Solid>,
    /// Thresholded raster with the active boundary highlighted.
    pub preview: Option<Arc<RgbImage>>,
}

impl Snapshot {
    fn initial(config: CutterConfig) -> Self {
        Self {
            classification: None,
            active: Arc::new(Boundary::empty()),
            active_label: None,
            config,
            solid: Arc::new(Solid::empty()),
            preview: None,
        }
    }

    /// Whether there is anything to render or export.
    #[must_use]
    pub fn can_export(&self) -> bool {
        !self.solid.is_empty()
    }
}

/// Inputs the host feeds into the pipeline.
#[derive(Debug, Clone)]
pub enum Event {
    /// A fully decoded image.
    ImageLoaded(RasterImage),
    /// A partial parameter update.
    ConfigChanged(CutterConfigPatch),
    /// A pointer position in display coordinates.
    BoundarySelected(Point2),
    ExportRequested { base_name: String },
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// A new snapshot with a rebuilt solid is in place.
    Rebuilt,
    /// The image held no usable subject; the snapshot has an empty boundary.
    NoSubjectFound,
    /// Nothing changed.
    Unchanged,
    /// The current solid was serialised; the snapshot is unchanged.
    Exported(ExportPayload),
}

/// Owns the pipeline state and applies events to it one at a time.
#[derive(Debug)]
pub struct Session {
    settings: PipelineSettings,
    snapshot: Arc<Snapshot>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PipelineSettings::default(), CutterConfig::default())
    }
}

impl Session {
    #[must_use]
    pub fn new(settings: PipelineSettings, config: CutterConfig) -> Self {
        Self {
            settings,
            snapshot: Arc::new(Snapshot::initial(config)),
        }
    }

    /// The current snapshot. Cheap to clone and safe to keep across events.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Handles one event and installs the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns invalid-input errors for bad parameters, `ExportRefused` when
    /// exporting an empty solid, and any tessellation or serialisation error.
    /// The snapshot is unchanged whenever an error is returned.
    pub fn handle(&mut self, event: Event) -> Result<EventOutcome> {
        match event {
            Event::ImageLoaded(image) => self.load_image(&image),
            Event::ConfigChanged(patch) => self.change_config(&patch),
            Event::BoundarySelected(point) => self.select(point),
            Event::ExportRequested { base_name } => {
                let payload =
                    ExportStl::new(&self.snapshot.active, &self.snapshot.config, &base_name)
                        .execute()?;
                Ok(EventOutcome::Exported(payload))
            }
        }
    }

    fn load_image(&mut self, image: &RasterImage) -> Result<EventOutcome> {
        let classification = ClassifyBoundaries::new(image, &self.settings).execute()?;
        let config = self.snapshot.config;

        let Ok(subject) = classification.require_subject() else {
            info!(
                width = image.width(),
                height = image.height(),
                "no usable subject found"
            );
            self.snapshot = Arc::new(Snapshot {
                classification: Some(Arc::new(classification)),
                ..Snapshot::initial(config)
            });
            return Ok(EventOutcome::NoSubjectFound);
        };

        let label = subject.label;
        let active = classification.default_boundary();
        let solid = AssembleSolid::new(&active, &config).execute()?;
        let preview = classification.highlight(label);
        info!(
            candidates = classification.candidates().len(),
            label,
            pieces = solid.piece_count(),
            "image loaded"
        );
        self.snapshot = Arc::new(Snapshot {
            classification: Some(Arc::new(classification)),
            active: Arc::new(active),
            active_label: Some(label),
            config,
            solid: Arc::new(solid),
            preview: Some(Arc::new(preview)),
        });
        Ok(EventOutcome::Rebuilt)
    }

    fn change_config(&mut self, patch: &CutterConfigPatch) -> Result<EventOutcome> {
        let config = self.snapshot.config.patched(patch);
        if config == self.snapshot.config {
            debug!("config patch changes nothing");
            return Ok(EventOutcome::Unchanged);
        }
        config.validate()?;
        let solid = AssembleSolid::new(&self.snapshot.active, &config).execute()?;
        info!(?config, pieces = solid.piece_count(), "config changed");
        self.snapshot = Arc::new(Snapshot {
            config,
            solid: Arc::new(solid),
            ..(*self.snapshot).clone()
        });
        Ok(EventOutcome::Rebuilt)
    }

    fn select(&mut self, point: Point2) -> Result<EventOutcome> {
        let Some(classification) = self.snapshot.classification.as_ref() else {
            return Ok(EventOutcome::Unchanged);
        };
        let Some(selection) =
            SelectBoundary::new(classification, point, self.settings.display_scale).execute()
        else {
            return Ok(EventOutcome::Unchanged);
        };

        let solid = AssembleSolid::new(&selection.boundary, &self.snapshot.config).execute()?;
        info!(
            label = selection.label,
            was_clockwise = selection.was_clockwise,
            pieces = solid.piece_count(),
            "boundary selected"
        );
        self.snapshot = Arc::new(Snapshot {
            active: Arc::new(selection.boundary),
            active_label: Some(selection.label),
            solid: Arc::new(solid),
            preview: Some(Arc::new(selection.preview)),
            ..(*self.snapshot).clone()
        });
        Ok(EventOutcome::Rebuilt)
    }
}
