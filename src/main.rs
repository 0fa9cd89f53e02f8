use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;

use cutterforge::math::Point2;
use cutterforge::operations::export::file_stem_of;
use cutterforge::operations::{DirectorySink, PersistenceSink};
use cutterforge::raster::RasterImage;
use cutterforge::{CutterConfigPatch, Event, EventOutcome, Session};

#[derive(Parser, Debug)]
#[command(
    name = "cutterforge",
    version,
    about = "Turn a picture of a shape into a cookie-cutter STL"
)]
struct Cli {
    /// Input image (PNG, JPEG or GIF)
    image: PathBuf,
    /// Base name of the exported file (default: the image's file name)
    #[arg(long)]
    name: Option<String>,
    /// Directory the STL is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Wall height in mm
    #[arg(long)]
    depth: Option<f64>,
    /// Wall thickness in mm
    #[arg(long)]
    wall: Option<f64>,
    /// Minimum vertex spacing in mm
    #[arg(long)]
    tolerance: Option<f64>,
    /// Length of the subject's longest side in mm
    #[arg(long)]
    size: Option<f64>,
    /// Bevel the cutting edge
    #[arg(long, action = ArgAction::SetTrue)]
    bevel: bool,
    /// Round the top edge of the handle
    #[arg(long, action = ArgAction::SetTrue)]
    round_handle: bool,
    /// Pick the boundary under this image pixel instead of the largest one
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    select: Option<Vec<f64>>,
    /// JSON config patch applied before the flags, e.g. '{"depth": 12}'
    #[arg(long)]
    config: Option<String>,
}

impl Cli {
    fn flag_patch(&self) -> CutterConfigPatch {
        CutterConfigPatch {
            depth: self.depth,
            wall_thickness: self.wall,
            point_tolerance: self.tolerance,
            bevel_enabled: self.bevel.then_some(true),
            handle_round_enabled: self.round_handle.then_some(true),
            target_size: self.size,
        }
    }

    fn base_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            let file_name = self
                .image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            file_stem_of(&file_name).to_string()
        })
    }
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let mut session = Session::default();

    // Step 1: Parameters.
    if let Some(json) = &cli.config {
        let patch = CutterConfigPatch::from_json(json).context("parsing --config")?;
        session.handle(Event::ConfigChanged(patch))?;
    }
    let patch = cli.flag_patch();
    if !patch.is_empty() {
        session.handle(Event::ConfigChanged(patch))?;
    }

    // Step 2: Image.
    let decoded = image::open(&cli.image)
        .with_context(|| format!("decoding {}", cli.image.display()))?;
    let image = RasterImage::from_dynamic(&decoded);
    if session.handle(Event::ImageLoaded(image))? == EventOutcome::NoSubjectFound {
        bail!("no usable subject found in {}", cli.image.display());
    }

    // Step 3: Optional re-selection.
    if let Some([x, y]) = cli.select.as_deref() {
        let outcome = session.handle(Event::BoundarySelected(Point2::new(*x, *y)))?;
        if outcome == EventOutcome::Unchanged {
            bail!("no boundary at ({x}, {y})");
        }
    }

    // Step 4: Export.
    let EventOutcome::Exported(payload) = session.handle(Event::ExportRequested {
        base_name: cli.base_name(),
    })?
    else {
        bail!("export produced no payload");
    };
    let path = DirectorySink::new(&cli.out_dir).persist(&payload)?;
    info!(path = %path.display(), "done");
    println!("{}", path.display());
    Ok(())
}
