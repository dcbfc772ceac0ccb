//! Worker entry point executed by the scheduler job (`synthsub-seg`).
//!
//! Receives the dataset roots, the container image, and the relative image
//! list assembled by the submitter, then runs the containerized SynthSeg
//! tool once per image and collects the outputs as BIDS derivatives. Its
//! stdout is the scheduler's log file, so logging is always enabled.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use synthsub::core::params::{DEFAULT_SCRATCH_DIR, RunParams};
use synthsub::{Error, api, bids};

#[derive(Parser)]
#[command(
    name = "synthsub-seg",
    version,
    about = "SynthSeg batch worker: segment anatomical images through the containerized tool"
)]
struct SegArgs {
    /// Input BIDS dataset root containing the source images
    #[arg(long)]
    input_dataset: PathBuf,

    /// Mask BIDS dataset root containing the brain-mask images
    #[arg(long)]
    mask_dataset: PathBuf,

    /// Output BIDS dataset root
    #[arg(long)]
    output_dataset: PathBuf,

    /// SynthSeg container image (.sif)
    #[arg(long)]
    container: PathBuf,

    /// Node-local scratch directory for container output
    #[arg(long, default_value = DEFAULT_SCRATCH_DIR)]
    scratch_dir: PathBuf,

    /// Run the container in GPU mode
    #[arg(long)]
    gpu: bool,

    /// Also emit posterior-probability outputs
    #[arg(long)]
    posteriors: bool,

    /// Emit outputs in the ANTs-compatible layout
    #[arg(long)]
    ants: bool,

    /// File with one relative image path per line
    #[arg(long)]
    image_list: Option<PathBuf>,

    /// Image paths relative to the input dataset
    #[arg(value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = SegArgs::parse();

    let mut images = match &args.image_list {
        Some(list) => bids::read_image_list(list)?,
        None => Vec::new(),
    };
    images.extend(args.images.iter().cloned());

    let params = RunParams {
        input_dataset: args.input_dataset,
        mask_dataset: args.mask_dataset,
        output_dataset: args.output_dataset,
        container: args.container,
        scratch_dir: args.scratch_dir,
        gpu: args.gpu,
        posteriors: args.posteriors,
        ants: args.ants,
    };

    let report = api::run_segmentation(&params, &images)?;
    info!(
        "Done: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );

    if report.errors > 0 {
        return Err(Error::external(format!("{} image(s) failed", report.errors)).into());
    }
    Ok(())
}
