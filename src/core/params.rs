//! Job configuration for the submitter and the worker, plus the
//! preconfigured site defaults that unset dataset flags fall back to.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_DATASET: &str = "/project/pipelines/bids/raw";
pub const DEFAULT_MASK_DATASET: &str = "/project/pipelines/bids/derivatives/brainmask";
pub const DEFAULT_CONTAINER: &str = "/project/pipelines/containers/synthseg-latest.sif";
pub const DEFAULT_SCRATCH_DIR: &str = "/scratch";

/// Site-wide default locations. Overridable per invocation; precedence is
/// explicit flag > site default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDefaults {
    pub input_dataset: PathBuf,
    pub mask_dataset: PathBuf,
    pub container: PathBuf,
    pub scratch_dir: PathBuf,
}

impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            input_dataset: PathBuf::from(DEFAULT_INPUT_DATASET),
            mask_dataset: PathBuf::from(DEFAULT_MASK_DATASET),
            container: PathBuf::from(DEFAULT_CONTAINER),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
        }
    }
}

/// Everything one scheduler submission needs besides the image list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitParams {
    pub input_dataset: PathBuf,
    pub mask_dataset: PathBuf,
    pub output_dataset: PathBuf,
    pub container: PathBuf,
    /// Worker executable the scheduler job runs.
    pub entrypoint: PathBuf,
    pub gpu: bool,
    pub posteriors: bool,
    pub ants: bool,
}

/// Worker-side configuration for one batch of images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    pub input_dataset: PathBuf,
    pub mask_dataset: PathBuf,
    pub output_dataset: PathBuf,
    pub container: PathBuf,
    pub scratch_dir: PathBuf,
    pub gpu: bool,
    pub posteriors: bool,
    pub ants: bool,
}

/// Default worker entry point: the `synthsub-seg` binary installed next to
/// the running executable, falling back to PATH lookup by name.
pub fn default_entrypoint() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("synthsub-seg")))
        .unwrap_or_else(|| PathBuf::from("synthsub-seg"))
}
