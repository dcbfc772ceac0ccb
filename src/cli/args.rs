use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Strict 0/1 switch. Anything else is a parse error; truthiness of other
/// integers is deliberately not supported.
pub fn parse_switch(value: &str) -> Result<bool, String> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("expected 0 or 1, got '{}'", other)),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "synthsub",
    version,
    about = "Submit SynthSeg brain-MRI segmentation jobs for a BIDS dataset to the LSF scheduler"
)]
pub struct CliArgs {
    /// Output BIDS dataset root (required)
    #[arg(short = 'o', long = "output-dataset")]
    pub output_dataset: Option<PathBuf>,

    /// Input BIDS dataset root containing the source images
    #[arg(short = 'i', long = "input-dataset")]
    pub input_dataset: Option<PathBuf>,

    /// Mask BIDS dataset root containing the brain-mask images
    #[arg(short = 'm', long = "mask-dataset")]
    pub mask_dataset: Option<PathBuf>,

    /// Request a GPU reservation and run the tool in GPU mode
    #[arg(short = 'g', long = "gpu", value_name = "0|1", default_value = "1",
          value_parser = parse_switch, action = ArgAction::Set)]
    pub gpu: bool,

    /// Also emit posterior-probability outputs
    #[arg(short = 'p', long = "posteriors", value_name = "0|1", default_value = "0",
          value_parser = parse_switch, action = ArgAction::Set)]
    pub posteriors: bool,

    /// Emit outputs in the ANTs-compatible layout
    #[arg(short = 'a', long = "ants", value_name = "0|1", default_value = "0",
          value_parser = parse_switch, action = ArgAction::Set)]
    pub ants: bool,

    /// SynthSeg container image (.sif)
    #[arg(long)]
    pub container: Option<PathBuf>,

    /// Worker executable the scheduler job runs
    #[arg(long)]
    pub entrypoint: Option<PathBuf>,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// A subject/session pair, explicit image paths, or an image-list file.
    /// Image paths must end in .nii.gz and be relative to the input dataset.
    #[arg(value_name = "SUBJECT SESSION | IMAGE... | LIST_FILE")]
    pub inputs: Vec<String>,
}
