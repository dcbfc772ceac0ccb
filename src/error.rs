//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O errors and provides semantic variants for argument
//! validation, image resolution, and scheduler/container failures.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("No anatomical images found for sub-{subject}/ses-{session} under {dataset}")]
    NoImagesFound {
        subject: String,
        session: String,
        dataset: PathBuf,
    },

    #[error("Image list is empty; at least one anatomical image is required")]
    EmptyImageList,

    #[error("Malformed anatomical image name: {name} (expected <prefix>_<suffix>.nii.gz)")]
    MalformedImageName { name: String },

    #[error("Scheduler '{program}' rejected the submission (status {status}): {stderr}")]
    Submission {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("Container runtime '{program}' not found on PATH")]
    RuntimeMissing { program: String },

    #[error("Container exited with status {status} while processing {image}")]
    Container { image: PathBuf, status: i32 },

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }
}
