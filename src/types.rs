//! Shared types used across synthsub.
//! Includes `ImageSelector`, the three ways a caller can name the anatomical
//! images of a submission.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the anatomical images of a job are selected.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ImageSelector {
    /// Scan `<input>/sub-<subject>/ses-<session>/anat` for images.
    SubjectSession { subject: String, session: String },
    /// Paths relative to the input dataset, taken verbatim.
    Explicit(Vec<PathBuf>),
    /// A text file with one relative image path per line.
    ListFile(PathBuf),
}

impl std::fmt::Display for ImageSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSelector::SubjectSession { subject, session } => {
                write!(f, "sub-{}/ses-{}", subject, session)
            }
            ImageSelector::Explicit(images) => write!(f, "{} explicit image(s)", images.len()),
            ImageSelector::ListFile(path) => write!(f, "image list {}", path.display()),
        }
    }
}
