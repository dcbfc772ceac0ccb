//! BIDS naming for anatomical inputs and SynthSeg derivatives.
//!
//! An anatomical image path relative to its dataset root looks like
//! `sub-X/ses-Y/anat/sub-X_ses-Y_acq-mprage_T1w.nii.gz`. Everything the
//! worker produces is named from two pieces of that path: the `prefix`
//! (path and entities up to the last underscore) and the modality `suffix`
//! (`T1w`, `T2w`, ...).

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const NIFTI_GZ_EXT: &str = ".nii.gz";

/// Coordinate spaces the derivatives are emitted in.
pub const SPACE_SYNTHSEG: &str = "SynthSeg";
pub const SPACE_ORIG: &str = "orig";

/// A parsed anatomical image reference, relative to its dataset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnatomicalImage {
    relative: PathBuf,
    prefix: String,
    suffix: String,
}

impl AnatomicalImage {
    /// Split `<prefix>_<suffix>.nii.gz` into its prefix and modality suffix.
    pub fn parse(relative: &Path) -> Result<Self> {
        let malformed = || Error::MalformedImageName {
            name: relative.display().to_string(),
        };

        let as_str = relative.to_str().ok_or_else(malformed)?;
        let stem = as_str.strip_suffix(NIFTI_GZ_EXT).ok_or_else(malformed)?;
        let (prefix, suffix) = stem.rsplit_once('_').ok_or_else(malformed)?;

        if prefix.is_empty() || suffix.is_empty() || !suffix.chars().all(char::is_alphanumeric) {
            return Err(malformed());
        }

        Ok(Self {
            relative: relative.to_path_buf(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Image path and entities without the modality suffix and extension,
    /// e.g. `sub-X/ses-Y/anat/sub-X_ses-Y_acq-mprage`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Modality suffix, e.g. `T1w`.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Brain-mask path relative to the mask dataset. Keying the mask name on
    /// the full prefix ensures mask and image cannot be mismatched.
    pub fn mask_relative(&self) -> PathBuf {
        PathBuf::from(format!(
            "{}_space-{}_desc-brain_mask{}",
            self.prefix, self.suffix, NIFTI_GZ_EXT
        ))
    }

    /// Discrete segmentation prefix for the given space, without extension.
    pub fn dseg_prefix(&self, space: &str) -> String {
        format!("{}_space-{}_dseg", self.prefix, space)
    }

    /// Posterior-probability segmentation prefix for the given space.
    pub fn probseg_prefix(&self, space: &str) -> String {
        format!("{}_space-{}_probseg", self.prefix, space)
    }

    /// The input image resampled into SynthSeg space.
    pub fn resampled_name(&self) -> String {
        format!(
            "{}_space-{}_{}{}",
            self.prefix, SPACE_SYNTHSEG, self.suffix, NIFTI_GZ_EXT
        )
    }

    /// QC metrics table name, relative to the output dataset.
    pub fn qc_name(&self) -> String {
        format!("{}_desc-qc.tsv", self.prefix)
    }

    /// Label volumes table name, relative to the output dataset.
    pub fn volumes_name(&self) -> String {
        format!("{}_desc-volumes.tsv", self.prefix)
    }
}

/// Normalize a user-supplied subject or session label: a leading BIDS entity
/// prefix (`sub-` / `ses-`) is accepted and stripped.
pub fn strip_entity_prefix<'a>(label: &'a str, entity: &str) -> &'a str {
    label.strip_prefix(entity).unwrap_or(label)
}
