//! High-level, ergonomic library API: resolve an image selection to a
//! concrete list, submit one scheduler job, or run the worker loop. Prefer
//! these entrypoints over the low-level `core` modules when embedding
//! synthsub.
use std::path::{Path, PathBuf};

use crate::bids::discovery::{find_anatomical_images, read_image_list};
use crate::bids::naming::strip_entity_prefix;
use crate::core::params::{RunParams, SubmitParams};
use crate::core::submit::{Scheduler, SubmitOutcome};
use crate::core::worker::{self, RunReport};
use crate::error::{Error, Result};
use crate::types::ImageSelector;

/// Resolve an `ImageSelector` into relative image paths. Zero resolved
/// images is always an error; submission never proceeds on an empty list.
pub fn resolve_images(input_dataset: &Path, selector: &ImageSelector) -> Result<Vec<PathBuf>> {
    let images = match selector {
        ImageSelector::SubjectSession { subject, session } => {
            let images = find_anatomical_images(input_dataset, subject, session)?;
            if images.is_empty() {
                return Err(Error::NoImagesFound {
                    subject: strip_entity_prefix(subject, "sub-").to_string(),
                    session: strip_entity_prefix(session, "ses-").to_string(),
                    dataset: input_dataset.to_path_buf(),
                });
            }
            images
        }
        ImageSelector::Explicit(images) => images.clone(),
        ImageSelector::ListFile(path) => read_image_list(path)?,
    };

    if images.is_empty() {
        return Err(Error::EmptyImageList);
    }
    Ok(images)
}

/// Resolve the selection and issue exactly one scheduler submission.
pub fn submit(
    params: &SubmitParams,
    scheduler: &Scheduler,
    selector: &ImageSelector,
) -> Result<SubmitOutcome> {
    let images = resolve_images(&params.input_dataset, selector)?;
    scheduler.submit(params, &images)
}

/// Worker loop: segment each image through the container and collect the
/// outputs as BIDS derivatives.
pub fn run_segmentation(params: &RunParams, images: &[PathBuf]) -> Result<RunReport> {
    worker::run_segmentation(params, images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn explicit_selection_is_taken_verbatim() {
        let images = vec![PathBuf::from("sub-1/ses-1/anat/sub-1_ses-1_T1w.nii.gz")];
        let resolved = resolve_images(
            Path::new("/nonexistent"),
            &ImageSelector::Explicit(images.clone()),
        )
        .unwrap();
        assert_eq!(resolved, images);
    }

    #[test]
    fn empty_explicit_selection_is_an_error() {
        let err = resolve_images(Path::new("/nonexistent"), &ImageSelector::Explicit(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyImageList));
    }

    #[test]
    fn zero_discovered_images_is_a_resolution_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve_images(
            tmp.path(),
            &ImageSelector::SubjectSession {
                subject: "123456".to_string(),
                session: "20160429x0000".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoImagesFound { .. }));
    }

    #[test]
    fn empty_list_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let list = tmp.path().join("images.txt");
        fs::write(&list, "\n\n").unwrap();
        let err =
            resolve_images(tmp.path(), &ImageSelector::ListFile(list)).unwrap_err();
        assert!(matches!(err, Error::EmptyImageList));
    }
}
