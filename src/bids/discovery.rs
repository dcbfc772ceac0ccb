//! Anatomical image discovery for subject/session submissions, plus
//! image-list files for the explicit modes.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bids::naming::{NIFTI_GZ_EXT, strip_entity_prefix};
use crate::error::Result;

/// Scan `<root>/sub-<subject>/ses-<session>/anat` for compressed NIfTI
/// images and return their paths relative to `root`, sorted for
/// deterministic submissions. A missing session directory yields an empty
/// list; the caller decides whether that is an error.
pub fn find_anatomical_images(root: &Path, subject: &str, session: &str) -> Result<Vec<PathBuf>> {
    let sub = format!("sub-{}", strip_entity_prefix(subject, "sub-"));
    let ses = format!("ses-{}", strip_entity_prefix(session, "ses-"));
    let anat_rel = PathBuf::from(&sub).join(&ses).join("anat");
    let anat_dir = root.join(&anat_rel);

    if !anat_dir.is_dir() {
        debug!("No anat directory at {:?}", anat_dir);
        return Ok(Vec::new());
    }

    let mut images = Vec::new();
    for entry in fs::read_dir(&anat_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let is_image = name
            .to_str()
            .is_some_and(|n| n.ends_with(NIFTI_GZ_EXT) && entry.path().is_file());
        if is_image {
            images.push(anat_rel.join(name));
        }
    }
    images.sort();

    debug!("Found {} image(s) under {:?}", images.len(), anat_dir);
    Ok(images)
}

/// Read an image-list file: one path per line, relative to the input
/// dataset. Blank lines and surrounding whitespace are ignored.
pub fn read_image_list(path: &Path) -> Result<Vec<PathBuf>> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut images = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            images.push(PathBuf::from(trimmed));
        }
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SUBJECT: &str = "123456";
    const SESSION: &str = "20160429x0000";
    const T1W: &str = "sub-123456_ses-20160429x0000_acq-mprage_T1w.nii.gz";

    fn seed_dataset(root: &Path) {
        let anat = root
            .join(format!("sub-{SUBJECT}"))
            .join(format!("ses-{SESSION}"))
            .join("anat");
        fs::create_dir_all(&anat).unwrap();
        fs::write(anat.join(T1W), b"").unwrap();
        // Sidecar and non-image files must be ignored
        fs::write(anat.join("sub-123456_ses-20160429x0000_acq-mprage_T1w.json"), b"{}").unwrap();
        fs::write(anat.join("notes.txt"), b"").unwrap();
    }

    #[test]
    fn finds_images_relative_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        seed_dataset(tmp.path());

        let images = find_anatomical_images(tmp.path(), SUBJECT, SESSION).unwrap();
        assert_eq!(
            images,
            vec![PathBuf::from(format!(
                "sub-{SUBJECT}/ses-{SESSION}/anat/{T1W}"
            ))]
        );
    }

    #[test]
    fn accepts_prefixed_subject_and_session() {
        let tmp = tempfile::tempdir().unwrap();
        seed_dataset(tmp.path());

        let images = find_anatomical_images(
            tmp.path(),
            &format!("sub-{SUBJECT}"),
            &format!("ses-{SESSION}"),
        )
        .unwrap();
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn missing_session_yields_empty_list() {
        let tmp = tempfile::tempdir().unwrap();
        seed_dataset(tmp.path());

        let images = find_anatomical_images(tmp.path(), SUBJECT, "19990101x0000").unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn list_file_is_read_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let list = tmp.path().join("images.txt");
        let mut f = fs::File::create(&list).unwrap();
        writeln!(f, "sub-1/ses-1/anat/sub-1_ses-1_T1w.nii.gz").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "  sub-2/ses-1/anat/sub-2_ses-1_T1w.nii.gz  ").unwrap();

        let images = read_image_list(&list).unwrap();
        assert_eq!(
            images,
            vec![
                PathBuf::from("sub-1/ses-1/anat/sub-1_ses-1_T1w.nii.gz"),
                PathBuf::from("sub-2/ses-1/anat/sub-2_ses-1_T1w.nii.gz"),
            ]
        );
    }
}
