//! Worker entry point internals: for each anatomical image, run the
//! containerized SynthSeg tool against a scratch directory, then rename its
//! outputs into BIDS-derivative form under the output dataset.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::bids::naming::{AnatomicalImage, NIFTI_GZ_EXT, SPACE_ORIG, SPACE_SYNTHSEG};
use crate::bids::tables::csv_to_bids_tsv;
use crate::core::labels::{write_dseg_tsv, write_label_map_json};
use crate::core::params::RunParams;
use crate::error::{Error, Result};

pub const CONTAINER_RUNTIME: &str = "singularity";

/// Thread caps forwarded into the container; segmentation parallelism comes
/// from the scheduler, not from intra-process threading.
const CONTAINER_ENV: &[(&str, &str)] = &[
    ("SINGULARITYENV_OMP_NUM_THREADS", "1"),
    ("SINGULARITYENV_ITK_GLOBAL_DEFAULT_NUMBER_OF_THREADS", "1"),
];

/// Per-batch tally, mirroring the submitter's one-job-many-images contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Process a batch of anatomical images. Continues past per-image failures
/// and reports them in the tally; fails up front when the image list is
/// empty or the container runtime is unavailable.
pub fn run_segmentation(params: &RunParams, images: &[PathBuf]) -> Result<RunReport> {
    if images.is_empty() {
        return Err(Error::EmptyImageList);
    }
    if !runtime_on_path(CONTAINER_RUNTIME) {
        return Err(Error::RuntimeMissing {
            program: CONTAINER_RUNTIME.to_string(),
        });
    }

    fs::create_dir_all(&params.output_dataset)?;

    let job_tag = env::var("LSB_JOBID").unwrap_or_else(|_| "local".to_string());
    let workdir = tempfile::Builder::new()
        .prefix(&format!("synthseg.{}.", job_tag))
        .tempdir_in(&params.scratch_dir)?;

    let input_root = fs::canonicalize(&params.input_dataset)?;
    let mask_root = fs::canonicalize(&params.mask_dataset)?;
    let work_root = fs::canonicalize(workdir.path())?;

    info!("Processing {} image(s)", images.len());

    let mut report = RunReport::default();
    for image in images {
        let anat = match AnatomicalImage::parse(image) {
            Ok(anat) => anat,
            Err(e) => {
                warn!("Skipping {:?}: {}", image, e);
                report.errors += 1;
                continue;
            }
        };

        if !input_root.join(anat.relative()).is_file() {
            warn!("Anatomical input file not found: {:?}", anat.relative());
            report.skipped += 1;
            continue;
        }

        let primary_output = params
            .output_dataset
            .join(format!("{}{}", anat.dseg_prefix(SPACE_SYNTHSEG), NIFTI_GZ_EXT));
        if primary_output.exists() {
            info!("Output already exists: {:?}", primary_output);
            report.skipped += 1;
            continue;
        }

        info!("Processing {:?}", anat.relative());
        match process_one(params, &anat, &input_root, &mask_root, &work_root) {
            Ok(()) => report.processed += 1,
            Err(e) => {
                warn!("Error processing {:?}: {}", anat.relative(), e);
                report.errors += 1;
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

/// Run the container for one image and rename its scratch outputs into the
/// output dataset.
fn process_one(
    params: &RunParams,
    anat: &AnatomicalImage,
    input_root: &Path,
    mask_root: &Path,
    work_root: &Path,
) -> Result<()> {
    if let Some(parent) = params.output_dataset.join(anat.prefix()).parent() {
        fs::create_dir_all(parent)?;
    }

    let args = container_args(params, anat, input_root, mask_root, work_root);
    debug!("Container invocation: {} {:?}", CONTAINER_RUNTIME, args);

    let mut cmd = Command::new(CONTAINER_RUNTIME);
    cmd.args(&args);
    for (key, value) in CONTAINER_ENV {
        cmd.env(key, value);
    }
    let status = cmd.status()?;
    if !status.success() {
        return Err(Error::Container {
            image: anat.relative().to_path_buf(),
            status: status.code().unwrap_or(-1),
        });
    }

    collect_outputs(params, anat, work_root)
}

/// Argument list for `singularity run`: bind mounts for the three dataset
/// roots, the container image, and the tool's own flags.
pub fn container_args(
    params: &RunParams,
    anat: &AnatomicalImage,
    input_root: &Path,
    mask_root: &Path,
    work_root: &Path,
) -> Vec<OsString> {
    let binds = format!(
        "{}:/input,{}:/masks,{}:/output",
        input_root.display(),
        mask_root.display(),
        work_root.display()
    );

    let mut args: Vec<OsString> = vec!["run".into(), "--cleanenv".into()];
    if params.gpu {
        args.push("--nv".into());
    }
    args.push("-B".into());
    args.push(binds.into());
    args.push(params.container.as_os_str().to_os_string());
    args.push("--input".into());
    args.push(format!("/input/{}", anat.relative().display()).into());
    args.push("--mask".into());
    args.push(format!("/masks/{}", anat.mask_relative().display()).into());
    args.push("--output".into());
    args.push(format!("/output/{}", anat.prefix()).into());
    args.push("--qc".into());
    args.push("--volumes".into());
    args.push("--resample-orig".into());
    if params.posteriors {
        args.push("--posteriors".into());
    }
    if params.ants {
        args.push("--ants".into());
    }
    args
}

/// Rename the container's scratch outputs into BIDS derivatives.
fn collect_outputs(params: &RunParams, anat: &AnatomicalImage, work_root: &Path) -> Result<()> {
    let out = &params.output_dataset;
    let prefix = anat.prefix();

    // Discrete segmentation in SynthSeg space, plus its label table
    let seg_prefix = anat.dseg_prefix(SPACE_SYNTHSEG);
    fs::copy(
        work_root.join(format!("{}SynthSeg{}", prefix, NIFTI_GZ_EXT)),
        out.join(format!("{}{}", seg_prefix, NIFTI_GZ_EXT)),
    )?;
    write_dseg_tsv(&out.join(format!("{}.tsv", seg_prefix)))?;

    // The input resampled into SynthSeg space
    fs::copy(
        work_root.join(format!("{}SynthSegInput{}", prefix, NIFTI_GZ_EXT)),
        out.join(anat.resampled_name()),
    )?;

    // Discrete segmentation resampled back to the native space; labels are
    // the same for both images
    let seg_orig_prefix = anat.dseg_prefix(SPACE_ORIG);
    fs::copy(
        work_root.join(format!("{}SynthSegOrig{}", prefix, NIFTI_GZ_EXT)),
        out.join(format!("{}{}", seg_orig_prefix, NIFTI_GZ_EXT)),
    )?;
    write_dseg_tsv(&out.join(format!("{}.tsv", seg_orig_prefix)))?;

    // QC and volume tables, CSV from the container, TSV for BIDS
    csv_to_bids_tsv(
        &work_root.join(format!("{}SynthSegQC.csv", prefix)),
        &out.join(anat.qc_name()),
    )?;
    csv_to_bids_tsv(
        &work_root.join(format!("{}Volumes.csv", prefix)),
        &out.join(anat.volumes_name()),
    )?;

    if params.posteriors {
        for (space, scratch_name) in [
            (SPACE_SYNTHSEG, format!("{}Posteriors{}", prefix, NIFTI_GZ_EXT)),
            (SPACE_ORIG, format!("{}PosteriorsOrig{}", prefix, NIFTI_GZ_EXT)),
        ] {
            let probseg_prefix = anat.probseg_prefix(space);
            fs::copy(
                work_root.join(&scratch_name),
                out.join(format!("{}{}", probseg_prefix, NIFTI_GZ_EXT)),
            )?;
            write_label_map_json(&out.join(format!("{}.json", probseg_prefix)))?;
        }
    }

    Ok(())
}

/// Check PATH for the container runtime before touching any image.
fn runtime_on_path(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(gpu: bool, posteriors: bool, ants: bool) -> RunParams {
        RunParams {
            input_dataset: PathBuf::from("/data/in"),
            mask_dataset: PathBuf::from("/data/masks"),
            output_dataset: PathBuf::from("/data/out"),
            container: PathBuf::from("/containers/synthseg.sif"),
            scratch_dir: PathBuf::from("/scratch"),
            gpu,
            posteriors,
            ants,
        }
    }

    fn example() -> AnatomicalImage {
        AnatomicalImage::parse(Path::new(
            "sub-1/ses-1/anat/sub-1_ses-1_acq-mprage_T1w.nii.gz",
        ))
        .unwrap()
    }

    #[test]
    fn container_args_bind_all_three_roots() {
        let args = container_args(
            &params(false, false, false),
            &example(),
            Path::new("/real/in"),
            Path::new("/real/masks"),
            Path::new("/real/work"),
        );
        assert!(args.contains(&OsString::from(
            "/real/in:/input,/real/masks:/masks,/real/work:/output"
        )));
        assert!(args.contains(&OsString::from(
            "/input/sub-1/ses-1/anat/sub-1_ses-1_acq-mprage_T1w.nii.gz"
        )));
        assert!(args.contains(&OsString::from(
            "/masks/sub-1/ses-1/anat/sub-1_ses-1_acq-mprage_space-T1w_desc-brain_mask.nii.gz"
        )));
        assert!(args.contains(&OsString::from(
            "/output/sub-1/ses-1/anat/sub-1_ses-1_acq-mprage"
        )));
    }

    #[test]
    fn gpu_and_optional_flags_are_monotonic() {
        let roots = (Path::new("/i"), Path::new("/m"), Path::new("/w"));
        let off = container_args(&params(false, false, false), &example(), roots.0, roots.1, roots.2);
        let on = container_args(&params(true, true, true), &example(), roots.0, roots.1, roots.2);

        for flag in ["--nv", "--posteriors", "--ants"] {
            assert!(!off.contains(&OsString::from(flag)));
            assert!(on.contains(&OsString::from(flag)));
        }
        for flag in ["--qc", "--volumes", "--resample-orig", "--cleanenv"] {
            assert!(off.contains(&OsString::from(flag)));
            assert!(on.contains(&OsString::from(flag)));
        }
    }

    #[test]
    fn empty_image_list_is_rejected_before_any_work() {
        let err = run_segmentation(&params(false, false, false), &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyImageList));
    }
}
