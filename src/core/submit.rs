//! Scheduler submission: assembles one `bsub` invocation per job and hands
//! the assembled worker command line to LSF. Fire-and-forget: once the
//! scheduler acknowledges the job, control returns to the caller.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Local;
use tracing::{debug, info};

use crate::core::params::SubmitParams;
use crate::error::{Error, Result};

pub const DEFAULT_SCHEDULER: &str = "bsub";

/// GPU reservation passed to LSF when the job requests a GPU.
pub const GPU_RESOURCE_SPEC: &str = "num=1:mode=exclusive_process";

/// Logging subdirectory created under the output dataset.
pub const LOG_SUBDIR: &str = "code/logs";

/// Result of an accepted submission. `job_id` is parsed from the
/// scheduler's acknowledgement line when available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub job_id: Option<String>,
    pub log_path: PathBuf,
}

/// Handle to the batch scheduler executable. Tests substitute a stub
/// program; production uses `bsub` from PATH.
#[derive(Debug, Clone)]
pub struct Scheduler {
    program: OsString,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            program: OsString::from(DEFAULT_SCHEDULER),
        }
    }
}

impl Scheduler {
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Submit one segmentation job covering `images`. Creates the log
    /// directory (idempotent), builds the scheduler and worker argument
    /// lists, and runs the scheduler synchronously.
    pub fn submit(&self, params: &SubmitParams, images: &[PathBuf]) -> Result<SubmitOutcome> {
        if images.is_empty() {
            return Err(Error::EmptyImageList);
        }

        let log_dir = params.output_dataset.join(LOG_SUBDIR);
        fs::create_dir_all(&log_dir)?;
        let log_path = log_dir.join(log_file_name(&Local::now().format("%Y%m%d_%H%M%S").to_string()));

        let mut args = scheduler_args(params, &log_path);
        args.extend(job_command(params, images));
        debug!("Scheduler invocation: {:?} {:?}", self.program, args);

        let output = Command::new(&self.program).args(&args).output()?;
        if !output.status.success() {
            return Err(Error::Submission {
                program: self.program.to_string_lossy().into_owned(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let job_id = parse_job_id(&stdout);
        info!(
            "Submitted {} image(s); job id {}",
            images.len(),
            job_id.as_deref().unwrap_or("unknown")
        );

        Ok(SubmitOutcome { job_id, log_path })
    }
}

/// Timestamped log file name; `%J` is expanded to the job id by LSF.
pub fn log_file_name(timestamp: &str) -> String {
    format!("synthseg_{}_%J.txt", timestamp)
}

/// Scheduler-side arguments: job name, working directory, log redirection,
/// and the GPU reservation when requested.
pub fn scheduler_args(params: &SubmitParams, log_path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-J".into(),
        "synthseg".into(),
        "-cwd".into(),
        params.output_dataset.clone().into(),
        "-o".into(),
        log_path.as_os_str().to_os_string(),
    ];
    if params.gpu {
        args.push("-gpu".into());
        args.push(GPU_RESOURCE_SPEC.into());
    }
    args
}

/// The command line the scheduler executes: the worker entry point with
/// dataset paths, boolean-derived flags, and the full relative image list.
pub fn job_command(params: &SubmitParams, images: &[PathBuf]) -> Vec<OsString> {
    let mut cmd: Vec<OsString> = vec![
        params.entrypoint.as_os_str().to_os_string(),
        "--input-dataset".into(),
        params.input_dataset.as_os_str().to_os_string(),
        "--mask-dataset".into(),
        params.mask_dataset.as_os_str().to_os_string(),
        "--output-dataset".into(),
        params.output_dataset.as_os_str().to_os_string(),
        "--container".into(),
        params.container.as_os_str().to_os_string(),
    ];
    if params.gpu {
        cmd.push("--gpu".into());
    }
    if params.posteriors {
        cmd.push("--posteriors".into());
    }
    if params.ants {
        cmd.push("--ants".into());
    }
    cmd.extend(images.iter().map(|img| img.as_os_str().to_os_string()));
    cmd
}

/// Parse the job id out of LSF's acknowledgement, e.g.
/// `Job <12345> is submitted to queue <gpu>.`
pub fn parse_job_id(stdout: &str) -> Option<String> {
    let start = stdout.find("Job <")? + "Job <".len();
    let rest = &stdout[start..];
    let end = rest.find('>')?;
    let id = &rest[..end];
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(gpu: bool, posteriors: bool, ants: bool) -> SubmitParams {
        SubmitParams {
            input_dataset: PathBuf::from("/data/in"),
            mask_dataset: PathBuf::from("/data/masks"),
            output_dataset: PathBuf::from("/data/out"),
            container: PathBuf::from("/containers/synthseg.sif"),
            entrypoint: PathBuf::from("/opt/bin/synthsub-seg"),
            gpu,
            posteriors,
            ants,
        }
    }

    #[test]
    fn gpu_flag_gates_the_resource_reservation() {
        let log = PathBuf::from("/data/out/code/logs/synthseg_x_%J.txt");
        let with_gpu = scheduler_args(&params(true, false, false), &log);
        let without_gpu = scheduler_args(&params(false, false, false), &log);

        assert!(with_gpu.contains(&OsString::from("-gpu")));
        assert!(with_gpu.contains(&OsString::from(GPU_RESOURCE_SPEC)));
        assert!(!without_gpu.contains(&OsString::from("-gpu")));
    }

    #[test]
    fn job_command_carries_every_image_and_optional_flags() {
        let images = vec![
            PathBuf::from("sub-1/ses-1/anat/sub-1_ses-1_T1w.nii.gz"),
            PathBuf::from("sub-1/ses-1/anat/sub-1_ses-1_T2w.nii.gz"),
        ];
        let cmd = job_command(&params(true, true, false), &images);

        assert_eq!(cmd[0], OsString::from("/opt/bin/synthsub-seg"));
        assert!(cmd.contains(&OsString::from("--gpu")));
        assert!(cmd.contains(&OsString::from("--posteriors")));
        assert!(!cmd.contains(&OsString::from("--ants")));
        let tail: Vec<_> = cmd[cmd.len() - 2..].to_vec();
        assert_eq!(
            tail,
            vec![
                OsString::from("sub-1/ses-1/anat/sub-1_ses-1_T1w.nii.gz"),
                OsString::from("sub-1/ses-1/anat/sub-1_ses-1_T2w.nii.gz"),
            ]
        );
    }

    #[test]
    fn boolean_off_never_emits_downstream_flags() {
        let images = vec![PathBuf::from("a_T1w.nii.gz")];
        let cmd = job_command(&params(false, false, false), &images);
        for flag in ["--gpu", "--posteriors", "--ants"] {
            assert!(!cmd.contains(&OsString::from(flag)));
        }
    }

    #[test]
    fn parses_lsf_acknowledgement() {
        assert_eq!(
            parse_job_id("Job <12345> is submitted to queue <gpu>.\n"),
            Some("12345".to_string())
        );
        assert_eq!(parse_job_id("Request accepted\n"), None);
        assert_eq!(parse_job_id("Job <> is submitted"), None);
    }

    #[test]
    fn log_file_name_embeds_timestamp_and_job_placeholder() {
        assert_eq!(log_file_name("20260827_120000"), "synthseg_20260827_120000_%J.txt");
    }

    #[test]
    fn submitting_zero_images_is_an_error() {
        let scheduler = Scheduler::with_program("true");
        let err = scheduler.submit(&params(true, false, false), &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyImageList));
    }
}
